//! Orbis-Launcher - command-line front-end
//!
//! Main entry point: interprets the command line, reads the config and
//! hands the resolved game to the emulator host.

mod host;

use anyhow::Context;
use ol_core::{logging, Config, LaunchError};
use ol_integration::{apply_effects, parse, ArgError, Command, Launcher, USAGE};
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut argv = std::env::args_os();
    let executable_name = argv
        .next()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "orbis-launcher".to_string());

    match run(executable_name, argv, &Config::config_dir()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<Config> {
    Config::load_from(config_path).with_context(|| format!("failed to load {}", config_path.display()))
}

/// Run one invocation and return the process exit status.
///
/// The config file is only touched once the command line asks for a launch
/// or a folder change.
fn run<I>(executable_name: String, argv: I, config_dir: &Path) -> anyhow::Result<u8>
where
    I: IntoIterator<Item = OsString>,
{
    let parsed = parse(argv);
    for warning in &parsed.warnings {
        eprintln!("{}", warning);
    }

    let config_path = Config::config_file(config_dir);
    let invocation = match parsed.command {
        Ok(Command::Launch(invocation)) => invocation,
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return Ok(0);
        }
        Ok(Command::AddGameFolder(dir)) => {
            let mut config = load_config(&config_path)?;
            config.add_game_install_dir(dir);
            config.save_to(&config_path).context("failed to save game folder")?;
            println!("Game folder successfully saved.");
            return Ok(0);
        }
        Ok(Command::SetAddonFolder(dir)) => {
            let mut config = load_config(&config_path)?;
            config.set_addon_install_dir(dir);
            config.save_to(&config_path).context("failed to save addon folder")?;
            println!("Addon folder successfully saved.");
            return Ok(0);
        }
        Err(ArgError::NoArguments) => {
            print!("{}", USAGE);
            return Ok(ArgError::NoArguments.exit_code());
        }
        Err(e) => {
            eprintln!("{}", e);
            return Ok(e.exit_code());
        }
    };

    if !invocation.args.has_game_argument {
        let err = LaunchError::MissingGameArgument;
        eprintln!("{}", err);
        return Ok(err.exit_code());
    }

    let mut config = load_config(&config_path)?;
    if config.paths.game_install_dirs.is_empty() {
        eprintln!("Warning: No game folder set. Please set it using:");
        eprintln!("  orbis-launcher --add-game-folder <folder_name>");
    }

    let patches = apply_effects(&mut config, &invocation.effects);
    logging::init(&config.debug).context("failed to open log file")?;
    tracing::info!("Starting Orbis-Launcher");

    let launcher = Launcher::new(config, config_dir.to_path_buf(), executable_name).with_patches(patches);
    match launcher.launch(&invocation.args, &mut host::LoggingHost) {
        Ok(()) => Ok(0),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:#}", anyhow::Error::new(e));
            Ok(code)
        }
    }
}
