//! Launch orchestration
//!
//! Turns parsed command-line arguments into a [`LaunchDescriptor`] and hands
//! it to the emulator through the [`EmulatorHost`] seam. Every fatal check
//! happens before the host is called.

use crate::args::{Effect, ParsedArgs};
use ol_core::{Config, LaunchError, Result};
use ol_vfs::{load_psf_data, resolve_game_folder, resolve_game_path, PsfData};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Upper bound on arguments forwarded to the guest executable
pub const MAX_GAME_ARGS: usize = 32;

/// Patch settings forwarded to the emulator's patch subsystem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
    pub patch_file: Option<PathBuf>,
    pub ignore_game_patches: bool,
}

/// Apply command-line effects to the loaded config.
///
/// Config modes are applied before any other effect, so a toggle survives
/// `--config-clean` wherever it appears on the command line. Nothing is
/// persisted; the returned patch options travel with the launch.
pub fn apply_effects(config: &mut Config, effects: &[Effect]) -> PatchOptions {
    for effect in effects {
        if let Effect::ConfigMode(mode) = effect {
            config.apply_mode(*mode);
        }
    }

    let mut patches = PatchOptions::default();
    for effect in effects {
        match effect {
            Effect::PatchFile(file) => patches.patch_file = Some(file.clone()),
            Effect::IgnoreGamePatch => patches.ignore_game_patches = true,
            Effect::Fullscreen(fullscreen) => config.general.fullscreen = *fullscreen,
            Effect::LogAppend => config.debug.log_append = true,
            Effect::ShowFps => config.general.show_fps = true,
            Effect::ConfigMode(_) => {}
        }
    }

    patches
}

/// Everything the emulator needs to start a title
#[derive(Debug, Clone)]
pub struct LaunchDescriptor {
    /// `argv[0]` of the launcher process
    pub executable_name: String,
    pub executable: PathBuf,
    pub game_folder: PathBuf,
    pub game_args: Vec<OsString>,
    pub metadata: Option<PsfData>,
    pub wait_for_debugger: bool,
    pub patches: PatchOptions,
    /// Effective config, per-game overrides included
    pub config: Config,
}

/// The emulator side of the hand-off
pub trait EmulatorHost {
    /// Block until the process `pid` has exited
    fn wait_for_pid(&mut self, pid: i32);

    /// Start the title. Control does not come back to the launcher until the
    /// emulator stops.
    fn run(&mut self, launch: LaunchDescriptor) -> Result<()>;
}

/// Builds launch descriptors against a loaded config
pub struct Launcher {
    config: Config,
    config_dir: PathBuf,
    executable_name: String,
    patches: PatchOptions,
}

impl Launcher {
    pub fn new(config: Config, config_dir: PathBuf, executable_name: String) -> Self {
        Self {
            config,
            config_dir,
            executable_name,
            patches: PatchOptions::default(),
        }
    }

    pub fn with_patches(mut self, patches: PatchOptions) -> Self {
        self.patches = patches;
        self
    }

    /// Resolve the executable, install root and metadata for `args`
    pub fn prepare(&self, args: &ParsedArgs) -> Result<LaunchDescriptor> {
        if !args.has_game_argument {
            return Err(LaunchError::MissingGameArgument);
        }

        let executable = resolve_game_path(&args.game_path, &self.config.paths.game_install_dirs)
            .ok_or_else(|| LaunchError::GameNotFound(args.game_path.to_string_lossy().into_owned()))?;
        let game_folder = resolve_game_folder(&executable, args.game_folder.clone());

        let metadata = load_psf_data(&param_sfo_path(&game_folder));
        let config = match &metadata {
            Some(psf) => self.config.with_game_overrides(&self.config_dir, &psf.id)?,
            None => self.config.clone(),
        };

        info!("Executable: {}", executable.display());
        info!("Game folder: {}", game_folder.display());

        Ok(LaunchDescriptor {
            executable_name: self.executable_name.clone(),
            executable,
            game_folder,
            game_args: log_game_arguments(&args.game_args),
            metadata,
            wait_for_debugger: args.wait_for_debugger,
            patches: self.patches.clone(),
            config,
        })
    }

    /// Prepare and hand off to `host`
    pub fn launch<H: EmulatorHost>(&self, args: &ParsedArgs, host: &mut H) -> Result<()> {
        let descriptor = self.prepare(args)?;

        descriptor.config.log_configuration();
        if let Some(psf) = &descriptor.metadata {
            psf.log();
        }

        if let Some(pid) = args.wait_pid {
            info!("Waiting for process {} to stop", pid);
            host.wait_for_pid(pid);
        }

        host.run(descriptor)
    }
}

/// Location of a game's param file below its install root
pub fn param_sfo_path(game_folder: &Path) -> PathBuf {
    game_folder.join("sce_sys").join("param.sfo")
}

/// Log the guest arguments and return the ones that will be forwarded
pub fn log_game_arguments(args: &[OsString]) -> Vec<OsString> {
    let forwarded = &args[..args.len().min(MAX_GAME_ARGS)];
    for (i, arg) in forwarded.iter().enumerate() {
        info!("Game argument {}: {}", i, arg.to_string_lossy());
    }

    if args.len() > MAX_GAME_ARGS {
        error!("Too many game arguments, only passing the first {}", MAX_GAME_ARGS);
    }

    forwarded.to_vec()
}
