//! End-to-end tests for the launch pipeline against a recording host

use ol_core::{Config, ConfigMode, LaunchError};
use ol_integration::{apply_effects, parse, Command, EmulatorHost, LaunchDescriptor, Launcher};
use ol_vfs::SfoBuilder;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, PartialEq)]
enum HostCall {
    WaitForPid(i32),
    Run,
}

#[derive(Default)]
struct RecordingHost {
    calls: Vec<HostCall>,
    launched: Option<LaunchDescriptor>,
}

impl EmulatorHost for RecordingHost {
    fn wait_for_pid(&mut self, pid: i32) {
        self.calls.push(HostCall::WaitForPid(pid));
    }

    fn run(&mut self, launch: LaunchDescriptor) -> ol_core::Result<()> {
        self.calls.push(HostCall::Run);
        self.launched = Some(launch);
        Ok(())
    }
}

/// Create `<root>/<relative>/` with eboot.bin and a param.sfo for `content_id`
fn install_game(root: &Path, relative: &str, content_id: &str) -> PathBuf {
    let dir = root.join(relative);
    std::fs::create_dir_all(dir.join("sce_sys")).unwrap();
    let sfo = SfoBuilder::new()
        .content_id(content_id)
        .title("Installed Game")
        .app_ver("01.00")
        .generate();
    std::fs::write(dir.join("sce_sys").join("param.sfo"), sfo).unwrap();
    std::fs::write(dir.join("eboot.bin"), b"\x7fELF").unwrap();
    dir
}

fn invocation(tokens: &[&str]) -> ol_integration::Invocation {
    match parse(tokens.iter().copied()).command.unwrap() {
        Command::Launch(invocation) => invocation,
        other => panic!("expected launch, got {:?}", other),
    }
}

#[test]
fn test_unknown_id_never_reaches_emulator() {
    let install = TempDir::new().unwrap();
    install_game(install.path(), "CUSA00001", "UP0000-CUSA00001_00-0000000000000000");

    let mut config = Config::default();
    config.add_game_install_dir(install.path().to_path_buf());
    let launcher = Launcher::new(config, install.path().join("cfg"), "launcher".to_string());

    let inv = invocation(&["--wait-for-pid", "77", "-g", "CUSA09999"]);
    let mut host = RecordingHost::default();
    let err = launcher.launch(&inv.args, &mut host).unwrap_err();

    assert!(matches!(err, LaunchError::GameNotFound(ref id) if id == "CUSA09999"));
    assert_eq!(err.exit_code(), 1);
    assert!(host.calls.is_empty());
}

#[test]
fn test_missing_game_never_reaches_emulator() {
    let launcher = Launcher::new(Config::default(), PathBuf::from("."), "launcher".to_string());
    let inv = invocation(&["--show-fps"]);
    let mut host = RecordingHost::default();

    let err = launcher.launch(&inv.args, &mut host).unwrap_err();
    assert!(matches!(err, LaunchError::MissingGameArgument));
    assert!(host.calls.is_empty());
}

#[test]
fn test_launch_by_id() {
    let install = TempDir::new().unwrap();
    let game_dir = install_game(install.path(), "ps4/CUSA00001", "UP0000-CUSA00001_00-0000000000000000");

    let mut config = Config::default();
    config.add_game_install_dir(install.path().join("empty"));
    config.add_game_install_dir(install.path().to_path_buf());
    let launcher = Launcher::new(config, install.path().join("cfg"), "orbis-launcher".to_string());

    let inv = invocation(&["--wait-for-debugger", "CUSA00001", "--", "+map", "e1m1"]);
    // The last token is "e1m1", so the ID has to be given explicitly
    assert!(!inv.args.has_game_argument);

    let inv = invocation(&["--wait-for-debugger", "-g", "CUSA00001", "--", "+map", "e1m1"]);
    let mut host = RecordingHost::default();
    launcher.launch(&inv.args, &mut host).unwrap();

    assert_eq!(host.calls, vec![HostCall::Run]);
    let launched = host.launched.unwrap();
    assert_eq!(launched.executable, game_dir.join("eboot.bin"));
    assert_eq!(launched.game_folder, game_dir);
    assert_eq!(launched.game_args, vec!["+map", "e1m1"]);
    assert!(launched.wait_for_debugger);
    assert_eq!(launched.executable_name, "orbis-launcher");

    let metadata = launched.metadata.unwrap();
    assert_eq!(metadata.id, "CUSA00001");
    assert_eq!(metadata.title, "Installed Game");
}

#[test]
fn test_wait_for_pid_happens_before_run() {
    let install = TempDir::new().unwrap();
    let game_dir = install_game(install.path(), "Game", "UP0000-CUSA00001_00-0000000000000000");
    let eboot = game_dir.join("eboot.bin");

    let launcher = Launcher::new(Config::default(), install.path().join("cfg"), "launcher".to_string());
    let inv = invocation(&["--wait-for-pid", "1234", eboot.to_str().unwrap()]);
    let mut host = RecordingHost::default();
    launcher.launch(&inv.args, &mut host).unwrap();

    assert_eq!(host.calls, vec![HostCall::WaitForPid(1234), HostCall::Run]);
}

#[test]
fn test_update_folder_uses_base_game_metadata() {
    let install = TempDir::new().unwrap();
    let base = install_game(install.path(), "CUSA00001", "UP0000-CUSA00001_00-0000000000000000");
    let update = install.path().join("CUSA00001-UPDATE");
    std::fs::create_dir_all(&update).unwrap();
    std::fs::write(update.join("eboot.bin"), b"\x7fELF").unwrap();

    let launcher = Launcher::new(Config::default(), install.path().join("cfg"), "launcher".to_string());
    let inv = invocation(&[update.join("eboot.bin").to_str().unwrap()]);
    let launched = launcher.prepare(&inv.args).unwrap();

    assert_eq!(launched.executable, update.join("eboot.bin"));
    assert_eq!(launched.game_folder, base);
    assert_eq!(launched.metadata.unwrap().id, "CUSA00001");
}

#[test]
fn test_override_root_and_missing_metadata() {
    let install = TempDir::new().unwrap();
    let eboot = install.path().join("loose.elf");
    std::fs::write(&eboot, b"\x7fELF").unwrap();
    let root = install.path().join("root");
    std::fs::create_dir_all(&root).unwrap();

    let launcher = Launcher::new(Config::default(), install.path().join("cfg"), "launcher".to_string());
    let inv = invocation(&["--override-root", root.to_str().unwrap(), eboot.to_str().unwrap()]);
    let launched = launcher.prepare(&inv.args).unwrap();

    assert_eq!(launched.game_folder, root);
    assert!(launched.metadata.is_none());
}

#[test]
fn test_effects_and_per_game_config() {
    let install = TempDir::new().unwrap();
    let game_dir = install_game(install.path(), "CUSA00001", "UP0000-CUSA00001_00-0000000000000000");
    let config_dir = install.path().join("cfg");
    let override_path = Config::game_config_path(&config_dir, "CUSA00001");
    std::fs::create_dir_all(override_path.parent().unwrap()).unwrap();
    std::fs::write(&override_path, "[general]\nneo_mode = true\n").unwrap();

    let eboot = game_dir.join("eboot.bin");
    let inv = invocation(&["-f", "true", "-p", "fix.xml", eboot.to_str().unwrap()]);

    let mut config = Config::default();
    let patches = apply_effects(&mut config, &inv.effects);
    let launcher = Launcher::new(config, config_dir.clone(), "launcher".to_string()).with_patches(patches);
    let launched = launcher.prepare(&inv.args).unwrap();

    assert!(launched.config.general.fullscreen);
    assert!(launched.config.general.neo_mode);
    assert_eq!(launched.patches.patch_file, Some(PathBuf::from("fix.xml")));

    // --config-global skips the per-game file
    let inv = invocation(&["--config-global", eboot.to_str().unwrap()]);
    let mut config = Config::default();
    apply_effects(&mut config, &inv.effects);
    let launcher = Launcher::new(config, config_dir, "launcher".to_string());
    assert!(!launcher.prepare(&inv.args).unwrap().config.general.neo_mode);
}

#[test]
fn test_toggles_before_config_clean_are_kept() {
    let install = TempDir::new().unwrap();
    let game_dir = install_game(install.path(), "CUSA00001", "UP0000-CUSA00001_00-0000000000000000");
    let eboot = game_dir.join("eboot.bin");

    let mut loaded = Config::default();
    loaded.gpu.vblank_frequency = 120;

    let inv = invocation(&["-f", "true", "--show-fps", "--log-append", "--config-clean", eboot.to_str().unwrap()]);
    let mut config = loaded;
    let patches = apply_effects(&mut config, &inv.effects);
    let launcher = Launcher::new(config, install.path().join("cfg"), "launcher".to_string()).with_patches(patches);
    let launched = launcher.prepare(&inv.args).unwrap();

    assert!(launched.config.general.fullscreen);
    assert!(launched.config.general.show_fps);
    assert!(launched.config.debug.log_append);
    assert_eq!(launched.config.gpu.vblank_frequency, 60);
    assert_eq!(launched.config.mode, ConfigMode::Clean);
}
