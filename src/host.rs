//! Reference emulator host
//!
//! Stands in for the emulation engine: it performs the pre-run wait and
//! records what would be started.

use ol_integration::{EmulatorHost, LaunchDescriptor};
use std::time::Duration;
use tracing::{info, warn};

const PID_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct LoggingHost;

impl EmulatorHost for LoggingHost {
    fn wait_for_pid(&mut self, pid: i32) {
        if cfg!(target_os = "linux") {
            let proc_entry = std::path::PathBuf::from(format!("/proc/{}", pid));
            while proc_entry.exists() {
                std::thread::sleep(PID_POLL_INTERVAL);
            }
            info!("Process {} has stopped", pid);
        } else {
            warn!("Waiting for process {} is not supported on this platform", pid);
        }
    }

    fn run(&mut self, launch: LaunchDescriptor) -> ol_core::Result<()> {
        info!("Launching {} via {}", launch.executable.display(), launch.executable_name);
        info!("Game root: {}", launch.game_folder.display());
        if let Some(psf) = &launch.metadata {
            info!("Title: {} ({})", psf.title, psf.id);
            if let Some(splash) = &psf.splash_path {
                info!("Splash: {}", splash.display());
            }
        }
        if let Some(patch) = &launch.patches.patch_file {
            info!("Patch file: {}", patch.display());
        }
        info!("Ignore game patches: {}", launch.patches.ignore_game_patches);
        info!("Wait for debugger: {}", launch.wait_for_debugger);
        info!("Forwarding {} game argument(s)", launch.game_args.len());
        Ok(())
    }
}
