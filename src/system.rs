use std::process::Command;

use log::{error, warn};

/// Full machine restart, the last resort once a failure class escalates.
pub trait Restarter {
    /// Flush filesystems and ask the OS to reboot. Normally does not come back;
    /// if it does, the reboot request failed and the caller carries on.
    fn restart(&mut self);
}

/// Reboots the host through `sync` and `reboot`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRestart;

impl Restarter for SystemRestart {
    fn restart(&mut self) {
        warn!("flushing filesystems and rebooting");
        log::logger().flush();
        run("sync");
        run("reboot");
    }
}

fn run(cmd: &str) {
    match Command::new(cmd).status() {
        Ok(status) if status.success() => {}
        Ok(status) => error!("{cmd}: exited with {status}"),
        Err(e) => error!("{cmd}: {e}"),
    }
}
