//! Routes `log` records to the system log as a daemon.

use anyhow::{Result, anyhow};
use log::LevelFilter;
use syslog::{BasicLogger, Facility, Formatter3164};

pub const PROCESS_NAME: &str = "ecomd";

fn formatter() -> Formatter3164 {
    Formatter3164 {
        facility: Facility::LOG_DAEMON,
        hostname: None,
        process: PROCESS_NAME.into(),
        pid: std::process::id(),
    }
}

/// Connect to `/dev/log` and install the logger with `level` as the ceiling.
pub fn init(level: LevelFilter) -> Result<()> {
    let logger = syslog::unix(formatter()).map_err(|e| anyhow!("syslog: {e}"))?;
    log::set_boxed_logger(Box::new(BasicLogger::new(logger)))?;
    log::set_max_level(level);
    Ok(())
}
