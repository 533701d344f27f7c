use std::time::{Duration, Instant};

use log::info;

/// Lifetime exchange tallies, summarised in the log every so often.
#[derive(Debug, Clone)]
pub struct Stats {
    pub ok: u64,
    pub bad: u64,
    pub timeouts: u64,
    pub reconnects: u64,
    pub last_value: Option<u16>,
    t0: Instant,
    last: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            ok: 0,
            bad: 0,
            timeouts: 0,
            reconnects: 0,
            last_value: None,
            t0: Instant::now(),
            last: Instant::now(),
        }
    }
    pub fn inc_ok(&mut self, value: u16) {
        self.ok += 1;
        self.last_value = Some(value);
    }
    pub fn inc_bad(&mut self) {
        self.bad += 1;
    }
    pub fn inc_timeout(&mut self) {
        self.timeouts += 1;
    }
    pub fn inc_reconnect(&mut self) {
        self.reconnects += 1;
    }

    /// Log a summary if `interval` has passed since the last one. Returns whether it did.
    pub fn maybe_log(&mut self, interval: Duration) -> bool {
        if self.last.elapsed() < interval {
            return false;
        }
        info!("{}", self.summary());
        self.last = Instant::now();
        true
    }

    pub fn summary(&self) -> String {
        format!(
            "ok={} bad={} timeouts={} reconnects={} last_co={} up {:.0}s",
            self.ok,
            self.bad,
            self.timeouts,
            self.reconnects,
            self.last_value
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
            self.t0.elapsed().as_secs_f64()
        )
    }
}
