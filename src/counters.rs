/// Consecutive failures of one class, escalating once the count passes `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounter {
    count: u32,
    threshold: u32,
}

impl FailureCounter {
    pub const fn new(threshold: u32) -> Self {
        Self {
            count: 0,
            threshold,
        }
    }

    /// Record one failure. Returns `true` once the count exceeds the threshold,
    /// i.e. on the `threshold + 1`th consecutive failure and after.
    pub fn fail(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.exceeded()
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn exceeded(&self) -> bool {
        self.count > self.threshold
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

/// One counter per failure class; never shared between classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounters {
    pub connect: FailureCounter,
    pub write_timeout: FailureCounter,
    pub read_timeout: FailureCounter,
    pub checksum: FailureCounter,
}

impl FailureCounters {
    pub const fn new(threshold: u32) -> Self {
        Self {
            connect: FailureCounter::new(threshold),
            write_timeout: FailureCounter::new(threshold),
            read_timeout: FailureCounter::new(threshold),
            checksum: FailureCounter::new(threshold),
        }
    }

    pub fn reset_all(&mut self) {
        self.connect.reset();
        self.write_timeout.reset();
        self.read_timeout.reset();
        self.checksum.reset();
    }
}

impl std::fmt::Display for FailureCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "connect={} write_timeout={} read_timeout={} checksum={}",
            self.connect.count(),
            self.write_timeout.count(),
            self.read_timeout.count(),
            self.checksum.count()
        )
    }
}
