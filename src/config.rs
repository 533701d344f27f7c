//! Compile-time settings for the boiler install.
//!
//! The controller takes no runtime configuration; the CLI only exposes
//! overrides whose defaults are these constants.

use std::time::Duration;

/// USB serial adapter wired to the analyzer.
pub const SERIAL_DEVICE: &str = "/dev/ttyUSB0";
pub const BAUD_RATE: u32 = 9600;

/// Bounded wait for writability / first response byte.
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);
/// Quiet time on the line that ends a response.
pub const BYTE_GAP: Duration = Duration::from_millis(50);

/// Consecutive failures tolerated per class before escalation.
pub const FAILURE_THRESHOLD: u32 = 10;

/// Requires `dtoverlay=pwm-2chan`: pwm0 is physical pin 12 (GPIO18),
/// pwm1 is physical pin 33 (GPIO13).
pub const PWM_CHIP: &str = "/sys/class/pwm/pwmchip0";
pub const PWM_CHANNELS: [u32; 2] = [0, 1];

/// Delays used by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause before every request.
    pub settle: Duration,
    /// Back-off between open attempts while the device is expected back soon.
    pub fast_retry: Duration,
    /// Back-off once the device has been absent for a while.
    pub slow_retry: Duration,
    /// How often the exchange summary is logged.
    pub summary_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(200),
            fast_retry: Duration::from_secs(10),
            slow_retry: Duration::from_secs(60),
            summary_interval: Duration::from_secs(15 * 60),
        }
    }
}

/// PWM frequency = 19.2 MHz / (clock_divisor * range)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    /// Duty-cycle steps; a reading of `range` is fully on.
    pub range: u16,
    pub clock_divisor: u32,
}

impl PwmConfig {
    pub const BASE_CLOCK_HZ: u64 = 19_200_000;

    pub fn period_ns(&self) -> u64 {
        self.clock_divisor as u64 * self.range as u64 * 1_000_000_000 / Self::BASE_CLOCK_HZ
    }

    pub fn frequency_hz(&self) -> f64 {
        Self::BASE_CLOCK_HZ as f64 / (self.clock_divisor as f64 * self.range as f64)
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            range: 1024,
            clock_divisor: 2,
        }
    }
}
