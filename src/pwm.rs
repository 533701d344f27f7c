//! CO reading to duty cycle on both PWM outputs.
//!
//! Channels are anything implementing `embedded_hal::pwm::SetDutyCycle`.
//! On the Pi that is [`SysfsPwm`], a channel of the kernel's sysfs PWM class.
//! No clamping happens here: a reading above the configured range is handed
//! to the channel as-is and the hardware decides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use embedded_hal::pwm::{self, ErrorKind, ErrorType, SetDutyCycle};
use log::debug;
use thiserror::Error;

use crate::config::PwmConfig;

#[derive(Debug, Error)]
pub enum PwmError {
    #[error("{}: {source}", path.display())]
    Sysfs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pwm{channel} rejected duty {duty}: {kind:?}")]
    Rejected {
        channel: usize,
        duty: u16,
        kind: ErrorKind,
    },
}

impl pwm::Error for PwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Where a decoded reading ends up.
pub trait OutputPort {
    fn write_reading(&mut self, value: u16) -> Result<(), PwmError>;
}

/// The two outputs, always driven with the same duty.
pub struct PwmPair<A, B> {
    first: A,
    second: B,
}

impl<A: SetDutyCycle, B: SetDutyCycle> PwmPair<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn channels(&self) -> (&A, &B) {
        (&self.first, &self.second)
    }
}

impl<A: SetDutyCycle, B: SetDutyCycle> OutputPort for PwmPair<A, B> {
    /// Writes both channels even if the first refuses; reports the first error.
    fn write_reading(&mut self, value: u16) -> Result<(), PwmError> {
        let first = self
            .first
            .set_duty_cycle(value)
            .map_err(|e| rejected(0, value, &e));
        let second = self
            .second
            .set_duty_cycle(value)
            .map_err(|e| rejected(1, value, &e));
        first.and(second)
    }
}

fn rejected<E: pwm::Error>(channel: usize, duty: u16, e: &E) -> PwmError {
    PwmError::Rejected {
        channel,
        duty,
        kind: e.kind(),
    }
}

/// One channel of a `/sys/class/pwm/pwmchipN` device.
#[derive(Debug)]
pub struct SysfsPwm {
    dir: PathBuf,
    period_ns: u64,
    range: u16,
}

impl SysfsPwm {
    /// Export `channel` if needed, then program period, zero duty and enable.
    pub fn export(chip: &Path, channel: u32, config: &PwmConfig) -> Result<Self, PwmError> {
        let dir = chip.join(format!("pwm{channel}"));
        if !dir.exists() {
            write_attr(&chip.join("export"), channel)?;
        }
        let pwm = Self {
            dir,
            period_ns: config.period_ns(),
            range: config.range,
        };
        // the kernel refuses a period shorter than the current duty
        pwm.write("duty_cycle", 0)?;
        pwm.write("period", pwm.period_ns)?;
        pwm.write("enable", 1)?;
        debug!(
            "{} enabled: period={}ns range={}",
            pwm.dir.display(),
            pwm.period_ns,
            pwm.range
        );
        Ok(pwm)
    }

    fn write(&self, attr: &str, value: u64) -> Result<(), PwmError> {
        write_attr(&self.dir.join(attr), value)
    }
}

fn write_attr(path: &Path, value: impl std::fmt::Display) -> Result<(), PwmError> {
    fs::write(path, value.to_string()).map_err(|source| PwmError::Sysfs {
        path: path.to_path_buf(),
        source,
    })
}

impl ErrorType for SysfsPwm {
    type Error = PwmError;
}

impl SetDutyCycle for SysfsPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.range
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PwmError> {
        let duty_ns = self.period_ns * duty as u64 / self.range.max(1) as u64;
        self.write("duty_cycle", duty_ns)
    }
}
