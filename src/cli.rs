use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::config;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ecomd",
    about = "Polls an ECOM analyzer for CO and drives two PWM outputs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
    #[command(flatten)]
    pub ser: SerialOpts,
    /// sysfs PWM chip driving both outputs
    #[arg(long, default_value = config::PWM_CHIP)]
    pub pwm_chip: String,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    /// Run the controller (default)
    Run,
    /// Poll the analyzer once and print the CO reading
    Probe,
}

#[derive(Args, Debug, Clone)]
pub struct SerialOpts {
    /// Serial device path
    #[arg(long, default_value = config::SERIAL_DEVICE)]
    pub dev: String,
    /// Baud rate
    #[arg(long, default_value_t = config::BAUD_RATE)]
    pub baud: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_with_compiled_defaults() {
        let cli = Cli::try_parse_from(["ecomd"]).unwrap();
        assert_eq!(cli.cmd, None);
        assert_eq!(cli.ser.dev, config::SERIAL_DEVICE);
        assert_eq!(cli.ser.baud, config::BAUD_RATE);
        assert_eq!(cli.pwm_chip, config::PWM_CHIP);
        assert_eq!(cli.log_level, LevelFilter::Info);
    }

    #[test]
    fn probe_with_overrides() {
        let cli = Cli::try_parse_from([
            "ecomd",
            "--dev",
            "/dev/ttyAMA0",
            "--baud",
            "19200",
            "--log-level",
            "debug",
            "probe",
        ])
        .unwrap();
        assert_eq!(cli.cmd, Some(Cmd::Probe));
        assert_eq!(cli.ser.dev, "/dev/ttyAMA0");
        assert_eq!(cli.ser.baud, 19_200);
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_baud() {
        assert!(Cli::try_parse_from(["ecomd", "--baud", "fast"]).is_err());
    }
}
