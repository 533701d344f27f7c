use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Parser;
use log::{info, warn};

use ecomd::cli::{Cli, Cmd};
use ecomd::config::{PWM_CHANNELS, PwmConfig, Timing};
use ecomd::fsm::{Context, Engine};
use ecomd::port::SerialConnector;
use ecomd::pwm::{PwmPair, SysfsPwm};
use ecomd::system::SystemRestart;
use ecomd::{logging, probe};

fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.log_level)?;
    match args.cmd.unwrap_or(Cmd::Run) {
        Cmd::Run => run(args),
        Cmd::Probe => probe::run(&args.ser),
    }
}

fn run(args: Cli) -> Result<()> {
    info!("ecomd started");

    let chip = Path::new(&args.pwm_chip);
    let cfg = PwmConfig::default();
    let [ch0, ch1] = PWM_CHANNELS;
    let outputs = PwmPair::new(
        SysfsPwm::export(chip, ch0, &cfg).context("PWM output 0")?,
        SysfsPwm::export(chip, ch1, &cfg).context("PWM output 1")?,
    );
    warn!(
        "PWM outputs enabled: range={} at {:.0} Hz",
        cfg.range,
        cfg.frequency_hz()
    );

    let ctx = Context::new(
        SerialConnector::new(args.ser),
        outputs,
        SystemRestart,
        Timing::default(),
    );
    Engine::new(ctx).run()
}
