//! ecomd: reads CO from an ECOM combustion analyzer over serial and drives
//! two PWM outputs with it, recovering from a flaky link on its own.

pub mod cli;
pub mod config;
pub mod counters;
pub mod frame;
pub mod fsm;
pub mod logging;
pub mod port;
pub mod probe;
pub mod pwm;
pub mod stats;
pub mod system;
