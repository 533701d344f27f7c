//! State handlers. Each runs once per tick and always returns the next state.
//!
//! ```text
//!  Entry            ──▶ ReconnectingFast
//!  ReconnectingFast ──[open]──▶ Exchanging
//!                   ──[11th failed open]──▶ ReconnectingSlow
//!  ReconnectingSlow ──[open]──▶ Exchanging          (otherwise stays put)
//!  Exchanging       ──[valid frame]──▶ UpdatingOutput
//!                   ──[timeout / bad frame]──▶ Exchanging
//!                   ──[same, counter > threshold]──▶ Restarting
//!                   ──[device gone]──▶ ReconnectingFast
//!  UpdatingOutput   ──▶ Exchanging
//!  Restarting       ──▶ Entry
//! ```

use std::fmt::Display;
use std::thread;

use log::{debug, info, warn};

use super::StateId;
use super::context::Context;
use crate::counters::FailureCounter;
use crate::frame::REQUEST;
use crate::port::{Connector, Link, LinkError};
use crate::pwm::OutputPort;
use crate::system::Restarter;

impl<C: Connector, O: OutputPort, R: Restarter> Context<C, O, R> {
    pub(super) fn entry(&mut self) -> StateId {
        info!("controller started, polling analyzer");
        StateId::ReconnectingFast
    }

    pub(super) fn reconnecting_fast(&mut self) -> StateId {
        match self.open() {
            Ok(()) => StateId::Exchanging,
            Err(e) => {
                info!("open failed: {e:#}; retry in {:?}", self.timing.fast_retry);
                thread::sleep(self.timing.fast_retry);
                if self.counters.connect.fail() {
                    warn!(
                        "analyzer absent after {} attempts; retrying every {:?}",
                        self.counters.connect.count(),
                        self.timing.slow_retry
                    );
                    StateId::ReconnectingSlow
                } else {
                    StateId::ReconnectingFast
                }
            }
        }
    }

    /// Never escalates: a missing analyzer alone is no reason to reboot.
    pub(super) fn reconnecting_slow(&mut self) -> StateId {
        match self.open() {
            Ok(()) => StateId::Exchanging,
            Err(e) => {
                info!("open failed: {e:#}; retry in {:?}", self.timing.slow_retry);
                thread::sleep(self.timing.slow_retry);
                self.counters.connect.fail();
                StateId::ReconnectingSlow
            }
        }
    }

    pub(super) fn exchanging(&mut self) -> StateId {
        thread::sleep(self.timing.settle);
        let Some(link) = self.link.as_mut() else {
            warn!("no open link; reconnecting");
            return StateId::ReconnectingFast;
        };

        match link.send(&REQUEST) {
            Ok(()) => self.counters.write_timeout.reset(),
            Err(LinkError::Timeout) => {
                self.stats.inc_timeout();
                return escalate(&mut self.counters.write_timeout, "write timeout");
            }
            Err(LinkError::Gone(e)) => return self.lost(e),
        }

        self.frame.clear();
        match link.recv(self.frame.buf_mut()) {
            Ok(n) => {
                self.frame.set_received(n);
                self.counters.read_timeout.reset();
            }
            Err(LinkError::Timeout) => {
                self.stats.inc_timeout();
                return escalate(&mut self.counters.read_timeout, "read timeout");
            }
            Err(LinkError::Gone(e)) => return self.lost(e),
        }

        match self.frame.co_value() {
            Ok(value) => {
                self.counters.checksum.reset();
                self.reading = Some(value);
                self.stats.inc_ok(value);
                debug!("co={value}");
                StateId::UpdatingOutput
            }
            Err(e) => {
                self.stats.inc_bad();
                debug!("rx {:02X?}", self.frame.received());
                escalate(&mut self.counters.checksum, format_args!("bad frame: {e}"))
            }
        }
    }

    pub(super) fn updating_output(&mut self) -> StateId {
        if let Some(value) = self.reading
            && let Err(e) = self.outputs.write_reading(value)
        {
            warn!("pwm: {e}");
        }
        self.stats.maybe_log(self.timing.summary_interval);
        StateId::Exchanging
    }

    pub(super) fn restarting(&mut self) -> StateId {
        warn!("unrecoverable ({}); restarting machine", self.counters);
        self.detach();
        self.restarter.restart();
        // only reached if the reboot request did not take
        self.counters.reset_all();
        StateId::Entry
    }

    fn open(&mut self) -> anyhow::Result<()> {
        self.detach();
        let link = self.connector.connect()?;
        self.link = Some(link);
        self.counters.connect.reset();
        info!("analyzer link open");
        Ok(())
    }

    fn lost(&mut self, e: std::io::Error) -> StateId {
        warn!("analyzer link lost: {e}");
        self.detach();
        self.stats.inc_reconnect();
        StateId::ReconnectingFast
    }
}

fn escalate(counter: &mut FailureCounter, what: impl Display) -> StateId {
    if counter.fail() {
        warn!("{what}: {} in a row, escalating", counter.count());
        StateId::Restarting
    } else {
        info!("{what} ({}/{}); retrying", counter.count(), counter.threshold());
        StateId::Exchanging
    }
}
