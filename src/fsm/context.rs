//! Everything the state handlers touch, owned in one place.
//!
//! The engine holds the only `Context` and lends it to one handler per tick,
//! so the link, counters and frame buffer have a single owner for the life of
//! the process.

use crate::config::{FAILURE_THRESHOLD, Timing};
use crate::counters::FailureCounters;
use crate::frame::ResponseFrame;
use crate::port::Connector;
use crate::stats::Stats;

pub struct Context<C: Connector, O, R> {
    pub(super) connector: C,
    /// `Some` only while the device is open and configured.
    pub(super) link: Option<C::Link>,
    pub(super) outputs: O,
    pub(super) restarter: R,
    pub(super) counters: FailureCounters,
    pub(super) frame: ResponseFrame,
    /// Last reading that passed validation.
    pub(super) reading: Option<u16>,
    pub(super) timing: Timing,
    pub(super) stats: Stats,
}

impl<C: Connector, O, R> Context<C, O, R> {
    pub fn new(connector: C, outputs: O, restarter: R, timing: Timing) -> Self {
        Self {
            connector,
            link: None,
            outputs,
            restarter,
            counters: FailureCounters::new(FAILURE_THRESHOLD),
            frame: ResponseFrame::new(),
            reading: None,
            timing,
            stats: Stats::new(),
        }
    }

    pub fn counters(&self) -> &FailureCounters {
        &self.counters
    }

    pub fn reading(&self) -> Option<u16> {
        self.reading
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn restarter(&self) -> &R {
        &self.restarter
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Close the device, if open.
    pub(super) fn detach(&mut self) {
        self.link = None;
    }
}
