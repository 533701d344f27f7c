//! Protocol / reconnection state machine.
//!
//! Each tick the engine looks the current state up in its table, runs that
//! state's handler (see [`states`]) against the [`Context`], and moves to
//! whatever state the handler returns. A state missing from the table cannot
//! be handled: the engine requests one machine restart and stops dispatching.

pub mod context;
pub mod states;

pub use context::Context;

use log::{debug, error};

use crate::port::Connector;
use crate::pwm::OutputPort;
use crate::system::Restarter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Entry,
    ReconnectingFast,
    ReconnectingSlow,
    Exchanging,
    UpdatingOutput,
    Restarting,
}

impl StateId {
    pub const COUNT: usize = 6;
}

/// One row of the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
}

/// Every state the controller can be in. Built once, never mutated.
pub static STATE_TABLE: [StateDescriptor; StateId::COUNT] = [
    StateDescriptor {
        id: StateId::Entry,
        name: "Entry",
    },
    StateDescriptor {
        id: StateId::ReconnectingFast,
        name: "ReconnectFast",
    },
    StateDescriptor {
        id: StateId::ReconnectingSlow,
        name: "ReconnectSlow",
    },
    StateDescriptor {
        id: StateId::Exchanging,
        name: "Exchanging",
    },
    StateDescriptor {
        id: StateId::UpdatingOutput,
        name: "UpdatingOutput",
    },
    StateDescriptor {
        id: StateId::Restarting,
        name: "Restarting",
    },
];

/// Outcome of one [`Engine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next(StateId),
    /// Restart requested for an unhandled state; nothing more will run.
    Halted,
}

pub struct Engine<C: Connector, O, R> {
    table: &'static [StateDescriptor],
    current: StateId,
    ctx: Context<C, O, R>,
    ticks: u64,
    halted: bool,
}

impl<C: Connector, O: OutputPort, R: Restarter> Engine<C, O, R> {
    pub fn new(ctx: Context<C, O, R>) -> Self {
        Self::with_table(&STATE_TABLE, StateId::Entry, ctx)
    }

    pub fn with_table(
        table: &'static [StateDescriptor],
        initial: StateId,
        ctx: Context<C, O, R>,
    ) -> Self {
        Self {
            table,
            current: initial,
            ctx,
            ticks: 0,
            halted: false,
        }
    }

    /// Run exactly one state handler.
    pub fn step(&mut self) -> Step {
        if self.halted {
            return Step::Halted;
        }
        let Some(desc) = self.table.iter().find(|d| d.id == self.current) else {
            error!("no handler for state {:?}; restarting machine", self.current);
            self.ctx.detach();
            self.ctx.restarter.restart();
            error!("reboot did not take effect; dispatch halted");
            self.halted = true;
            return Step::Halted;
        };

        self.ticks += 1;
        let next = match desc.id {
            StateId::Entry => self.ctx.entry(),
            StateId::ReconnectingFast => self.ctx.reconnecting_fast(),
            StateId::ReconnectingSlow => self.ctx.reconnecting_slow(),
            StateId::Exchanging => self.ctx.exchanging(),
            StateId::UpdatingOutput => self.ctx.updating_output(),
            StateId::Restarting => self.ctx.restarting(),
        };
        if next != self.current {
            debug!("{} -> {:?}", desc.name, next);
        }
        self.current = next;
        Step::Next(next)
    }

    /// Dispatch forever. Once halted, parks the thread until the reboot lands.
    pub fn run(mut self) -> ! {
        loop {
            if self.step() == Step::Halted {
                loop {
                    std::thread::park();
                }
            }
        }
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn context(&self) -> &Context<C, O, R> {
        &self.ctx
    }
}
