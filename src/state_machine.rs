//! Session lifecycle state machine
//!
//! Elm Architecture: a pure transition function over an explicit state
//! value. All I/O is described as effects and carried out by the
//! orchestrator.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{Session, SessionContext, SessionState};
pub use transition::{transition, TransitionError};
