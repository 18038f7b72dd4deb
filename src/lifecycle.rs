//! Message lifecycle: keeping exactly one live message per conversation
//!
//! Same split as everywhere else in the crate: a pure transition function
//! decides what to do next, the driver performs the delivery calls and feeds
//! their outcomes back in as events.

mod driver;
mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use driver::MessageDriver;
pub use effect::RenderEffect;
pub use event::{EditFailure, RenderEvent};
pub use state::RenderState;
pub use transition::{transition, RetryPolicy, TransitionError, TransitionResult};
