//! Effects produced by render transitions

use crate::ids::MessageId;
use std::time::Duration;

/// Side effects the driver executes after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEffect {
    /// Send a new message for the window
    Create,
    /// Edit the live message in place
    Edit { message_id: MessageId },
    /// Delete a message and drop it from the ledger
    Discard { message_id: MessageId },
    /// Wait before the next attempt
    Backoff { delay: Duration },
    /// Append a new message id to the ledger
    Record { message_id: MessageId },
    /// Arrange for the message to expire later
    ScheduleCleanup { message_id: MessageId },
}

impl RenderEffect {
    /// Effects whose execution yields the next event
    #[cfg(test)]
    pub fn produces_event(&self) -> bool {
        matches!(self, RenderEffect::Create | RenderEffect::Edit { .. })
    }
}
