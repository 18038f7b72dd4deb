//! Delivery outcomes fed back into the render state machine

use crate::ids::MessageId;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Begin a render. `live` is the newest ledger entry; `same_kind` says
    /// whether it was rendered with the same window kind.
    Start {
        live: Option<MessageId>,
        same_kind: bool,
    },
    Created {
        message_id: MessageId,
    },
    CreateFailed {
        transient: bool,
        retry_after: Option<Duration>,
    },
    Edited,
    /// Platform refused the edit because nothing changed
    NotModified,
    EditFailed {
        reason: EditFailure,
    },
}

/// Why an in-place edit could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditFailure {
    /// The message is gone
    NotFound,
    /// Rate limit, network or any other refusal
    Error {
        transient: bool,
        retry_after: Option<Duration>,
    },
}
