//! Pure render transition function
//!
//! Given the current render state and a delivery outcome, decide the next
//! state and the effects to run. No I/O happens here.

use super::{EditFailure, RenderEffect, RenderEvent, RenderState};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Bound on delivery attempts within one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    fn delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(self.backoff)
    }
}

/// Result of a render transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RenderState,
    pub effects: Vec<RenderEffect>,
}

impl TransitionResult {
    pub fn new(state: RenderState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: RenderEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid render transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &RenderState,
    policy: &RetryPolicy,
    event: RenderEvent,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Empty conversation: create
        (RenderState::Idle, RenderEvent::Start { live: None, .. }) => {
            Ok(TransitionResult::new(RenderState::Creating { attempt: 1 })
                .with_effect(RenderEffect::Create))
        }

        // Live message of the same kind: edit in place
        (
            RenderState::Idle,
            RenderEvent::Start {
                live: Some(message_id),
                same_kind: true,
            },
        ) => Ok(TransitionResult::new(RenderState::Editing {
            message_id,
            attempt: 1,
        })
        .with_effect(RenderEffect::Edit { message_id })),

        // A text message cannot become a photo: replace it
        (
            RenderState::Idle,
            RenderEvent::Start {
                live: Some(message_id),
                same_kind: false,
            },
        ) => Ok(TransitionResult::new(RenderState::Creating { attempt: 1 })
            .with_effect(RenderEffect::Discard { message_id })
            .with_effect(RenderEffect::Create)),

        (RenderState::Creating { .. }, RenderEvent::Created { message_id }) => {
            Ok(TransitionResult::new(RenderState::Live { message_id })
                .with_effect(RenderEffect::Record { message_id })
                .with_effect(RenderEffect::ScheduleCleanup { message_id }))
        }

        (
            RenderState::Creating { attempt },
            RenderEvent::CreateFailed {
                transient,
                retry_after,
            },
        ) => {
            if transient && *attempt < policy.max_attempts {
                Ok(TransitionResult::new(RenderState::Creating {
                    attempt: attempt + 1,
                })
                .with_effect(RenderEffect::Backoff {
                    delay: policy.delay(retry_after),
                })
                .with_effect(RenderEffect::Create))
            } else {
                Ok(TransitionResult::new(RenderState::Failed { attempt: *attempt }))
            }
        }

        // Identical content is as good as an edit
        (
            RenderState::Editing { message_id, .. },
            RenderEvent::Edited | RenderEvent::NotModified,
        ) => Ok(TransitionResult::new(RenderState::Live {
            message_id: *message_id,
        })),

        // Stale, vanished or throttled: drop it and start over with a create
        (RenderState::Editing { message_id, attempt }, RenderEvent::EditFailed { reason }) => {
            let discard = RenderEffect::Discard {
                message_id: *message_id,
            };
            if *attempt >= policy.max_attempts {
                return Ok(TransitionResult::new(RenderState::Failed { attempt: *attempt })
                    .with_effect(discard));
            }
            let mut result = TransitionResult::new(RenderState::Creating {
                attempt: attempt + 1,
            })
            .with_effect(discard);
            if let EditFailure::Error {
                transient: true,
                retry_after,
            } = reason
            {
                result = result.with_effect(RenderEffect::Backoff {
                    delay: policy.delay(retry_after),
                });
            }
            Ok(result.with_effect(RenderEffect::Create))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} on {event:?}"
        ))),
    }
}
