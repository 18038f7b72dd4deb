//! Render state

use crate::ids::MessageId;

/// Where a single render is in its create/edit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Render not started
    Idle,
    /// Sending a fresh message
    Creating { attempt: u32 },
    /// Editing the live message in place
    Editing { message_id: MessageId, attempt: u32 },
    /// Exactly one live message showing the window
    Live { message_id: MessageId },
    /// Attempts exhausted or a permanent delivery error
    Failed { attempt: u32 },
}

impl RenderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderState::Live { .. } | RenderState::Failed { .. })
    }

    pub fn attempt(&self) -> u32 {
        match self {
            RenderState::Idle | RenderState::Live { .. } => 0,
            RenderState::Creating { attempt }
            | RenderState::Editing { attempt, .. }
            | RenderState::Failed { attempt } => *attempt,
        }
    }
}
