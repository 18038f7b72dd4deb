//! Delivery failures
//!
//! Chat platforms answer a refused call with a status code and a description;
//! flood control also says how long to wait. `from_status` folds that answer
//! into a kind the render loop can branch on.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{description}")]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    /// Platform description, or the transport error text
    pub description: String,
    /// Wait demanded by flood control
    pub retry_after: Option<Duration>,
}

impl DeliveryError {
    /// Classify a platform refusal by its status code
    pub fn from_status(status: u16, description: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let kind = match status {
            429 => DeliveryErrorKind::Flood,
            500..=599 => DeliveryErrorKind::PlatformDown,
            _ => DeliveryErrorKind::Rejected,
        };
        Self {
            kind,
            description: description.into(),
            retry_after,
        }
    }

    /// Flood control with the platform's wait hint
    pub fn flood(retry_after: Duration) -> Self {
        Self {
            kind: DeliveryErrorKind::Flood,
            description: format!("flood control, retry in {}s", retry_after.as_secs()),
            retry_after: Some(retry_after),
        }
    }

    /// The request never got an answer
    pub fn network(description: impl Into<String>) -> Self {
        Self::bare(DeliveryErrorKind::Network, description)
    }

    pub fn rejected(description: impl Into<String>) -> Self {
        Self::bare(DeliveryErrorKind::Rejected, description)
    }

    pub fn unknown(description: impl Into<String>) -> Self {
        Self::bare(DeliveryErrorKind::Unknown, description)
    }

    fn bare(kind: DeliveryErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            retry_after: None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// Connection reset or timeout
    Network,
    /// 429
    Flood,
    /// 5xx
    PlatformDown,
    /// The platform will keep refusing this call (bad request, bot blocked)
    Rejected,
    Unknown,
}

impl DeliveryErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::Flood | Self::PlatformDown)
    }
}
