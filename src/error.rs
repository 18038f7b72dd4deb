//! Navigation error taxonomy
//!
//! Delivery hiccups that the lifecycle loop can absorb never reach this
//! type: `NotModified` is success and stale references are recreated. What
//! remains is either recoverable by falling back to the root window or fatal.

use crate::delivery::DeliveryError;
use crate::lifecycle::TransitionError;
use crate::store::StoreError;
use crate::window::WindowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// A handler produced a window that cannot be rendered
    #[error("Malformed window `{screen}`: {source}")]
    MalformedWindow {
        screen: String,
        #[source]
        source: WindowError,
    },

    /// The delivery API kept failing after the bounded retry loop
    #[error("Delivery failed after {attempts} attempt(s): {source}")]
    Delivery {
        attempts: u32,
        #[source]
        source: DeliveryError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// `replace_top` / `flip_page` on a conversation with no windows
    #[error("Navigation stack is empty")]
    EmptyStack,

    /// The root window itself failed; nothing left to fall back to
    #[error("Root window `{screen}` failed to render: {source}")]
    RootFailed {
        screen: String,
        #[source]
        source: Box<NavError>,
    },

    #[error(transparent)]
    Lifecycle(#[from] TransitionError),
}

impl NavError {
    /// Recoverable errors are handled inside the navigator (fallback to
    /// root) or are no-ops the caller may ignore.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NavError::MalformedWindow { .. } | NavError::EmptyStack)
    }

    /// Short classification for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            NavError::MalformedWindow { .. } => "malformed_window",
            NavError::Delivery { .. } => "delivery",
            NavError::Store(_) => "store",
            NavError::EmptyStack => "empty_stack",
            NavError::RootFailed { .. } => "root_failed",
            NavError::Lifecycle(_) => "lifecycle",
        }
    }
}

pub type NavResult<T> = Result<T, NavError>;
