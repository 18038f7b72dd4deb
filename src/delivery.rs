//! Delivery API abstraction
//!
//! The chat platform as seen by the lifecycle driver: create, edit and delete
//! messages. Status codes the driver must branch on (`NotModified`,
//! `NotFound`) are explicit outcomes, not errors.

mod error;

pub use error::{DeliveryError, DeliveryErrorKind};

use crate::ids::{ConversationId, MessageId};
use crate::window::{InlineButton, WindowKind};
use async_trait::async_trait;
use std::sync::Arc;

pub type Keyboard = [Vec<InlineButton>];

/// Result of an edit call the platform accepted or refused in a known way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// Content identical to what is already shown
    NotModified,
    /// Message no longer exists (deleted, expired, stale id)
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[async_trait]
pub trait DeliveryApi: Send + Sync {
    async fn send_text(
        &self,
        conv: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError>;

    async fn send_photo(
        &self,
        conv: ConversationId,
        photo: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError>;

    async fn send_voice(
        &self,
        conv: ConversationId,
        voice: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError>;

    async fn edit_text(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError>;

    /// Swap the attachment of a photo or voice message
    async fn edit_media(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        kind: WindowKind,
        media: &str,
    ) -> Result<EditOutcome, DeliveryError>;

    async fn edit_caption(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError>;

    async fn delete_message(
        &self,
        conv: ConversationId,
        message_id: MessageId,
    ) -> Result<DeleteOutcome, DeliveryError>;
}

// ============================================================================
// Arc implementation for trait objects
// ============================================================================

#[async_trait]
impl<T: DeliveryApi + ?Sized> DeliveryApi for Arc<T> {
    async fn send_text(
        &self,
        conv: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        (**self).send_text(conv, text, keyboard).await
    }

    async fn send_photo(
        &self,
        conv: ConversationId,
        photo: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        (**self).send_photo(conv, photo, caption, keyboard).await
    }

    async fn send_voice(
        &self,
        conv: ConversationId,
        voice: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        (**self).send_voice(conv, voice, caption, keyboard).await
    }

    async fn edit_text(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        (**self).edit_text(conv, message_id, text, keyboard).await
    }

    async fn edit_media(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        kind: WindowKind,
        media: &str,
    ) -> Result<EditOutcome, DeliveryError> {
        (**self).edit_media(conv, message_id, kind, media).await
    }

    async fn edit_caption(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        (**self).edit_caption(conv, message_id, caption, keyboard).await
    }

    async fn delete_message(
        &self,
        conv: ConversationId,
        message_id: MessageId,
    ) -> Result<DeleteOutcome, DeliveryError> {
        (**self).delete_message(conv, message_id).await
    }
}

// ============================================================================
// Logging wrapper
// ============================================================================

/// Logs duration and outcome of every delivery call
pub struct LoggingDelivery<D> {
    inner: D,
}

impl<D: DeliveryApi> LoggingDelivery<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

fn log_call<T: std::fmt::Debug>(
    call: &'static str,
    conv: ConversationId,
    started: std::time::Instant,
    result: &Result<T, DeliveryError>,
) {
    let duration = started.elapsed();
    match result {
        Ok(outcome) => {
            tracing::info!(
                call,
                conv_id = %conv,
                duration_ms = %duration.as_millis(),
                outcome = ?outcome,
                "Delivery call completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                call,
                conv_id = %conv,
                duration_ms = %duration.as_millis(),
                error = %e.description,
                transient = e.is_transient(),
                "Delivery call failed"
            );
        }
    }
}

#[async_trait]
impl<D: DeliveryApi> DeliveryApi for LoggingDelivery<D> {
    async fn send_text(
        &self,
        conv: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_text(conv, text, keyboard).await;
        log_call("send_text", conv, start, &result);
        result
    }

    async fn send_photo(
        &self,
        conv: ConversationId,
        photo: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_photo(conv, photo, caption, keyboard).await;
        log_call("send_photo", conv, start, &result);
        result
    }

    async fn send_voice(
        &self,
        conv: ConversationId,
        voice: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_voice(conv, voice, caption, keyboard).await;
        log_call("send_voice", conv, start, &result);
        result
    }

    async fn edit_text(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.edit_text(conv, message_id, text, keyboard).await;
        log_call("edit_text", conv, start, &result);
        result
    }

    async fn edit_media(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        kind: WindowKind,
        media: &str,
    ) -> Result<EditOutcome, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.edit_media(conv, message_id, kind, media).await;
        log_call("edit_media", conv, start, &result);
        result
    }

    async fn edit_caption(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self
            .inner
            .edit_caption(conv, message_id, caption, keyboard)
            .await;
        log_call("edit_caption", conv, start, &result);
        result
    }

    async fn delete_message(
        &self,
        conv: ConversationId,
        message_id: MessageId,
    ) -> Result<DeleteOutcome, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.delete_message(conv, message_id).await;
        log_call("delete_message", conv, start, &result);
        result
    }
}
