//! Message lifecycle driver
//!
//! Owns the delivery client, the store and the cleanup scheduler. Runs the
//! render state machine to completion for one window: contextualize the
//! ledger, then create or edit until exactly one message shows the window.

use super::{transition, EditFailure, RenderEffect, RenderEvent, RenderState, RetryPolicy};
use crate::config::NavConfig;
use crate::delivery::{DeleteOutcome, DeliveryApi, DeliveryError, EditOutcome};
use crate::error::{NavError, NavResult};
use crate::ids::{ConversationId, MessageId};
use crate::scheduler::{CleanupJob, CleanupScheduler};
use crate::store::{ConversationStore, KeyValueStore};
use crate::window::{MediaPlaceholders, MessageContent, WindowKind};
use chrono::Utc;

pub struct MessageDriver<D, S, C> {
    delivery: D,
    store: ConversationStore<S>,
    scheduler: C,
    policy: RetryPolicy,
    message_ttl: chrono::Duration,
    placeholders: MediaPlaceholders,
}

impl<D, S, C> MessageDriver<D, S, C>
where
    D: DeliveryApi,
    S: KeyValueStore,
    C: CleanupScheduler,
{
    pub fn new(delivery: D, store: S, scheduler: C, config: &NavConfig) -> Self {
        Self {
            delivery,
            store: ConversationStore::new(store),
            scheduler,
            policy: config.retry,
            message_ttl: chrono::Duration::from_std(config.message_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
            placeholders: config.placeholders.clone(),
        }
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn placeholders(&self) -> &MediaPlaceholders {
        &self.placeholders
    }

    /// Delete every live message except the newest. Returns the ledger.
    pub async fn contextualize(&self, conv: ConversationId) -> NavResult<Vec<MessageId>> {
        let mut ledger = self.store.load_ledger(conv).await?;
        if let Some((_, stale)) = ledger.clone().split_last() {
            if !stale.is_empty() {
                tracing::warn!(conv_id = %conv, stale = stale.len(), "Removing stale live messages");
            }
            for message_id in stale {
                self.discard(conv, &mut ledger, *message_id).await?;
            }
        }
        Ok(ledger)
    }

    /// Delete every live message
    pub async fn clear(&self, conv: ConversationId) -> NavResult<()> {
        let mut ledger = self.store.load_ledger(conv).await?;
        for message_id in ledger.clone() {
            self.discard(conv, &mut ledger, message_id).await?;
        }
        Ok(())
    }

    /// Make `content` the single live message of the conversation.
    ///
    /// `live_kind` is the kind of window the current live message shows, if
    /// known; a kind change forces delete-and-recreate.
    pub async fn render(
        &self,
        conv: ConversationId,
        content: &MessageContent,
        live_kind: Option<WindowKind>,
    ) -> NavResult<MessageId> {
        let mut ledger = self.contextualize(conv).await?;

        let mut state = RenderState::Idle;
        let mut last_error: Option<DeliveryError> = None;
        let mut events = vec![RenderEvent::Start {
            live: ledger.last().copied(),
            same_kind: live_kind.is_none_or(|kind| kind == content.kind),
        }];

        // Explicit loop; every transition yields at most one follow-up event
        while let Some(event) = events.pop() {
            let result = transition(&state, &self.policy, event)?;
            state = result.new_state;
            for effect in result.effects {
                if let Some(next) = self
                    .execute_effect(conv, &mut ledger, content, effect, &mut last_error)
                    .await?
                {
                    events.push(next);
                }
            }
        }

        if !state.is_terminal() {
            return Err(NavError::Lifecycle(super::TransitionError::InvalidTransition(
                format!("Render stopped in non-terminal state {state:?}"),
            )));
        }
        if let RenderState::Live { message_id } = state {
            return Ok(message_id);
        }

        let attempts = state.attempt();
        let source =
            last_error.unwrap_or_else(|| DeliveryError::unknown("live message vanished during render"));
        tracing::error!(
            conv_id = %conv,
            kind = content.kind.as_str(),
            attempts,
            error = %source,
            "Render failed"
        );
        Err(NavError::Delivery { attempts, source })
    }

    async fn execute_effect(
        &self,
        conv: ConversationId,
        ledger: &mut Vec<MessageId>,
        content: &MessageContent,
        effect: RenderEffect,
        last_error: &mut Option<DeliveryError>,
    ) -> NavResult<Option<RenderEvent>> {
        match effect {
            RenderEffect::Create => match self.send(conv, content).await {
                Ok(message_id) => Ok(Some(RenderEvent::Created { message_id })),
                Err(e) => {
                    tracing::warn!(conv_id = %conv, error = %e, transient = e.is_transient(), "Create failed");
                    let event = RenderEvent::CreateFailed {
                        transient: e.is_transient(),
                        retry_after: e.retry_after,
                    };
                    *last_error = Some(e);
                    Ok(Some(event))
                }
            },

            RenderEffect::Edit { message_id } => match self.edit(conv, message_id, content).await {
                Ok(EditOutcome::Edited) => Ok(Some(RenderEvent::Edited)),
                Ok(EditOutcome::NotModified) => {
                    tracing::debug!(conv_id = %conv, message_id = %message_id, "Content unchanged");
                    Ok(Some(RenderEvent::NotModified))
                }
                Ok(EditOutcome::NotFound) => {
                    tracing::warn!(conv_id = %conv, message_id = %message_id, "Live message gone, recreating");
                    Ok(Some(RenderEvent::EditFailed {
                        reason: EditFailure::NotFound,
                    }))
                }
                Err(e) => {
                    tracing::warn!(conv_id = %conv, message_id = %message_id, error = %e, "Edit failed, recreating");
                    let reason = EditFailure::Error {
                        transient: e.is_transient(),
                        retry_after: e.retry_after,
                    };
                    *last_error = Some(e);
                    Ok(Some(RenderEvent::EditFailed { reason }))
                }
            },

            RenderEffect::Discard { message_id } => {
                self.discard(conv, ledger, message_id).await?;
                Ok(None)
            }

            RenderEffect::Backoff { delay } => {
                tokio::time::sleep(delay).await;
                Ok(None)
            }

            RenderEffect::Record { message_id } => {
                ledger.push(message_id);
                self.store.save_ledger(conv, ledger).await?;
                Ok(None)
            }

            RenderEffect::ScheduleCleanup { message_id } => {
                let fire_at = Utc::now() + self.message_ttl;
                self.scheduler
                    .schedule(CleanupJob::new(conv, message_id, fire_at))
                    .await;
                Ok(None)
            }
        }
    }

    /// Delete a message (already gone is fine) and drop it from the ledger
    async fn discard(
        &self,
        conv: ConversationId,
        ledger: &mut Vec<MessageId>,
        message_id: MessageId,
    ) -> NavResult<()> {
        match self.delivery.delete_message(conv, message_id).await {
            Ok(DeleteOutcome::Deleted | DeleteOutcome::NotFound) => {}
            Err(e) => {
                tracing::warn!(conv_id = %conv, message_id = %message_id, error = %e, "Delete failed, forgetting message");
            }
        }
        ledger.retain(|id| *id != message_id);
        self.store.save_ledger(conv, ledger).await?;
        Ok(())
    }

    // ========================================================================
    // Per-kind render strategies
    // ========================================================================

    async fn send(&self, conv: ConversationId, content: &MessageContent) -> Result<MessageId, DeliveryError> {
        let keyboard = content.keyboard.as_slice();
        match (content.kind, content.media.as_deref()) {
            (WindowKind::Text, _) => self.delivery.send_text(conv, &content.text, keyboard).await,
            (WindowKind::Photo, Some(photo)) => {
                self.delivery
                    .send_photo(conv, photo, &content.text, keyboard)
                    .await
            }
            (WindowKind::Voice, Some(voice)) => {
                self.delivery
                    .send_voice(conv, voice, &content.text, keyboard)
                    .await
            }
            (kind, None) => Err(DeliveryError::rejected(format!(
                "{} message without media",
                kind.as_str()
            ))),
        }
    }

    async fn edit(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        content: &MessageContent,
    ) -> Result<EditOutcome, DeliveryError> {
        let keyboard = content.keyboard.as_slice();
        let media = match (content.kind, content.media.as_deref()) {
            (WindowKind::Text, _) => {
                return self
                    .delivery
                    .edit_text(conv, message_id, &content.text, keyboard)
                    .await;
            }
            (_, Some(media)) => media,
            (kind, None) => {
                return Err(DeliveryError::rejected(format!(
                    "{} message without media",
                    kind.as_str()
                )))
            }
        };

        let media_outcome = self
            .delivery
            .edit_media(conv, message_id, content.kind, media)
            .await?;
        if media_outcome == EditOutcome::NotFound {
            return Ok(EditOutcome::NotFound);
        }
        let caption_outcome = self
            .delivery
            .edit_caption(conv, message_id, &content.text, keyboard)
            .await?;
        Ok(merge_edit_outcomes(media_outcome, caption_outcome))
    }
}

/// A media message counts as unchanged only if both halves were unchanged
fn merge_edit_outcomes(media: EditOutcome, caption: EditOutcome) -> EditOutcome {
    match (media, caption) {
        (EditOutcome::NotFound, _) | (_, EditOutcome::NotFound) => EditOutcome::NotFound,
        (EditOutcome::NotModified, EditOutcome::NotModified) => EditOutcome::NotModified,
        _ => EditOutcome::Edited,
    }
}
