//! Mock implementations for testing
//!
//! These mocks drive the lifecycle and the navigator without a chat
//! platform or a database.

use crate::config::NavConfig;
use crate::delivery::{DeleteOutcome, DeliveryApi, DeliveryError, EditOutcome, Keyboard};
use crate::ids::{ConversationId, MessageId};
use crate::lifecycle::MessageDriver;
use crate::navigator::{Navigator, StaticRootWindows};
use crate::scheduler::{CleanupJob, CleanupScheduler};
use crate::stack::NavigationStack;
use crate::store::{Field, KeyValueStore, StoreResult};
use crate::window::{InlineButton, WindowKind};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Delivery API
// ============================================================================

/// A delivery call as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryCall {
    SendText { text: String },
    SendPhoto { media: String },
    SendVoice { media: String },
    EditText { message_id: MessageId, text: String },
    EditMedia { message_id: MessageId, media: String },
    EditCaption { message_id: MessageId, text: String },
    Delete { message_id: MessageId },
}

impl DeliveryCall {
    fn is_create(&self) -> bool {
        matches!(
            self,
            DeliveryCall::SendText { .. } | DeliveryCall::SendPhoto { .. } | DeliveryCall::SendVoice { .. }
        )
    }

    fn is_edit(&self) -> bool {
        matches!(
            self,
            DeliveryCall::EditText { .. } | DeliveryCall::EditMedia { .. } | DeliveryCall::EditCaption { .. }
        )
    }
}

/// What a live message currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shown {
    text: String,
    media: Option<String>,
    keyboard: Vec<Vec<InlineButton>>,
}

/// Chat platform double: keeps the messages it created, answers edits of
/// identical content with `NotModified` and edits of unknown ids with
/// `NotFound`. Failures can be queued per call family.
#[derive(Default)]
pub struct MockDelivery {
    next_id: Mutex<i64>,
    live: Mutex<HashMap<MessageId, Shown>>,
    send_failures: Mutex<VecDeque<DeliveryError>>,
    edit_failures: Mutex<VecDeque<DeliveryError>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<DeliveryCall>>,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next send with `error`
    pub fn fail_next_send(&self, error: DeliveryError) {
        self.send_failures.lock().unwrap().push_back(error);
    }

    /// Fail the next edit with `error`
    pub fn fail_next_edit(&self, error: DeliveryError) {
        self.edit_failures.lock().unwrap().push_back(error);
    }

    /// Simulate the user (or the platform) deleting a message
    pub fn mark_deleted(&self, message_id: MessageId) {
        self.live.lock().unwrap().remove(&message_id);
    }

    pub fn calls(&self) -> Vec<DeliveryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.calls().iter().filter(|c| c.is_create()).count()
    }

    pub fn edits(&self) -> usize {
        self.calls().iter().filter(|c| c.is_edit()).count()
    }

    pub fn deletes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DeliveryCall::Delete { .. }))
            .count()
    }

    /// Ids of messages currently visible in the chat
    pub fn live_messages(&self) -> Vec<MessageId> {
        let mut ids: Vec<_> = self.live.lock().unwrap().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Text of a visible message
    pub fn text_of(&self, message_id: MessageId) -> Option<String> {
        self.live
            .lock()
            .unwrap()
            .get(&message_id)
            .map(|shown| shown.text.clone())
    }

    /// Action tokens of a visible message's keyboard, row by row
    pub fn tokens_of(&self, message_id: MessageId) -> Vec<Vec<String>> {
        self.live
            .lock()
            .unwrap()
            .get(&message_id)
            .map(|shown| {
                shown
                    .keyboard
                    .iter()
                    .map(|row| row.iter().map(|b| b.action_token.clone()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: DeliveryCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn create(&self, text: &str, media: Option<&str>, keyboard: &Keyboard) -> Result<MessageId, DeliveryError> {
        if let Some(error) = self.send_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = MessageId(*next);
        self.live.lock().unwrap().insert(
            id,
            Shown {
                text: text.to_string(),
                media: media.map(str::to_string),
                keyboard: keyboard.to_vec(),
            },
        );
        Ok(id)
    }

    fn update(&self, message_id: MessageId, apply: impl FnOnce(&mut Shown)) -> Result<EditOutcome, DeliveryError> {
        if let Some(error) = self.edit_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut live = self.live.lock().unwrap();
        let Some(shown) = live.get_mut(&message_id) else {
            return Ok(EditOutcome::NotFound);
        };
        let before = shown.clone();
        apply(shown);
        if *shown == before {
            Ok(EditOutcome::NotModified)
        } else {
            Ok(EditOutcome::Edited)
        }
    }
}

#[async_trait]
impl DeliveryApi for MockDelivery {
    async fn send_text(
        &self,
        _conv: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        self.record(DeliveryCall::SendText { text: text.to_string() });
        self.create(text, None, keyboard)
    }

    async fn send_photo(
        &self,
        _conv: ConversationId,
        photo: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        self.record(DeliveryCall::SendPhoto { media: photo.to_string() });
        self.create(caption, Some(photo), keyboard)
    }

    async fn send_voice(
        &self,
        _conv: ConversationId,
        voice: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        self.record(DeliveryCall::SendVoice { media: voice.to_string() });
        self.create(caption, Some(voice), keyboard)
    }

    async fn edit_text(
        &self,
        _conv: ConversationId,
        message_id: MessageId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        self.record(DeliveryCall::EditText {
            message_id,
            text: text.to_string(),
        });
        self.update(message_id, |shown| {
            shown.text = text.to_string();
            shown.keyboard = keyboard.to_vec();
        })
    }

    async fn edit_media(
        &self,
        _conv: ConversationId,
        message_id: MessageId,
        _kind: WindowKind,
        media: &str,
    ) -> Result<EditOutcome, DeliveryError> {
        self.record(DeliveryCall::EditMedia {
            message_id,
            media: media.to_string(),
        });
        self.update(message_id, |shown| shown.media = Some(media.to_string()))
    }

    async fn edit_caption(
        &self,
        _conv: ConversationId,
        message_id: MessageId,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        self.record(DeliveryCall::EditCaption {
            message_id,
            text: caption.to_string(),
        });
        self.update(message_id, |shown| {
            shown.text = caption.to_string();
            shown.keyboard = keyboard.to_vec();
        })
    }

    async fn delete_message(
        &self,
        _conv: ConversationId,
        message_id: MessageId,
    ) -> Result<DeleteOutcome, DeliveryError> {
        self.record(DeliveryCall::Delete { message_id });
        if self.live.lock().unwrap().remove(&message_id).is_some() {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<(ConversationId, Field), String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, conv: ConversationId, field: Field) -> StoreResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(&(conv, field)).cloned())
    }

    async fn set(&self, conv: ConversationId, field: Field, value: &str) -> StoreResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert((conv, field), value.to_string());
        Ok(())
    }

    async fn remove(&self, conv: ConversationId, field: Field) -> StoreResult<()> {
        self.values.lock().unwrap().remove(&(conv, field));
        Ok(())
    }
}

// ============================================================================
// Recording scheduler
// ============================================================================

/// Keeps scheduled jobs instead of running them
#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<CleanupJob>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<CleanupJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CleanupScheduler for RecordingScheduler {
    async fn schedule(&self, job: CleanupJob) {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.retain(|pending| pending.key() != job.key());
        jobs.push(job);
    }
}

// ============================================================================
// Navigator harness
// ============================================================================

pub type TestNavigator =
    Navigator<Arc<MockDelivery>, InMemoryStore, Arc<RecordingScheduler>, StaticRootWindows>;

/// Navigator wired to the mocks, with handles for assertions
pub struct Harness {
    pub navigator: TestNavigator,
    pub delivery: Arc<MockDelivery>,
    pub scheduler: Arc<RecordingScheduler>,
}

impl Harness {
    pub fn new(roots: StaticRootWindows) -> Self {
        let delivery = Arc::new(MockDelivery::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let mut config = NavConfig::default();
        config.retry.backoff = Duration::ZERO;
        let driver = MessageDriver::new(
            Arc::clone(&delivery),
            InMemoryStore::new(),
            Arc::clone(&scheduler),
            &config,
        );
        Self {
            navigator: Navigator::new(driver, roots),
            delivery,
            scheduler,
        }
    }

    pub async fn ledger(&self, conv: ConversationId) -> Vec<MessageId> {
        self.navigator
            .driver()
            .store()
            .load_ledger(conv)
            .await
            .unwrap()
    }

    pub async fn stack(&self, conv: ConversationId) -> NavigationStack {
        self.navigator
            .driver()
            .store()
            .load_stack(conv)
            .await
            .unwrap()
    }
}
