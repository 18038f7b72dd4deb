//! Deferred cleanup of rendered messages
//!
//! Every message the driver creates gets a best-effort deletion scheduled
//! for later so abandoned screens expire on their own. Jobs are keyed by
//! `(conversation, message)`; scheduling the same key again replaces the
//! pending job. A job that finds its message already gone counts as done.

use crate::delivery::{DeleteOutcome, DeliveryApi};
use crate::ids::{ConversationId, MessageId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A scheduled deletion of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupJob {
    pub conv: ConversationId,
    pub message_id: MessageId,
    pub fire_at: DateTime<Utc>,
}

impl CleanupJob {
    pub fn new(conv: ConversationId, message_id: MessageId, fire_at: DateTime<Utc>) -> Self {
        Self {
            conv,
            message_id,
            fire_at,
        }
    }

    /// Idempotency key
    pub fn key(&self) -> (ConversationId, MessageId) {
        (self.conv, self.message_id)
    }
}

#[async_trait]
pub trait CleanupScheduler: Send + Sync {
    /// Schedule `job`, replacing any pending job with the same key
    async fn schedule(&self, job: CleanupJob);
}

#[async_trait]
impl<T: CleanupScheduler + ?Sized> CleanupScheduler for Arc<T> {
    async fn schedule(&self, job: CleanupJob) {
        (**self).schedule(job).await;
    }
}

type JobMap = HashMap<(ConversationId, MessageId), (u64, JoinHandle<()>)>;

/// In-process scheduler: one sleeping tokio task per pending job
pub struct TokioCleanupScheduler<D> {
    delivery: Arc<D>,
    jobs: Arc<Mutex<JobMap>>,
    next_generation: Mutex<u64>,
    shutdown: CancellationToken,
}

impl<D: DeliveryApi + 'static> TokioCleanupScheduler<D> {
    pub fn new(delivery: Arc<D>) -> Self {
        Self {
            delivery,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Mutex::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of jobs still waiting to fire
    pub fn pending(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    /// Cancel every pending job
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if let Ok(mut jobs) = self.jobs.lock() {
            for (_, (_, handle)) in jobs.drain() {
                handle.abort();
            }
        }
    }

    fn generation(&self) -> u64 {
        let Ok(mut next) = self.next_generation.lock() else {
            return 0;
        };
        *next += 1;
        *next
    }
}

#[async_trait]
impl<D: DeliveryApi + 'static> CleanupScheduler for TokioCleanupScheduler<D> {
    async fn schedule(&self, job: CleanupJob) {
        if self.shutdown.is_cancelled() {
            tracing::debug!(conv_id = %job.conv, message_id = %job.message_id, "Scheduler stopped, job dropped");
            return;
        }

        let key = job.key();
        let generation = self.generation();
        let delay = (job.fire_at - Utc::now()).to_std().unwrap_or_default();
        let delivery = Arc::clone(&self.delivery);
        let jobs = Arc::clone(&self.jobs);
        let token = self.shutdown.clone();

        // Hold the map while spawning so a zero-delay job cannot finish
        // before its entry exists.
        let Ok(mut pending) = self.jobs.lock() else {
            return;
        };
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            fire(delivery.as_ref(), &job).await;
            if let Ok(mut jobs) = jobs.lock() {
                if jobs.get(&key).is_some_and(|(g, _)| *g == generation) {
                    jobs.remove(&key);
                }
            }
        });

        if let Some((_, previous)) = pending.insert(key, (generation, handle)) {
            previous.abort();
            tracing::debug!(conv_id = %key.0, message_id = %key.1, "Replaced pending cleanup job");
        }
    }
}

/// Delete the job's message; a missing message is success
pub async fn fire<D: DeliveryApi + ?Sized>(delivery: &D, job: &CleanupJob) {
    match delivery.delete_message(job.conv, job.message_id).await {
        Ok(DeleteOutcome::Deleted) => {
            tracing::debug!(conv_id = %job.conv, message_id = %job.message_id, "Expired message deleted");
        }
        Ok(DeleteOutcome::NotFound) => {
            tracing::debug!(conv_id = %job.conv, message_id = %job.message_id, "Expired message already gone");
        }
        Err(e) => {
            tracing::warn!(
                conv_id = %job.conv,
                message_id = %job.message_id,
                error = %e,
                "Cleanup deletion failed"
            );
        }
    }
}
