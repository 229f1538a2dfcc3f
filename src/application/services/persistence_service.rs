//! Persistence Service
//!
//! Writes relayed messages to the durable store, retrying with exponential
//! backoff. Callers run it on a detached task so delivery never waits.

use std::sync::Arc;
use std::time::Duration;

use crate::config::PersistenceSettings;
use crate::domain::{DurableId, DurableMessage, MessageStore, PersistError};
use crate::infrastructure::metrics;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl From<&PersistenceSettings> for RetryPolicy {
    fn from(settings: &PersistenceSettings) -> Self {
        Self::new(settings.max_attempts, settings.initial_backoff())
    }
}

#[derive(Clone)]
pub struct PersistenceService {
    store: Arc<dyn MessageStore>,
    policy: RetryPolicy,
}

impl PersistenceService {
    pub fn new(store: Arc<dyn MessageStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Write `message`, retrying transient failures until it succeeds or
    /// attempts run out. A permanent failure is returned at once.
    pub async fn persist(&self, message: &DurableMessage) -> Result<DurableId, PersistError> {
        let mut attempt = 1;
        loop {
            match self.store.write_message(message).await {
                Ok(id) => {
                    metrics::record_persist_outcome("ok");
                    tracing::debug!(
                        durable_id = %id,
                        conversation_id = %message.conversation_id,
                        attempt,
                        "Message persisted"
                    );
                    return Ok(id);
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    metrics::record_persist_outcome("retry");
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        error = %err,
                        conversation_id = %message.conversation_id,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Message write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    metrics::record_persist_outcome("failed");
                    tracing::error!(
                        error = %err,
                        sender_id = %message.sender_id,
                        conversation_id = %message.conversation_id,
                        attempts = attempt,
                        transient = err.is_transient(),
                        "Message write failed permanently"
                    );
                    return Err(err);
                }
            }
        }
    }
}
