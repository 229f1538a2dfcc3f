//! Message Relay
//!
//! Handles `new-message`: the ephemeral message is fanned out first, then
//! a detached task writes the durable copy. A failed write never retracts
//! what members already saw; the sender is told instead.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use super::gateway::Gateway;
use super::messages::{ConversationEvent, NewMessageEvent, NewMessagePayload, PersistFailedEvent, ServerEvent};
use crate::application::services::PersistenceService;
use crate::domain::{DurableId, DurableMessage, EphemeralMessage, PersistError, UserIdentity};
use crate::infrastructure::metrics;

#[derive(Clone)]
pub struct MessageRelay {
    gateway: Arc<Gateway>,
    persistence: PersistenceService,
}

impl MessageRelay {
    pub fn new(gateway: Arc<Gateway>, persistence: PersistenceService) -> Self {
        Self {
            gateway,
            persistence,
        }
    }

    /// Broadcast the message and start its durable write.
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; the write keeps running even if the sender disconnects.
    pub fn relay(
        &self,
        sender: &UserIdentity,
        payload: NewMessagePayload,
    ) -> JoinHandle<Result<DurableId, PersistError>> {
        let NewMessagePayload {
            conversation_id,
            members,
            content,
        } = payload;

        let message = EphemeralMessage::new(sender, conversation_id.clone(), content.clone());
        let message_id = message.id;
        let durable = DurableMessage::new(sender.id.clone(), conversation_id.clone(), content);

        let delivered = self.gateway.broadcast(
            &members,
            &ServerEvent::NewMessage(NewMessageEvent {
                conversation_id: conversation_id.clone(),
                message,
            }),
        );
        self.gateway.broadcast(
            &members,
            &ServerEvent::NewMessageAlert(ConversationEvent {
                conversation_id: conversation_id.clone(),
            }),
        );
        metrics::record_message_relayed();

        tracing::debug!(
            sender_id = %sender.id,
            conversation_id = %conversation_id,
            message_id = %message_id,
            delivered,
            "Message broadcast"
        );

        let span = tracing::info_span!(
            "persist_message",
            sender_id = %sender.id,
            conversation_id = %conversation_id,
            message_id = %message_id,
        );
        let gateway = Arc::clone(&self.gateway);
        let persistence = self.persistence.clone();
        let sender_id = sender.id.clone();

        tokio::spawn(
            async move {
                let result = persistence.persist(&durable).await;
                if result.is_err() {
                    let notice = ServerEvent::MessagePersistFailed(PersistFailedEvent {
                        conversation_id: durable.conversation_id.clone(),
                        message_id,
                    });
                    if !gateway.send_to_user(&sender_id, &notice) {
                        tracing::debug!("Sender offline, persist failure not delivered");
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}
