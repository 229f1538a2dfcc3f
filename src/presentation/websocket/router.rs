//! Event Router
//!
//! Dispatches validated inbound events of an admitted connection to their
//! handlers. Rejected frames are answered with an `error` frame on the same
//! connection and never close it.

use std::sync::Arc;

use super::gateway::Gateway;
use super::messages::{ClientEvent, MembershipPayload, PayloadError, ServerEvent, TypingPayload};
use super::relay::MessageRelay;
use super::session::ConnectionContext;
use crate::infrastructure::metrics;

pub struct EventRouter {
    gateway: Arc<Gateway>,
    relay: MessageRelay,
}

impl EventRouter {
    pub fn new(gateway: Arc<Gateway>, relay: MessageRelay) -> Self {
        Self { gateway, relay }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Parse one text frame and dispatch it.
    pub fn handle_text(&self, ctx: &ConnectionContext, text: &str) -> Result<(), PayloadError> {
        let result = ClientEvent::parse(text).and_then(|event| self.dispatch(ctx, event));

        if let Err(err) = &result {
            self.reject(ctx, err);
        }
        result
    }

    /// Answer a rejected frame with an `error` frame on the same connection.
    pub fn reject(&self, ctx: &ConnectionContext, err: &PayloadError) {
        metrics::record_payload_error(err.code());
        tracing::debug!(
            user_id = %ctx.identity.id,
            connection_id = %ctx.connection_id(),
            error = %err,
            "Rejected inbound frame"
        );
        ctx.handle.send(ServerEvent::from(err).to_frame());
    }

    pub fn dispatch(&self, ctx: &ConnectionContext, event: ClientEvent) -> Result<(), PayloadError> {
        tracing::trace!(
            user_id = %ctx.identity.id,
            event = event.event_name(),
            "Dispatching event"
        );

        match event {
            ClientEvent::NewMessage(payload) => {
                // Detached: the write outlives this call and the connection.
                drop(self.relay.relay(&ctx.identity, payload));
            }
            ClientEvent::TypingStart(payload) => self.typing(ctx, payload, true),
            ClientEvent::TypingStop(payload) => self.typing(ctx, payload, false),
            ClientEvent::ConversationJoined(payload) => {
                self.ensure_self(ctx, &payload)?;
                self.gateway.join(&payload.user_id, &payload.members);
            }
            ClientEvent::ConversationLeft(payload) => {
                self.ensure_self(ctx, &payload)?;
                self.gateway.leave(&payload.user_id, &payload.members);
            }
        }
        Ok(())
    }

    fn typing(&self, ctx: &ConnectionContext, payload: TypingPayload, started: bool) {
        let event = ServerEvent::typing(started, payload.conversation_id);
        self.gateway
            .broadcast_except(&payload.members, &event, ctx.connection_id());
    }

    fn ensure_self(&self, ctx: &ConnectionContext, payload: &MembershipPayload) -> Result<(), PayloadError> {
        if payload.user_id == ctx.identity.id {
            Ok(())
        } else {
            Err(PayloadError::IdentityMismatch)
        }
    }
}
