//! Chat bot: relays customer messages between the chat and a [`Responder`].

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Handoff;
use crate::connect::ContactCenter;
use crate::error::LogFailure;
use crate::models::{ChatMessageEvent, ChatSession, SnsEvent};
use crate::responder::Responder;
use crate::store::SessionStore;

/// Sent when the responder has no answer.
pub const FALLBACK_REPLY: &str = "error generating answer";

const CUSTOMER_ROLE: &str = "CUSTOMER";
const MESSAGE_TYPE: &str = "MESSAGE";

/// Tally of one SNS batch, returned for the invocation log.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub messages_processed: u32,
    pub replies_sent: u32,
    pub sessions_closed: u32,
    pub skipped: u32,
}

enum Outcome {
    Replied,
    Closed,
    Skipped,
}

/// Relays customer chat messages to the responder and back.
pub struct MessageRelay {
    store: Arc<dyn SessionStore>,
    platform: Arc<dyn ContactCenter>,
    responder: Arc<dyn Responder>,
    quit_keyword: String,
    handoff: Option<Handoff>,
}

impl MessageRelay {
    pub fn new(
        store: Arc<dyn SessionStore>,
        platform: Arc<dyn ContactCenter>,
        responder: Arc<dyn Responder>,
        quit_keyword: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            responder,
            quit_keyword: quit_keyword.into(),
            handoff: None,
        }
    }

    /// Transfer contacts to another flow after the bot leaves.
    pub fn with_handoff(mut self, handoff: Option<Handoff>) -> Self {
        self.handoff = handoff;
        self
    }

    /// Whether `content` is the keyword that ends the bot conversation.
    pub fn is_quit(&self, content: &str) -> bool {
        content.to_lowercase() == self.quit_keyword.to_lowercase()
    }

    /// Process every record in order. Never fails; each record stands alone.
    pub async fn relay(&self, event: SnsEvent) -> RelayResponse {
        let mut response = RelayResponse::default();

        for record in &event.records {
            response.messages_processed += 1;

            let message: ChatMessageEvent = match serde_json::from_str(&record.sns.message) {
                Ok(m) => m,
                Err(e) => {
                    error!(message_id = ?record.sns.message_id, error = %e, "Invalid message");
                    response.skipped += 1;
                    continue;
                }
            };

            match self.relay_message(&message).await {
                Outcome::Replied => response.replies_sent += 1,
                Outcome::Closed => response.sessions_closed += 1,
                Outcome::Skipped => response.skipped += 1,
            }
        }

        info!(
            processed = response.messages_processed,
            replies = response.replies_sent,
            closed = response.sessions_closed,
            skipped = response.skipped,
            "Chat relay complete"
        );
        response
    }

    async fn relay_message(&self, message: &ChatMessageEvent) -> Outcome {
        let (contact_id, content) = match (message.contact_id.as_deref(), message.content.as_deref()) {
            (Some(contact_id), Some(content)) if !contact_id.is_empty() && !content.is_empty() => {
                (contact_id, content)
            }
            _ => {
                error!("Invalid message");
                return Outcome::Skipped;
            }
        };

        if !is_customer_message(message) {
            info!(
                contact_id,
                role = ?message.participant_role,
                message_type = ?message.message_type,
                "Ignoring non-customer message"
            );
            return Outcome::Skipped;
        }

        info!(contact_id, "Message");

        let session = match self
            .store
            .get(contact_id)
            .await
            .log_failure("GetItem", contact_id)
            .flatten()
        {
            Some(session) => session,
            None => {
                error!(contact_id, "No connection token found");
                return Outcome::Skipped;
            }
        };

        if self.is_quit(content) {
            self.close(&session).await;
            return Outcome::Closed;
        }

        self.platform
            .send_typing(&session.connection_token)
            .await
            .log_failure("SendEvent", contact_id);

        let answer = self
            .responder
            .respond(content)
            .await
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        match self
            .platform
            .send_message(&session.connection_token, &answer)
            .await
            .log_failure("SendMessage", contact_id)
        {
            Some(_) => Outcome::Replied,
            None => Outcome::Skipped,
        }
    }

    async fn close(&self, session: &ChatSession) {
        let contact_id = session.contact_id.as_str();

        self.platform
            .disconnect_participant(&session.connection_token)
            .await
            .log_failure("DisconnectParticipant", contact_id);

        if session.streaming_id.is_empty() {
            warn!(contact_id, "Session has no streaming id");
        } else {
            self.platform
                .stop_chat_streaming(contact_id, &session.streaming_id)
                .await
                .log_failure("StopContactStreaming", contact_id);
        }

        if let Some(handoff) = &self.handoff {
            self.platform
                .transfer_contact(
                    contact_id,
                    &handoff.target_flow_id,
                    handoff.queue_id.as_deref(),
                )
                .await
                .log_failure("TransferContact", contact_id);
        }

        info!(contact_id, "Bot left chat");
    }
}

/// A missing role or type is accepted; only explicit mismatches are rejected.
fn is_customer_message(message: &ChatMessageEvent) -> bool {
    let role_ok = message
        .participant_role
        .as_deref()
        .map_or(true, |role| role == CUSTOMER_ROLE);
    let type_ok = message
        .message_type
        .as_deref()
        .map_or(true, |kind| kind == MESSAGE_TYPE);
    role_ok && type_ok
}
