//! Start bot: joins a new chat contact and opens the bot session.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::connect::ContactCenter;
use crate::error::LogFailure;
use crate::models::{ChatSession, ContactFlowEvent, ContactFlowResult};
use crate::store::SessionStore;

/// Handles the contact flow invocation that starts a bot conversation.
pub struct SessionInitiator {
    store: Arc<dyn SessionStore>,
    platform: Arc<dyn ContactCenter>,
    greeting: String,
}

impl SessionInitiator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        platform: Arc<dyn ContactCenter>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            greeting: greeting.into(),
        }
    }

    /// Run the start sequence. Never fails; a failed step yields `failure`.
    pub async fn start(&self, event: &ContactFlowEvent) -> ContactFlowResult {
        let result = match event.contact_id() {
            Some(contact_id) => {
                info!(contact_id, "Starting request");
                match self.open_session(contact_id).await {
                    Some(()) => ContactFlowResult::success(),
                    None => ContactFlowResult::failure(),
                }
            }
            None => {
                warn!("Contact flow event has no contact id");
                ContactFlowResult::failure()
            }
        };

        info!(status = ?result.status, "Ending response");
        result
    }

    async fn open_session(&self, contact_id: &str) -> Option<()> {
        let participant = self
            .platform
            .create_participant(contact_id)
            .await
            .log_failure("CreateParticipant", contact_id)?;

        let streaming_id = self
            .platform
            .start_chat_streaming(contact_id)
            .await
            .log_failure("StartContactStreaming", contact_id)?;

        let connection_token = self
            .platform
            .create_participant_connection(&participant.participant_token)
            .await
            .log_failure("CreateParticipantConnection", contact_id)?;

        let session = ChatSession::new(contact_id, connection_token, streaming_id, Utc::now());
        self.store
            .put(&session)
            .await
            .log_failure("PutItem", contact_id)?;

        self.platform
            .send_message(&session.connection_token, &self.greeting)
            .await
            .log_failure("SendMessage", contact_id)?;

        info!(
            contact_id,
            participant_id = %participant.participant_id,
            streaming_id = %session.streaming_id,
            "Bot joined chat"
        );
        Some(())
    }
}
