//! Amazon Connect and Connect Participant Service calls.

use async_trait::async_trait;
use aws_sdk_connect::types::{ChatStreamingConfiguration, ParticipantDetailsToAdd, ParticipantRole};
use aws_sdk_connect::Client as ConnectClient;
use aws_sdk_connectparticipant::types::ConnectionType;
use aws_sdk_connectparticipant::Client as ParticipantClient;

use crate::{Error, Result};

/// Display name of the bot participant in the chat.
pub const BOT_DISPLAY_NAME: &str = "Chat Bot";

/// Content type of plain chat messages.
pub const TEXT_PLAIN: &str = "text/plain";

/// Content type of the typing indicator event.
pub const TYPING_EVENT: &str = "application/vnd.amazonaws.connect.event.typing";

/// Credentials of a newly created bot participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantCredentials {
    pub participant_id: String,
    pub participant_token: String,
}

/// The subset of the contact-center platform the bot talks to.
///
/// Contact-scoped calls go to the Connect API; connection-token calls go to
/// the Connect Participant Service on behalf of the bot participant.
#[async_trait]
pub trait ContactCenter: Send + Sync {
    /// Add a custom bot participant to the contact.
    async fn create_participant(&self, contact_id: &str) -> Result<ParticipantCredentials>;

    /// Stream the contact's chat messages to the configured topic.
    async fn start_chat_streaming(&self, contact_id: &str) -> Result<String>;

    async fn stop_chat_streaming(&self, contact_id: &str, streaming_id: &str) -> Result<()>;

    /// Move the contact to another contact flow, optionally into a queue.
    async fn transfer_contact(
        &self,
        contact_id: &str,
        contact_flow_id: &str,
        queue_id: Option<&str>,
    ) -> Result<()>;

    /// Exchange a participant token for a connection token.
    async fn create_participant_connection(&self, participant_token: &str) -> Result<String>;

    /// Send a message into the chat, returning its id when the service reports one.
    async fn send_message(&self, connection_token: &str, content: &str) -> Result<Option<String>>;

    async fn send_typing(&self, connection_token: &str) -> Result<()>;

    async fn disconnect_participant(&self, connection_token: &str) -> Result<()>;
}

/// [`ContactCenter`] backed by the AWS SDK.
pub struct ConnectPlatform {
    connect: ConnectClient,
    participant: ParticipantClient,
    instance_id: String,
    streaming_endpoint_arn: String,
}

impl ConnectPlatform {
    pub fn new(
        connect: ConnectClient,
        participant: ParticipantClient,
        instance_id: impl Into<String>,
        streaming_endpoint_arn: impl Into<String>,
    ) -> Self {
        Self {
            connect,
            participant,
            instance_id: instance_id.into(),
            streaming_endpoint_arn: streaming_endpoint_arn.into(),
        }
    }
}

#[async_trait]
impl ContactCenter for ConnectPlatform {
    async fn create_participant(&self, contact_id: &str) -> Result<ParticipantCredentials> {
        let details = ParticipantDetailsToAdd::builder()
            .participant_role(ParticipantRole::CustomBot)
            .display_name(BOT_DISPLAY_NAME)
            .build();

        let response = self
            .connect
            .create_participant()
            .instance_id(&self.instance_id)
            .contact_id(contact_id)
            .participant_details(details)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to create participant: {}", e)))?;

        let participant_id = response
            .participant_id()
            .ok_or_else(|| Error::Aws("No participant id in response".to_string()))?;
        let participant_token = response
            .participant_credentials()
            .and_then(|credentials| credentials.participant_token())
            .ok_or_else(|| Error::Aws("No participant token in response".to_string()))?;

        Ok(ParticipantCredentials {
            participant_id: participant_id.to_string(),
            participant_token: participant_token.to_string(),
        })
    }

    async fn start_chat_streaming(&self, contact_id: &str) -> Result<String> {
        let streaming_config = ChatStreamingConfiguration::builder()
            .streaming_endpoint_arn(&self.streaming_endpoint_arn)
            .build()
            .map_err(|e| Error::Aws(format!("Invalid streaming configuration: {}", e)))?;

        let response = self
            .connect
            .start_contact_streaming()
            .instance_id(&self.instance_id)
            .contact_id(contact_id)
            .chat_streaming_configuration(streaming_config)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to start chat streaming: {}", e)))?;

        Ok(response.streaming_id().to_string())
    }

    async fn stop_chat_streaming(&self, contact_id: &str, streaming_id: &str) -> Result<()> {
        self.connect
            .stop_contact_streaming()
            .instance_id(&self.instance_id)
            .contact_id(contact_id)
            .streaming_id(streaming_id)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to stop chat streaming: {}", e)))?;

        Ok(())
    }

    async fn transfer_contact(
        &self,
        contact_id: &str,
        contact_flow_id: &str,
        queue_id: Option<&str>,
    ) -> Result<()> {
        self.connect
            .transfer_contact()
            .instance_id(&self.instance_id)
            .contact_id(contact_id)
            .contact_flow_id(contact_flow_id)
            .set_queue_id(queue_id.map(String::from))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to transfer contact: {}", e)))?;

        Ok(())
    }

    async fn create_participant_connection(&self, participant_token: &str) -> Result<String> {
        let response = self
            .participant
            .create_participant_connection()
            .r#type(ConnectionType::ConnectionCredentials)
            .connect_participant(true)
            .participant_token(participant_token)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to create participant connection: {}", e)))?;

        response
            .connection_credentials()
            .and_then(|credentials| credentials.connection_token())
            .map(String::from)
            .ok_or_else(|| Error::Aws("No connection token in response".to_string()))
    }

    async fn send_message(&self, connection_token: &str, content: &str) -> Result<Option<String>> {
        let response = self
            .participant
            .send_message()
            .content_type(TEXT_PLAIN)
            .content(content)
            .connection_token(connection_token)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to send message: {}", e)))?;

        Ok(response.id().map(String::from))
    }

    async fn send_typing(&self, connection_token: &str) -> Result<()> {
        self.participant
            .send_event()
            .content_type(TYPING_EVENT)
            .connection_token(connection_token)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to send event: {}", e)))?;

        Ok(())
    }

    async fn disconnect_participant(&self, connection_token: &str) -> Result<()> {
        self.participant
            .disconnect_participant()
            .connection_token(connection_token)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to disconnect participant: {}", e)))?;

        Ok(())
    }
}
