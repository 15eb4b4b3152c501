//! Shared data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a chat session record lives before the table expires it, in seconds.
pub const SESSION_TTL_SECS: i64 = 60 * 60;

/// Chat session persisted by the start bot and read by the chat bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub contact_id: String,
    pub connection_token: String,
    pub streaming_id: String,
    /// Expiry, epoch seconds
    pub ttl: i64,
}

impl ChatSession {
    /// Create a session that expires [`SESSION_TTL_SECS`] after `now`.
    pub fn new(
        contact_id: impl Into<String>,
        connection_token: impl Into<String>,
        streaming_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            connection_token: connection_token.into(),
            streaming_id: streaming_id.into(),
            ttl: now.timestamp() + SESSION_TTL_SECS,
        }
    }
}

/// Amazon Connect contact flow invocation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlowEvent {
    #[serde(default)]
    pub details: ContactFlowDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlowDetails {
    #[serde(default)]
    pub contact_data: Option<ContactData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactData {
    pub contact_id: Option<String>,
}

impl ContactFlowEvent {
    /// Contact id of the chat that triggered the flow.
    pub fn contact_id(&self) -> Option<&str> {
        self.details
            .contact_data
            .as_ref()
            .and_then(|data| data.contact_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Status returned to the contact flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Success,
    Failure,
}

/// Contact flow Lambda result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFlowResult {
    pub status: FlowStatus,
}

impl ContactFlowResult {
    pub fn success() -> Self {
        Self {
            status: FlowStatus::Success,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: FlowStatus::Failure,
        }
    }
}

/// SNS Event wrapper
#[derive(Debug, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SnsRecord {
    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

#[derive(Debug, Deserialize)]
pub struct SnsMessage {
    #[serde(rename = "MessageId", default)]
    pub message_id: Option<String>,
    #[serde(rename = "Message")]
    pub message: String,
}

/// Chat streaming message published to SNS by Amazon Connect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatMessageEvent {
    pub contact_id: Option<String>,
    pub content: Option<String>,
    pub participant_role: Option<String>,
    #[serde(rename = "Type")]
    pub message_type: Option<String>,
}

/// Search proxy invocation payload.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Search proxy response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
}

impl ProxyResponse {
    /// Create a response whose body is `data` encoded as JSON.
    pub fn json(status_code: u16, data: &serde_json::Value) -> Self {
        Self {
            status_code,
            body: data.to_string(),
        }
    }
}
