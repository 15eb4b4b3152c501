//! Configuration management for Lambda functions.

use std::env;
use std::str::FromStr;

use crate::{Error, Result};

/// Default Bedrock model used by the model responder.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-v2";

/// Default keyword that ends the bot conversation.
pub const DEFAULT_QUIT_KEYWORD: &str = "quit";

/// Which backend answers customer messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderKind {
    /// Invoke a Bedrock text-generation model directly.
    Model,
    /// Delegate to the search proxy Lambda.
    Proxy,
}

impl FromStr for ResponderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "model" | "bedrock" => Ok(Self::Model),
            "proxy" | "search" => Ok(Self::Proxy),
            other => Err(Error::Config(format!("Unknown responder: {}", other))),
        }
    }
}

/// Transfer target used when the customer asks to leave the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    /// Contact flow the contact is transferred to
    pub target_flow_id: String,
    /// Queue the contact is placed in (optional)
    pub queue_id: Option<String>,
}

/// Application configuration loaded from environment variables.
///
/// Missing values are not validated here. An empty table name or instance id
/// surfaces later as a failed AWS call, which the handlers log and absorb.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding chat sessions
    pub chat_contacts_table: String,
    /// Amazon Connect instance id
    pub instance_id: String,
    /// SNS topic ARN that chat streaming publishes to
    pub chat_streaming_topic_arn: String,
    /// Responder backend
    pub responder: ResponderKind,
    /// Bedrock model id
    pub model_id: String,
    /// Search proxy Lambda name/ARN
    pub proxy_function_name: String,
    /// Keyword that ends the bot conversation (matched case-insensitively)
    pub quit_keyword: String,
    /// Contact flow that invokes the start bot
    pub contact_flow_id: Option<String>,
    /// Optional hand-off after the bot disconnects
    pub handoff: Option<Handoff>,
    /// Upstream search API URL
    pub api_url: String,
    /// Fixed `demo_name` sent to the search API
    pub search_demo_name: String,
    /// Fixed `key` sent to the search API
    pub search_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let responder = match non_empty("RESPONDER") {
            Some(value) => value.parse()?,
            None => ResponderKind::Model,
        };

        let handoff = non_empty("TARGET_FLOW_ID").map(|target_flow_id| Handoff {
            target_flow_id,
            queue_id: non_empty("QUEUE_ID"),
        });

        Ok(Self {
            chat_contacts_table: var("CHAT_CONTACTS_TABLE_NAME").unwrap_or_default(),
            instance_id: var("INSTANCE_ID").unwrap_or_default(),
            chat_streaming_topic_arn: var("CHAT_STREAMING_TOPIC_ARN").unwrap_or_default(),
            responder,
            model_id: non_empty("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            proxy_function_name: var("PROXY_FUNCTION_NAME").unwrap_or_default(),
            quit_keyword: non_empty("QUIT_KEYWORD")
                .unwrap_or_else(|| DEFAULT_QUIT_KEYWORD.to_string()),
            contact_flow_id: non_empty("CONTACT_FLOW_ID"),
            handoff,
            api_url: var("API_URL").unwrap_or_default(),
            search_demo_name: non_empty("SEARCH_DEMO_NAME")
                .unwrap_or_else(|| "sysmog".to_string()),
            search_api_key: non_empty("SEARCH_API_KEY").unwrap_or_else(|| "prakhar".to_string()),
        })
    }

    /// Greeting sent when the bot joins a chat.
    pub fn greeting(&self) -> String {
        format!(
            "I'm an automated assistant. Ask me questions or reply \"{}\" to exit.",
            self.quit_keyword
        )
    }
}
