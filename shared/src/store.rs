//! Chat session persistence in DynamoDB.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use crate::models::ChatSession;
use crate::{Error, Result};

const CONTACT_ID: &str = "contactId";
const CONNECTION_TOKEN: &str = "connectionToken";
const STREAMING_ID: &str = "streamingId";
const TTL: &str = "ttl";

/// Key-value store of chat sessions keyed by contact id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for a contact, if one was stored.
    async fn get(&self, contact_id: &str) -> Result<Option<ChatSession>>;

    /// Store a session, replacing any previous record for the contact.
    async fn put(&self, session: &ChatSession) -> Result<()>;
}

/// [`SessionStore`] backed by a DynamoDB table with a `ttl` attribute.
pub struct DynamoSessionStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoSessionStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl SessionStore for DynamoSessionStore {
    async fn get(&self, contact_id: &str) -> Result<Option<ChatSession>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(CONTACT_ID, AttributeValue::S(contact_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to get chat contact: {}", e)))?;

        response.item().map(session_from_item).transpose()
    }

    async fn put(&self, session: &ChatSession) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(session_to_item(session)))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to save chat contact: {}", e)))?;

        Ok(())
    }
}

fn session_to_item(session: &ChatSession) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            CONTACT_ID.to_string(),
            AttributeValue::S(session.contact_id.clone()),
        ),
        (
            CONNECTION_TOKEN.to_string(),
            AttributeValue::S(session.connection_token.clone()),
        ),
        (
            STREAMING_ID.to_string(),
            AttributeValue::S(session.streaming_id.clone()),
        ),
        (TTL.to_string(), AttributeValue::N(session.ttl.to_string())),
    ])
}

/// Decode a stored item. A record without a connection token is unusable and
/// is reported as an error rather than a half-filled session.
fn session_from_item(item: &HashMap<String, AttributeValue>) -> Result<ChatSession> {
    let string_attr = |name: &str| -> Option<String> {
        item.get(name)
            .and_then(|value| value.as_s().ok())
            .filter(|value| !value.is_empty())
            .cloned()
    };

    let contact_id = string_attr(CONTACT_ID)
        .ok_or_else(|| Error::NotFound(format!("{} attribute", CONTACT_ID)))?;
    let connection_token = string_attr(CONNECTION_TOKEN)
        .ok_or_else(|| Error::NotFound(format!("{} for contact {}", CONNECTION_TOKEN, contact_id)))?;

    let ttl = item
        .get(TTL)
        .and_then(|value| value.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .unwrap_or_default();

    Ok(ChatSession {
        contact_id,
        connection_token,
        streaming_id: string_attr(STREAMING_ID).unwrap_or_default(),
        ttl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ChatSession {
        ChatSession {
            contact_id: "contact-1".to_string(),
            connection_token: "conn-token".to_string(),
            streaming_id: "stream-1".to_string(),
            ttl: 1_700_003_600,
        }
    }

    #[test]
    fn test_item_layout() {
        let item = session_to_item(&session());
        assert_eq!(item.len(), 4);
        assert_eq!(item[TTL], AttributeValue::N("1700003600".to_string()));
        assert_eq!(item[CONTACT_ID], AttributeValue::S("contact-1".to_string()));
    }

    #[test]
    fn test_item_decodes_back() {
        let decoded = session_from_item(&session_to_item(&session())).unwrap();
        assert_eq!(decoded, session());
    }

    #[test]
    fn test_item_without_token_is_rejected() {
        let mut item = session_to_item(&session());
        item.remove(CONNECTION_TOKEN);
        let err = session_from_item(&item).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
