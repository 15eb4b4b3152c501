//! Search proxy: forwards a query to the external search API.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::models::{ProxyResponse, SearchEvent};
use crate::Error;

/// Body posted to the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub demo_name: String,
    pub key: String,
}

/// Response received from the search API, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// The request went out but the exchange failed.
    #[error("search API request failed: {details}")]
    Transport {
        status: Option<u16>,
        details: Value,
    },
    /// The request could not be made at all.
    #[error("{0}")]
    Unexpected(String),
}

/// External search API.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<UpstreamReply, SearchError>;
}

/// [`SearchApi`] over HTTP.
pub struct HttpSearchApi {
    client: reqwest::Client,
    url: String,
}

impl HttpSearchApi {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Errors from `send()` never carry a response status.
fn classify(e: reqwest::Error) -> SearchError {
    if e.is_builder() {
        SearchError::Unexpected(e.to_string())
    } else {
        SearchError::Transport {
            status: None,
            details: Value::String(e.to_string()),
        }
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, request: &SearchRequest) -> Result<UpstreamReply, SearchError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| SearchError::Transport {
            status: Some(status),
            details: Value::String(e.to_string()),
        })?;

        // Non-JSON bodies are passed along as a JSON string.
        let body = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };

        Ok(UpstreamReply { status, body })
    }
}

/// Validates search events and maps the upstream result into a [`ProxyResponse`].
pub struct SearchProxy {
    api: Arc<dyn SearchApi>,
    demo_name: String,
    key: String,
}

impl SearchProxy {
    pub fn new(api: Arc<dyn SearchApi>, demo_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            api,
            demo_name: demo_name.into(),
            key: key.into(),
        }
    }

    pub async fn handle(&self, event: SearchEvent) -> ProxyResponse {
        let query = match event.query.filter(|q| !q.is_empty()) {
            Some(query) => query,
            None => {
                let err = Error::Validation("Missing query parameter".to_string());
                info!(error = %err, "Rejecting search request");
                return ProxyResponse::json(
                    err.status_code(),
                    &json!({ "message": "Missing query parameter" }),
                );
            }
        };

        let request = SearchRequest {
            query,
            demo_name: self.demo_name.clone(),
            key: self.key.clone(),
        };

        match self.api.search(&request).await {
            Ok(reply) if (200..300).contains(&reply.status) => {
                info!(status = reply.status, body = %reply.body, "API Response");
                ProxyResponse::json(reply.status, &reply.body)
            }
            Ok(reply) => {
                error!(status = reply.status, body = %reply.body, "Unexpected response from API");
                ProxyResponse::json(
                    reply.status,
                    &json!({
                        "message": "Unexpected response from API",
                        "details": reply.body,
                    }),
                )
            }
            Err(SearchError::Transport { status, details }) => {
                error!(?status, details = %details, "Error from API");
                ProxyResponse::json(
                    status.unwrap_or(500),
                    &json!({
                        "message": "Error from API",
                        "details": details,
                    }),
                )
            }
            Err(SearchError::Unexpected(message)) => {
                error!(error = %message, "Search proxy failed");
                ProxyResponse::json(
                    500,
                    &json!({
                        "message": "Internal server error",
                        "error": message,
                    }),
                )
            }
        }
    }
}
