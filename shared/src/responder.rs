//! Backends that answer customer questions.
//!
//! Two implementations share the [`Responder`] trait: [`ModelResponder`] calls a
//! Bedrock text model directly, [`DelegatedResponder`] invokes the search proxy
//! Lambda and reads the `summary` it returns. Which one a deployment uses is
//! chosen by [`ResponderKind`](crate::config::ResponderKind).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::{Config, ResponderKind};
use crate::models::{ProxyResponse, SearchEvent};
use crate::{Error, Result};

/// Maximum tokens the model may generate.
pub const MAX_TOKENS_TO_SAMPLE: u32 = 300;

/// Answers a free-text question.
///
/// Failures are logged by the implementation and reported as `None`.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, question: &str) -> Option<String>;
}

/// Synchronous model invocation with JSON in and out.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// Synchronous Lambda invocation with JSON in and out.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke_function(&self, function_name: &str, payload: Vec<u8>) -> Result<Vec<u8>>;
}

#[async_trait]
impl ModelInvoker for aws_sdk_bedrockruntime::Client {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response = aws_sdk_bedrockruntime::Client::invoke_model(self)
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(aws_sdk_bedrockruntime::primitives::Blob::new(body))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to invoke model: {}", e)))?;

        Ok(response.body.into_inner())
    }
}

#[async_trait]
impl FunctionInvoker for aws_sdk_lambda::Client {
    async fn invoke_function(&self, function_name: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
        let response = self
            .invoke()
            .function_name(function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(payload))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to invoke function: {}", e)))?;

        if let Some(function_error) = response.function_error() {
            return Err(Error::Upstream(format!(
                "Function {} failed: {}",
                function_name, function_error
            )));
        }

        let payload = response
            .payload()
            .ok_or_else(|| Error::Aws("No response payload from function".to_string()))?;

        Ok(payload.as_ref().to_vec())
    }
}

/// Request body for Anthropic text-completion models on Bedrock.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    prompt: String,
    max_tokens_to_sample: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    completion: Option<String>,
}

/// Build the fixed prompt around a customer question.
pub fn build_prompt(question: &str) -> String {
    format!(
        "\n\nHuman: {} Also provide a very concise answer in less than 500 characters.\n\nAssistant:",
        question
    )
}

/// Responder that asks a Bedrock text model.
pub struct ModelResponder<M> {
    model: M,
    model_id: String,
}

impl<M: ModelInvoker> ModelResponder<M> {
    pub fn new(model: M, model_id: impl Into<String>) -> Self {
        Self {
            model,
            model_id: model_id.into(),
        }
    }

    async fn complete(&self, question: &str) -> Result<String> {
        let request = CompletionRequest {
            prompt: build_prompt(question),
            max_tokens_to_sample: MAX_TOKENS_TO_SAMPLE,
        };
        let body = serde_json::to_vec(&request)?;

        let raw = self.model.invoke_model(&self.model_id, body).await?;
        let text = String::from_utf8(raw)
            .map_err(|e| Error::Internal(format!("Model response is not UTF-8: {}", e)))?;
        let parsed: CompletionResponse = serde_json::from_str(&text)?;

        parsed
            .completion
            .ok_or_else(|| Error::NotFound("completion in model response".to_string()))
    }
}

#[async_trait]
impl<M: ModelInvoker> Responder for ModelResponder<M> {
    async fn respond(&self, question: &str) -> Option<String> {
        match self.complete(question).await {
            Ok(completion) => {
                debug!(command = "InvokeModel", model_id = %self.model_id, "Model answered");
                Some(completion)
            }
            Err(e) => {
                error!(command = "InvokeModel", model_id = %self.model_id, error = %e, "Invoking model failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchSummary {
    summary: Option<String>,
}

/// Responder that delegates to the search proxy Lambda.
pub struct DelegatedResponder<F> {
    functions: F,
    function_name: String,
}

impl<F: FunctionInvoker> DelegatedResponder<F> {
    pub fn new(functions: F, function_name: impl Into<String>) -> Self {
        Self {
            functions,
            function_name: function_name.into(),
        }
    }

    async fn search(&self, question: &str) -> Result<String> {
        let payload = serde_json::to_vec(&SearchEvent {
            query: Some(question.to_string()),
        })?;

        let raw = self
            .functions
            .invoke_function(&self.function_name, payload)
            .await?;

        let envelope: ProxyResponse = serde_json::from_slice(&raw)?;
        let body: SearchSummary = serde_json::from_str(&envelope.body)?;

        body.summary.ok_or_else(|| {
            Error::NotFound(format!(
                "summary in proxy response (status {})",
                envelope.status_code
            ))
        })
    }
}

#[async_trait]
impl<F: FunctionInvoker> Responder for DelegatedResponder<F> {
    async fn respond(&self, question: &str) -> Option<String> {
        match self.search(question).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(command = "Invoke", function_name = %self.function_name, error = %e, "Invoking search proxy failed");
                None
            }
        }
    }
}

/// Build the responder selected by configuration.
pub fn from_config(config: &Config, sdk_config: &aws_config::SdkConfig) -> Arc<dyn Responder> {
    match config.responder {
        ResponderKind::Model => Arc::new(ModelResponder::new(
            aws_sdk_bedrockruntime::Client::new(sdk_config),
            config.model_id.clone(),
        )),
        ResponderKind::Proxy => Arc::new(DelegatedResponder::new(
            aws_sdk_lambda::Client::new(sdk_config),
            config.proxy_function_name.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers with the length of the prompt it was given.
    #[derive(Default)]
    struct EchoModel {
        requests: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl ModelInvoker for EchoModel {
        async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
            let request: serde_json::Value = serde_json::from_slice(&body)?;
            let prompt = request["prompt"].as_str().unwrap_or_default().to_string();
            self.requests
                .lock()
                .unwrap()
                .push((model_id.to_string(), request));
            Ok(serde_json::to_vec(&serde_json::json!({ "completion": prompt.len().to_string() }))?)
        }
    }

    struct RawModel(&'static [u8]);

    #[async_trait]
    impl ModelInvoker for RawModel {
        async fn invoke_model(&self, _model_id: &str, _body: Vec<u8>) -> Result<Vec<u8>> {
            Ok(self.0.to_vec())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ModelInvoker for FailingModel {
        async fn invoke_model(&self, _model_id: &str, _body: Vec<u8>) -> Result<Vec<u8>> {
            Err(Error::Aws("ThrottlingException".to_string()))
        }
    }

    struct ProxyFunction {
        payload: Vec<u8>,
        seen: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl ProxyFunction {
        fn returning(payload: serde_json::Value) -> Self {
            Self {
                payload: serde_json::to_vec(&payload).unwrap(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FunctionInvoker for ProxyFunction {
        async fn invoke_function(&self, function_name: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
            self.seen
                .lock()
                .unwrap()
                .push((function_name.to_string(), serde_json::from_slice(&payload)?));
            Ok(self.payload.clone())
        }
    }

    #[test]
    fn test_prompt_template() {
        assert_eq!(
            build_prompt("What are your hours?"),
            "\n\nHuman: What are your hours? Also provide a very concise answer in less than 500 characters.\n\nAssistant:"
        );
    }

    #[tokio::test]
    async fn test_model_request_shape() {
        let responder = ModelResponder::new(EchoModel::default(), "anthropic.claude-v2");
        assert!(responder.respond("hi").await.is_some());

        let requests = responder.model.requests.lock().unwrap();
        let (model_id, body) = &requests[0];
        assert_eq!(model_id, "anthropic.claude-v2");
        assert_eq!(body["max_tokens_to_sample"], 300);
        assert_eq!(body["prompt"], build_prompt("hi").as_str());
    }

    #[tokio::test]
    async fn test_model_responder_is_stateless() {
        let responder = ModelResponder::new(EchoModel::default(), "anthropic.claude-v2");
        let first = responder.respond("Where is my order?").await;
        let second = responder.respond("Where is my order?").await;
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_model_failures_yield_nothing() {
        let failing = ModelResponder::new(FailingModel, "m");
        assert_eq!(failing.respond("q").await, None);

        let not_json = ModelResponder::new(RawModel(b"<html>"), "m");
        assert_eq!(not_json.respond("q").await, None);

        let not_utf8 = ModelResponder::new(RawModel(&[0xff, 0xfe]), "m");
        assert_eq!(not_utf8.respond("q").await, None);

        let no_completion = ModelResponder::new(RawModel(br#"{"stop_reason":"max_tokens"}"#), "m");
        assert_eq!(no_completion.respond("q").await, None);
    }

    #[tokio::test]
    async fn test_delegated_responder_reads_nested_summary() {
        let function = ProxyFunction::returning(serde_json::json!({
            "statusCode": 200,
            "body": r#"{"summary":"Open 9 to 5","sources":[]}"#,
        }));
        let responder = DelegatedResponder::new(function, "proxy-bot");

        assert_eq!(
            responder.respond("hours?").await.as_deref(),
            Some("Open 9 to 5")
        );

        let seen = responder.functions.seen.lock().unwrap();
        assert_eq!(seen[0].0, "proxy-bot");
        assert_eq!(seen[0].1, serde_json::json!({"query": "hours?"}));
    }

    #[tokio::test]
    async fn test_delegated_responder_without_summary() {
        let function = ProxyFunction::returning(serde_json::json!({
            "statusCode": 400,
            "body": r#"{"message":"Missing query parameter"}"#,
        }));
        let responder = DelegatedResponder::new(function, "proxy-bot");
        assert_eq!(responder.respond("hours?").await, None);
    }

    #[tokio::test]
    async fn test_delegated_responder_with_malformed_envelope() {
        let function = ProxyFunction::returning(serde_json::json!({"errorMessage": "boom"}));
        let responder = DelegatedResponder::new(function, "proxy-bot");
        assert_eq!(responder.respond("hours?").await, None);
    }
}
