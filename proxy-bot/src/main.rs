//! Proxy Bot Lambda - Forwards search queries to the external search API.
//!
//! Invoked directly (by the chat bot's delegated responder) with `{"query": ...}`
//! and answers with `{"statusCode": ..., "body": "<json>"}`.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{Config, HttpSearchApi, ProxyResponse, SearchEvent, SearchProxy};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    proxy: SearchProxy,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let api = HttpSearchApi::new(reqwest::Client::new(), config.api_url.clone());

        info!(api_url = %config.api_url, "Proxy bot initialized");

        Ok(Self {
            proxy: SearchProxy::new(
                Arc::new(api),
                config.search_demo_name.clone(),
                config.search_api_key.clone(),
            ),
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<SearchEvent>) -> Result<ProxyResponse, Error> {
    Ok(state.proxy.handle(event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new()?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
