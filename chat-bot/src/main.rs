//! Chat Bot Lambda - Answers customer chat messages.
//!
//! Subscribed to the chat streaming SNS topic (customer messages only). For each
//! message it looks up the bot session, then either leaves the chat on the quit
//! keyword or asks the configured responder and posts the answer.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{
    responder, Config, ConnectPlatform, DynamoSessionStore, MessageRelay, RelayResponse, SnsEvent,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    relay: MessageRelay,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let store = DynamoSessionStore::new(
            aws_sdk_dynamodb::Client::new(&sdk_config),
            config.chat_contacts_table.clone(),
        );
        // Chat bot never starts streaming, so no endpoint is needed.
        let platform = ConnectPlatform::new(
            aws_sdk_connect::Client::new(&sdk_config),
            aws_sdk_connectparticipant::Client::new(&sdk_config),
            config.instance_id.clone(),
            String::new(),
        );

        info!(
            responder = ?config.responder,
            quit_keyword = %config.quit_keyword,
            handoff = ?config.handoff,
            "Chat bot initialized"
        );

        let relay = MessageRelay::new(
            Arc::new(store),
            Arc::new(platform),
            responder::from_config(&config, &sdk_config),
            config.quit_keyword.clone(),
        )
        .with_handoff(config.handoff.clone());

        Ok(Self { relay })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<SnsEvent>) -> Result<RelayResponse, Error> {
    info!(records = event.payload.records.len(), "Processing chat streaming event");
    Ok(state.relay.relay(event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
