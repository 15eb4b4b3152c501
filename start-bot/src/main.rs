//! Start Bot Lambda - Joins a new Amazon Connect chat as a custom bot.
//!
//! Invoked from the contact flow when a chat contact arrives. Creates the bot
//! participant, starts chat streaming to SNS, stores the connection token in
//! DynamoDB and greets the customer. Always answers the flow with a status.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{
    Config, ConnectPlatform, ContactFlowEvent, ContactFlowResult, DynamoSessionStore,
    SessionInitiator,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    initiator: SessionInitiator,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let store = DynamoSessionStore::new(
            aws_sdk_dynamodb::Client::new(&sdk_config),
            config.chat_contacts_table.clone(),
        );
        let platform = ConnectPlatform::new(
            aws_sdk_connect::Client::new(&sdk_config),
            aws_sdk_connectparticipant::Client::new(&sdk_config),
            config.instance_id.clone(),
            config.chat_streaming_topic_arn.clone(),
        );

        info!(
            instance_id = %config.instance_id,
            contact_flow_id = ?config.contact_flow_id,
            table = %config.chat_contacts_table,
            "Start bot initialized"
        );

        Ok(Self {
            initiator: SessionInitiator::new(
                Arc::new(store),
                Arc::new(platform),
                config.greeting(),
            ),
        })
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ContactFlowEvent>,
) -> Result<ContactFlowResult, Error> {
    Ok(state.initiator.start(&event.payload).await)
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
