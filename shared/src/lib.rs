//! Shared library for the Connect custom bot Lambda functions.
//!
//! This crate holds the handler logic, the AWS-backed implementations of its
//! trait seams, and the types exchanged with Amazon Connect, SNS and the
//! search proxy. The Lambda binaries only wire clients together.

pub mod config;
pub mod connect;
pub mod error;
pub mod initiator;
pub mod models;
pub mod relay;
pub mod responder;
pub mod search;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, Handoff, ResponderKind};
pub use connect::{ConnectPlatform, ContactCenter, ParticipantCredentials};
pub use error::{Error, LogFailure, Result};
pub use initiator::SessionInitiator;
pub use models::{
    ChatMessageEvent, ChatSession, ContactFlowEvent, ContactFlowResult, FlowStatus, ProxyResponse,
    SearchEvent, SnsEvent,
};
pub use relay::{MessageRelay, RelayResponse};
pub use responder::{DelegatedResponder, ModelResponder, Responder};
pub use search::{HttpSearchApi, SearchApi, SearchProxy};
pub use store::{DynamoSessionStore, SessionStore};
