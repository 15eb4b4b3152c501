//! In-memory fakes of the trait seams, for handler tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::connect::{ContactCenter, ParticipantCredentials};
use crate::models::ChatSession;
use crate::responder::Responder;
use crate::store::SessionStore;
use crate::{Error, Result};

#[derive(Default)]
pub struct FakeStore {
    pub sessions: Mutex<HashMap<String, ChatSession>>,
    pub lookups: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<ChatSession>>,
    pub fail_get: bool,
    pub fail_put: bool,
}

impl FakeStore {
    pub fn with_session(session: ChatSession) -> Self {
        let store = Self::default();
        store
            .sessions
            .lock()
            .unwrap()
            .insert(session.contact_id.clone(), session);
        store
    }
}

#[async_trait]
impl SessionStore for FakeStore {
    async fn get(&self, contact_id: &str) -> Result<Option<ChatSession>> {
        self.lookups.lock().unwrap().push(contact_id.to_string());
        if self.fail_get {
            return Err(Error::Aws("ProvisionedThroughputExceededException".to_string()));
        }
        Ok(self.sessions.lock().unwrap().get(contact_id).cloned())
    }

    async fn put(&self, session: &ChatSession) -> Result<()> {
        self.writes.lock().unwrap().push(session.clone());
        if self.fail_put {
            return Err(Error::Aws("AccessDeniedException".to_string()));
        }
        self.sessions
            .lock()
            .unwrap()
            .insert(session.contact_id.clone(), session.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateParticipant(String),
    StartStreaming(String),
    StopStreaming { contact_id: String, streaming_id: String },
    Transfer { contact_id: String, flow_id: String, queue_id: Option<String> },
    CreateConnection(String),
    SendMessage { connection_token: String, content: String },
    SendTyping(String),
    Disconnect(String),
}

/// Records every call; operations named in `failing` return an error.
#[derive(Default)]
pub struct FakePlatform {
    pub calls: Mutex<Vec<Call>>,
    pub failing: HashSet<&'static str>,
}

impl FakePlatform {
    pub fn failing(operations: &[&'static str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: operations.iter().copied().collect(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(operation) {
            return Err(Error::Aws(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactCenter for FakePlatform {
    async fn create_participant(&self, contact_id: &str) -> Result<ParticipantCredentials> {
        self.record("CreateParticipant", Call::CreateParticipant(contact_id.to_string()))?;
        Ok(ParticipantCredentials {
            participant_id: format!("participant-{}", contact_id),
            participant_token: format!("participant-token-{}", contact_id),
        })
    }

    async fn start_chat_streaming(&self, contact_id: &str) -> Result<String> {
        self.record("StartContactStreaming", Call::StartStreaming(contact_id.to_string()))?;
        Ok(format!("streaming-{}", contact_id))
    }

    async fn stop_chat_streaming(&self, contact_id: &str, streaming_id: &str) -> Result<()> {
        self.record(
            "StopContactStreaming",
            Call::StopStreaming {
                contact_id: contact_id.to_string(),
                streaming_id: streaming_id.to_string(),
            },
        )
    }

    async fn transfer_contact(
        &self,
        contact_id: &str,
        contact_flow_id: &str,
        queue_id: Option<&str>,
    ) -> Result<()> {
        self.record(
            "TransferContact",
            Call::Transfer {
                contact_id: contact_id.to_string(),
                flow_id: contact_flow_id.to_string(),
                queue_id: queue_id.map(String::from),
            },
        )
    }

    async fn create_participant_connection(&self, participant_token: &str) -> Result<String> {
        self.record(
            "CreateParticipantConnection",
            Call::CreateConnection(participant_token.to_string()),
        )?;
        Ok(format!("connection-for-{}", participant_token))
    }

    async fn send_message(&self, connection_token: &str, content: &str) -> Result<Option<String>> {
        self.record(
            "SendMessage",
            Call::SendMessage {
                connection_token: connection_token.to_string(),
                content: content.to_string(),
            },
        )?;
        Ok(Some("message-id".to_string()))
    }

    async fn send_typing(&self, connection_token: &str) -> Result<()> {
        self.record("SendEvent", Call::SendTyping(connection_token.to_string()))
    }

    async fn disconnect_participant(&self, connection_token: &str) -> Result<()> {
        self.record("DisconnectParticipant", Call::Disconnect(connection_token.to_string()))
    }
}

/// Answers every question with the same text and counts the questions.
#[derive(Default)]
pub struct FixedResponder {
    pub answer: Option<String>,
    pub questions: Mutex<Vec<String>>,
}

impl FixedResponder {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Responder for FixedResponder {
    async fn respond(&self, question: &str) -> Option<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer.clone()
    }
}
