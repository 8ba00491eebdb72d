//! In-memory transport for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::{AoError, AoTransport, OutboxMessage, ProcessResult, Tag};
use crate::wallet::Signer;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Message { action: String, data: String },
    Result { id: String },
    Dryrun { process: String, action: String, data: String },
}

/// Replays scripted replies, then a fixed fallback, recording every call
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    script: Mutex<VecDeque<Result<ProcessResult, AoError>>>,
    fallback: ProcessResult,
}

impl MockTransport {
    pub fn replying(reply: ProcessResult) -> Self {
        Self {
            fallback: reply,
            ..Default::default()
        }
    }

    /// Queue a reply served before the fallback
    pub fn then(self, reply: Result<ProcessResult, AoError>) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self) -> Result<ProcessResult, AoError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

fn action_of(tags: &[Tag]) -> String {
    tags.iter()
        .find(|t| t.name == "Action")
        .map(|t| t.value.clone())
        .unwrap_or_default()
}

impl AoTransport for MockTransport {
    async fn message(
        &self,
        _process: &str,
        tags: Vec<Tag>,
        data: String,
        _signer: &dyn Signer,
    ) -> Result<String, AoError> {
        self.calls.lock().unwrap().push(Call::Message {
            action: action_of(&tags),
            data,
        });
        Ok("msg-1".to_string())
    }

    async fn result(&self, _process: &str, message_id: &str) -> Result<ProcessResult, AoError> {
        self.calls.lock().unwrap().push(Call::Result {
            id: message_id.to_string(),
        });
        self.next()
    }

    async fn dryrun(
        &self,
        process: &str,
        tags: Vec<Tag>,
        data: String,
    ) -> Result<ProcessResult, AoError> {
        self.calls.lock().unwrap().push(Call::Dryrun {
            process: process.to_string(),
            action: action_of(&tags),
            data,
        });
        self.next()
    }
}

/// A reply whose first message carries `data`
pub fn reply_with(data: &str) -> ProcessResult {
    ProcessResult {
        messages: vec![OutboxMessage {
            data: Value::String(data.to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// A reply carrying a process error
pub fn reply_error(error: &str) -> ProcessResult {
    ProcessResult {
        error: Value::String(error.to_string()),
        ..Default::default()
    }
}
