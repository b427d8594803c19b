//! Scripted LLM for tests.
//!
//! Replies with queued responses in order; once the script is exhausted the
//! last response repeats. Every call's messages are recorded for assertions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Mock oracle with a fixed script of responses.
pub struct MockLlm {
    script: Vec<Result<LlmResponse, String>>,
    call_count: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    pub fn new(script: Vec<LlmResponse>) -> Self {
        Self {
            script: script.into_iter().map(Ok).collect(),
            call_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `content` and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::new(vec![LlmResponse::text(content)])
    }

    /// Always answers with one tool call.
    pub fn with_tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::new(vec![LlmResponse::tool_call(name, arguments)])
    }

    /// Every call fails as if the transport were down.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: vec![Err(message.into())],
            call_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Appends a response to the script (builder).
    pub fn then(mut self, response: LlmResponse) -> Self {
        self.script.push(Ok(response));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The messages passed to each call, oldest first.
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Ok(LlmResponse::default()));
        entry.map_err(AgentError::ExecutionFailed)
    }
}
