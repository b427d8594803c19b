//! Worker units: a specialised oracle loop that posts one message per turn.
//!
//! A worker sees `[system(instruction)] ++ state.messages`, may call its tools
//! for a bounded number of rounds, and returns a single human message stamped
//! with its own id. It never touches routing or plan fields.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, ToolCall};
use crate::message::Message;
use crate::state::{RunState, RunUpdate};
use crate::team::Worker;
use crate::tool_source::ToolSource;

/// Upper bound on oracle turns that request tools before the worker gives up looping.
///
/// At the bound the worker posts the oracle's last text, or the last tool
/// observation when that text is empty.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// Content posted when the oracle's final answer is empty.
pub const NO_CONTENT: &str = "No content";

/// One worker bound to its oracle client, instruction and optional tools.
pub struct WorkerNode {
    worker: Worker,
    llm: Arc<dyn LlmClient>,
    instruction: String,
    tools: Option<Arc<dyn ToolSource>>,
    max_tool_rounds: usize,
}

impl WorkerNode {
    pub fn new(worker: Worker, llm: Arc<dyn LlmClient>, instruction: impl Into<String>) -> Self {
        Self {
            worker,
            llm,
            instruction: instruction.into(),
            tools: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Worker with its built-in instruction from [`prompt::instruction`].
    pub fn with_default_instruction(worker: Worker, llm: Arc<dyn LlmClient>) -> Self {
        Self::new(worker, llm, prompt::instruction(worker))
    }

    pub fn with_tools(self, tools: Arc<dyn ToolSource>) -> Self {
        Self {
            tools: Some(tools),
            ..self
        }
    }

    pub fn with_max_tool_rounds(self, max_tool_rounds: usize) -> Self {
        Self {
            max_tool_rounds,
            ..self
        }
    }

    pub fn worker(&self) -> Worker {
        self.worker
    }

    /// Runs one tool call and renders the observation; failures are rendered too.
    async fn observe(&self, call: &ToolCall) -> Message {
        let Some(tools) = &self.tools else {
            return Message::tool_result(format!(
                "Tool {} failed: no tools are available. Please fix your mistakes.",
                call.name
            ));
        };
        let outcome = match serde_json::from_str::<Value>(&call.arguments) {
            Ok(arguments) => tools.call_tool(&call.name, arguments).await,
            Err(e) => Err(crate::tool_source::ToolSourceError::InvalidInput(e.to_string())),
        };
        match outcome {
            Ok(content) => {
                debug!(worker = %self.worker, tool = %call.name, "tool call succeeded");
                Message::tool_result(format!("Tool {} returned: {}", call.name, content.text))
            }
            Err(e) => {
                warn!(worker = %self.worker, tool = %call.name, error = %e, "tool call failed");
                Message::tool_result(format!(
                    "Tool {} failed: {}. Please fix your mistakes.",
                    call.name, e
                ))
            }
        }
    }

    /// Oracle loop; returns the final answer text.
    async fn answer(&self, state: &RunState) -> Result<String, AgentError> {
        let mut transcript = Vec::with_capacity(state.messages.len() + 1);
        transcript.push(Message::system(self.instruction.clone()));
        transcript.extend(state.messages.iter().cloned());

        let mut rounds = 0;
        loop {
            let response = self.llm.invoke(&transcript).await?;
            if response.tool_calls.is_empty() {
                return Ok(response.content);
            }
            rounds += 1;
            if !response.content.is_empty() {
                transcript.push(Message::human(response.content.clone()).by(self.worker));
            }
            let mut last_observation = String::new();
            for call in &response.tool_calls {
                let observation = self.observe(call).await;
                last_observation = observation.content().to_string();
                transcript.push(observation);
            }
            if rounds >= self.max_tool_rounds {
                warn!(
                    worker = %self.worker,
                    rounds,
                    "tool round limit reached, stopping the tool loop"
                );
                if response.content.trim().is_empty() {
                    return Ok(last_observation);
                }
                return Ok(response.content);
            }
        }
    }
}

#[async_trait]
impl Node<RunState, RunUpdate> for WorkerNode {
    fn id(&self) -> &str {
        self.worker.as_str()
    }

    async fn run(&self, state: &RunState) -> Result<(RunUpdate, Next), AgentError> {
        let text = self.answer(state).await?;
        let content = if text.trim().is_empty() {
            NO_CONTENT.to_string()
        } else {
            text
        };
        let update = RunUpdate::message(Message::human(content).by(self.worker));
        Ok((update, Next::Continue))
    }
}
