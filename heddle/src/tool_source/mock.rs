//! Mock tool source for tests: fixed tool list, fixed result or fixed failure.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Returns the same text for every call (or fails every call) and records the calls.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    result: Result<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new(tools: Vec<ToolSpec>, result: String) -> Self {
        Self {
            tools,
            result: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One pipeline-simulation tool that answers with an empty `docs` array.
    pub fn simulate_example() -> Self {
        Self::new(
            vec![ToolSpec {
                name: super::TOOL_SIMULATE_PIPELINE.to_string(),
                description: Some("Simulate an ingest pipeline.".to_string()),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            "{\"docs\":[]}".to_string(),
        )
    }

    pub fn with_call_result(self, result: String) -> Self {
        Self {
            result: Ok(result),
            ..self
        }
    }

    /// Every call fails with `ToolSourceError::Transport(message)`.
    pub fn with_call_error(self, message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            ..self
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        match &self.result {
            Ok(text) => Ok(ToolCallContent { text: text.clone() }),
            Err(message) => Err(ToolSourceError::Transport(message.clone())),
        }
    }
}
