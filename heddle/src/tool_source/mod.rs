//! Tool source abstraction: list tools and call a tool.
//!
//! Worker units depend on `ToolSource` rather than concrete tools. Implementations:
//! [`MockToolSource`] (tests) and [`ElasticsearchTool`] (ingest pipeline simulation,
//! bound to the validator).
//!
//! A failing call returns `ToolSourceError`; the worker loop turns it into a
//! tool-result message instead of aborting the run.

mod elasticsearch;
mod mock;

pub use elasticsearch::{ElasticsearchTool, DEFAULT_ELASTICSEARCH_URL, TOOL_SIMULATE_PIPELINE};
pub use mock::MockToolSource;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool definition: name, description for the oracle, JSON Schema for arguments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result text of a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// List tools and call one by name with JSON arguments.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant contains expected keywords.
    #[test]
    fn tool_source_error_display_all_variants() {
        let s = ToolSourceError::NotFound("x".into()).to_string();
        assert!(s.contains("not found"), "{}", s);
        let s = ToolSourceError::InvalidInput("bad".into()).to_string();
        assert!(s.contains("invalid"), "{}", s);
        let s = ToolSourceError::Transport("net".into()).to_string();
        assert!(s.contains("transport") && s.contains("net"), "{}", s);
    }
}
