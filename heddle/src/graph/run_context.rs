//! Run config and the context handed to nodes.

use std::collections::HashSet;
use std::fmt::Debug;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::stream::{StreamEvent, StreamMode, StreamWriter};

/// Default step budget for one run.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Per-run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Maximum number of node executions before the run is cut off.
    pub recursion_limit: usize,
    /// Optional id attached to log lines for this run.
    pub run_id: Option<String>,
}

impl Default for RunnableConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            run_id: None,
        }
    }
}

impl RunnableConfig {
    pub fn with_recursion_limit(self, recursion_limit: usize) -> Self {
        Self {
            recursion_limit,
            ..self
        }
    }

    pub fn with_run_id(self, run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            ..self
        }
    }
}

/// Context passed into `Node::run_with_context`.
#[derive(Clone)]
pub struct RunContext<S, U = S>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    pub config: RunnableConfig,
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S, U>>>,
    pub stream_mode: HashSet<StreamMode>,
}

impl<S, U> RunContext<S, U>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(config: RunnableConfig) -> Self {
        Self {
            config,
            stream_tx: None,
            stream_mode: HashSet::new(),
        }
    }

    pub fn stream_writer(&self) -> StreamWriter<S, U> {
        StreamWriter::new(self.stream_tx.clone(), self.stream_mode.clone())
    }

    /// Emits a custom payload when `StreamMode::Custom` is enabled. Returns whether it was sent.
    pub async fn emit_custom(&self, value: Value) -> bool {
        self.stream_writer().emit_custom(value).await
    }

    pub fn is_streaming_mode(&self, mode: StreamMode) -> bool {
        self.stream_mode.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_one_hundred() {
        let cfg = RunnableConfig::default();
        assert_eq!(cfg.recursion_limit, 100);
        assert_eq!(cfg.with_recursion_limit(5).recursion_limit, 5);
    }

    /// **Scenario**: A context without a stream sender reports custom events as not sent.
    #[tokio::test]
    async fn emit_custom_without_stream_is_noop() {
        let ctx = RunContext::<i32>::new(RunnableConfig::default());
        assert!(!ctx.emit_custom(serde_json::json!({"k": 1})).await);
        assert!(!ctx.is_streaming_mode(StreamMode::Custom));
    }
}
