//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` emits [`StreamEvent`]s filtered by the selected
//! [`StreamMode`]s, followed by exactly one [`StreamEvent::End`] that reports how
//! the run ended. The end event is sent regardless of mode so observers can tell
//! a normal finish from budget exhaustion or failure.
//!
//! ```rust,ignore
//! use tokio_stream::StreamExt;
//!
//! let mut events = graph.stream(state, None, [StreamMode::Updates]);
//! while let Some(event) = events.next().await {
//!     if let StreamEvent::End(outcome) = event {
//!         println!("{:?}", outcome);
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Which events a stream delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state after every node.
    Values,
    /// The update a node returned, tagged with its id.
    Updates,
    /// Payloads emitted by nodes through `RunContext::emit_custom`.
    Custom,
    /// Task start/end around every node.
    Tasks,
    /// Everything above.
    Debug,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The graph reached END after `steps` node executions.
    Completed { steps: usize },
    /// The step budget ran out before END.
    RecursionLimit { limit: usize },
    /// A node returned an error.
    Failed { error: String },
}

/// One event emitted during a streamed run.
#[derive(Debug, Clone)]
pub enum StreamEvent<S, U = S> {
    Values(S),
    Updates { node_id: String, update: U },
    TaskStart { node_id: String, step: usize },
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
    Custom(Value),
    /// Terminal event; always last.
    End(RunOutcome),
}

/// Sends events that match the enabled modes.
///
/// Cheap to clone; a writer without a sender drops everything.
#[derive(Clone)]
pub struct StreamWriter<S, U = S> {
    tx: Option<mpsc::Sender<StreamEvent<S, U>>>,
    modes: HashSet<StreamMode>,
}

impl<S, U> StreamWriter<S, U>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(tx: Option<mpsc::Sender<StreamEvent<S, U>>>, modes: HashSet<StreamMode>) -> Self {
        Self { tx, modes }
    }

    /// True when `mode` (or `Debug`) is enabled and there is somewhere to send to.
    pub fn is_enabled(&self, mode: StreamMode) -> bool {
        self.tx.is_some() && (self.modes.contains(&mode) || self.modes.contains(&StreamMode::Debug))
    }

    /// Sends `event` if its mode is enabled. Returns whether it was sent.
    pub async fn emit(&self, mode: StreamMode, event: StreamEvent<S, U>) -> bool {
        if !self.is_enabled(mode) {
            return false;
        }
        match &self.tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    pub async fn emit_custom(&self, value: Value) -> bool {
        self.emit(StreamMode::Custom, StreamEvent::Custom(value)).await
    }

    /// Sends the terminal event unconditionally.
    pub async fn emit_end(&self, outcome: RunOutcome) -> bool {
        match &self.tx {
            Some(tx) => tx.send(StreamEvent::End(outcome)).await.is_ok(),
            None => false,
        }
    }
}
