//! Graph node trait: one unit of work in a `StateGraph`.
//!
//! A node reads the state through a shared reference and returns an update plus
//! a [`Next`]. It never mutates the state; the compiled graph merges the update.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AgentError;

use super::{Next, RunContext};

/// One step in a graph: state view in, (update out, next step).
///
/// `U` defaults to `S` for graphs whose nodes return full states.
#[async_trait]
pub trait Node<S, U = S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"supervisor"`). Unique within a graph.
    fn id(&self) -> &str;

    async fn run(&self, state: &S) -> Result<(U, Next), AgentError>;

    /// Variant with run context (config, streaming). Defaults to `run`.
    async fn run_with_context(
        &self,
        state: &S,
        _ctx: &RunContext<S, U>,
    ) -> Result<(U, Next), AgentError> {
        self.run(state).await
    }
}
