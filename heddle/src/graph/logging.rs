//! Structured logging for graph execution.

use std::fmt::Debug;

use crate::error::AgentError;

use super::Next;

pub fn log_node_start(node_id: &str, step: usize) {
    tracing::debug!(node_id = node_id, step = step, "Starting node execution");
}

/// Logs the input state of a node at trace level (states carry the whole history).
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

pub fn log_state_update<U: Debug>(node_id: &str, update: &U) {
    tracing::debug!(node_id = node_id, update = ?update, "State updated");
}

pub fn log_graph_start(run_id: Option<&str>, recursion_limit: usize) {
    tracing::info!(run_id = ?run_id, recursion_limit, "Starting graph execution");
}

pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps, "Graph execution complete");
}

pub fn log_graph_error(error: &AgentError) {
    tracing::error!(?error, "Graph execution error");
}

pub fn log_recursion_limit(limit: usize, pending_node: &str) {
    tracing::warn!(limit, pending_node, "Recursion limit reached before END");
}
