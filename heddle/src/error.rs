//! Run-level error types.
//!
//! Returned by graph nodes and by `CompiledStateGraph::invoke`. Worker task failures
//! never show up here: they become message content so the supervisor can react.

use thiserror::Error;

use crate::planner::PlanError;

/// Error that ends a run.
///
/// Only oracle transport failures, step-budget exhaustion and precondition
/// violations reach the driver; everything else is absorbed into `messages`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, empty graph).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The walk ran `limit` units without reaching a terminal decision.
    #[error("recursion limit of {limit} steps reached without finishing")]
    RecursionLimit { limit: usize },

    /// A precondition on the input was violated before any state change.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<PlanError> for AgentError {
    fn from(err: PlanError) -> Self {
        AgentError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn agent_error_display_execution_failed() {
        let err = AgentError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("msg"), "{}", s);
    }

    /// **Scenario**: RecursionLimit names the exhausted budget.
    #[test]
    fn recursion_limit_display_mentions_limit() {
        let s = AgentError::RecursionLimit { limit: 100 }.to_string();
        assert!(s.contains("100"), "{}", s);
    }

    #[test]
    fn plan_error_becomes_invalid_input() {
        let err: AgentError = PlanError::EmptyRequest.into();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }
}
