//! Team graph construction and the run entry points.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, RunnableConfig, StateGraph, END, START};
use crate::message::Message;
use crate::state::{RunState, RunStateUpdater, RunUpdate};
use crate::stream::{StreamEvent, StreamMode};
use crate::supervisor::SupervisorNode;
use crate::worker::WorkerNode;

use super::members::{Worker, FINISH, SUPERVISOR};

/// The four units of one team. All three workers must be present to build the graph.
pub struct TeamUnits {
    supervisor: SupervisorNode,
    workers: HashMap<Worker, WorkerNode>,
}

impl TeamUnits {
    pub fn new(supervisor: SupervisorNode) -> Self {
        Self {
            supervisor,
            workers: HashMap::new(),
        }
    }

    /// Adds (or replaces) the node for `node.worker()`.
    pub fn with_worker(mut self, node: WorkerNode) -> Self {
        self.workers.insert(node.worker(), node);
        self
    }
}

/// Builds the supervisor-centred graph.
///
/// Fails with `CompilationError::InvalidConditionalPathMap` when a worker is missing.
pub fn build_team_graph(
    units: TeamUnits,
) -> Result<CompiledStateGraph<RunState, RunUpdate>, CompilationError> {
    let mut graph = StateGraph::<RunState, RunUpdate>::with_updater(Arc::new(RunStateUpdater));
    graph.add_node(SUPERVISOR, Arc::new(units.supervisor));
    for (worker, node) in units.workers {
        graph.add_node(worker.as_str(), Arc::new(node));
        graph.add_edge(worker.as_str(), SUPERVISOR);
    }
    graph.add_edge(START, SUPERVISOR);

    let mut path_map: HashMap<String, String> = Worker::ALL
        .iter()
        .map(|w| (w.as_str().to_string(), w.as_str().to_string()))
        .collect();
    path_map.insert(SUPERVISOR.to_string(), SUPERVISOR.to_string());
    path_map.insert(FINISH.to_string(), END.to_string());
    graph.add_conditional_edges(
        SUPERVISOR,
        Arc::new(|state: &RunState| state.next.to_string()),
        Some(path_map),
    );
    graph.compile()
}

/// Runs the team on `messages` and returns the final state.
pub async fn run_team(
    graph: &CompiledStateGraph<RunState, RunUpdate>,
    messages: Vec<Message>,
    config: RunnableConfig,
) -> Result<RunState, AgentError> {
    info!(messages = messages.len(), limit = config.recursion_limit, "team run");
    graph.invoke(RunState::new(messages), Some(config)).await
}

/// Streams the team run; the last event is always `StreamEvent::End`.
pub fn run_team_stream(
    graph: &CompiledStateGraph<RunState, RunUpdate>,
    messages: Vec<Message>,
    config: RunnableConfig,
    modes: impl Into<HashSet<StreamMode>>,
) -> ReceiverStream<StreamEvent<RunState, RunUpdate>> {
    info!(messages = messages.len(), limit = config.recursion_limit, "team stream");
    graph.stream(RunState::new(messages), Some(config), modes)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::llm::{LlmResponse, MockLlm};
    use crate::supervisor::TOOL_ROUTE;

    fn finish_immediately() -> TeamUnits {
        let sup = SupervisorNode::new(Arc::new(MockLlm::with_tool_call(
            TOOL_ROUTE,
            r#"{"next":"FINISH"}"#,
        )));
        let worker_llm = Arc::new(MockLlm::new(vec![LlmResponse::text("unused")]));
        Worker::ALL.iter().fold(TeamUnits::new(sup), |units, w| {
            units.with_worker(WorkerNode::with_default_instruction(*w, worker_llm.clone()))
        })
    }

    #[test]
    fn missing_worker_fails_to_compile() {
        let sup = SupervisorNode::new(Arc::new(MockLlm::with_no_tool_calls("")));
        assert!(matches!(
            build_team_graph(TeamUnits::new(sup)),
            Err(CompilationError::InvalidConditionalPathMap(_))
        ));
    }

    /// **Scenario**: An immediate FINISH ends the run after one supervisor step.
    #[tokio::test]
    async fn immediate_finish() {
        let graph = build_team_graph(finish_immediately()).unwrap();
        let state = run_team(&graph, vec![Message::human("hi")], RunnableConfig::default())
            .await
            .unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content(), "Routing to: FINISH");
        assert!(state.next.is_finish());
    }
}
