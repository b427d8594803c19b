//! Compiled state graph: immutable, runs with `invoke`, `invoke_with_context` or `stream`.
//!
//! The run loop is strictly sequential. Before each node it checks the step
//! counter against `RunnableConfig::recursion_limit`; a run that has used its
//! whole budget without reaching END stops with `AgentError::RecursionLimit`
//! (or `RunOutcome::RecursionLimit` when streaming). The loop is the only writer
//! of the state: nodes get `&S`, return an update, and the updater merges it in
//! before the next node starts.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channels::BoxedStateUpdater;
use crate::error::AgentError;
use crate::stream::{RunOutcome, StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_recursion_limit, log_state_update,
};
use super::state_graph::END;
use super::{Next, NextEntry, Node, RunContext, RunnableConfig};

/// Executable graph produced by `StateGraph::compile()`.
#[derive(Clone)]
pub struct CompiledStateGraph<S, U = S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S, U>>>,
    /// Node reached from START.
    pub(super) first_node_id: String,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) state_updater: BoxedStateUpdater<S, U>,
}

impl<S, U> CompiledStateGraph<S, U>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    /// Runs nodes from `current_id` until END; returns the number of node executions.
    async fn run_loop_inner(
        &self,
        state: &mut S,
        current_id: &mut String,
        run_ctx: &RunContext<S, U>,
    ) -> Result<usize, AgentError> {
        let limit = run_ctx.config.recursion_limit;
        log_graph_start(run_ctx.config.run_id.as_deref(), limit);
        let writer = run_ctx.stream_writer();
        let mut steps = 0usize;

        loop {
            if steps >= limit {
                log_recursion_limit(limit, current_id);
                return Err(AgentError::RecursionLimit { limit });
            }
            let node = match self.nodes.get(current_id.as_str()) {
                Some(node) => node.clone(),
                None => {
                    let err = AgentError::ExecutionFailed(format!("node not found: {}", current_id));
                    log_graph_error(&err);
                    return Err(err);
                }
            };

            log_node_start(current_id, steps);
            log_node_state(current_id, state);
            writer
                .emit(
                    StreamMode::Tasks,
                    StreamEvent::TaskStart {
                        node_id: current_id.clone(),
                        step: steps,
                    },
                )
                .await;

            let result = node.run_with_context(state, run_ctx).await;
            steps += 1;

            let (update, next) = match result {
                Ok(output) => output,
                Err(e) => {
                    writer
                        .emit(
                            StreamMode::Tasks,
                            StreamEvent::TaskEnd {
                                node_id: current_id.clone(),
                                result: Err(e.to_string()),
                            },
                        )
                        .await;
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            writer
                .emit(
                    StreamMode::Tasks,
                    StreamEvent::TaskEnd {
                        node_id: current_id.clone(),
                        result: Ok(()),
                    },
                )
                .await;
            log_node_complete(current_id, &next);

            self.state_updater.apply_update(state, &update);
            log_state_update(current_id, &update);

            if writer.is_enabled(StreamMode::Values) {
                writer
                    .emit(StreamMode::Values, StreamEvent::Values(state.clone()))
                    .await;
            }
            writer
                .emit(
                    StreamMode::Updates,
                    StreamEvent::Updates {
                        node_id: current_id.clone(),
                        update,
                    },
                )
                .await;

            let next_id = match self.next_map.get(current_id.as_str()) {
                Some(NextEntry::Conditional(router)) => {
                    let target = router.resolve_next(state);
                    tracing::debug!(from = %current_id, to = %target, "conditional routing");
                    Some(target)
                }
                Some(NextEntry::Unconditional(to)) => match next {
                    Next::End => None,
                    Next::Node(id) => Some(id),
                    Next::Continue => Some(to.clone()),
                },
                None => match next {
                    Next::Node(id) => Some(id),
                    Next::End | Next::Continue => None,
                },
            };

            match next_id {
                Some(id) if id != END => *current_id = id,
                _ => {
                    log_graph_complete(steps);
                    return Ok(steps);
                }
            }
        }
    }

    /// Entry point shared by `invoke_with_context` and `stream`.
    async fn run_from_entry(
        &self,
        state: &mut S,
        run_ctx: &RunContext<S, U>,
    ) -> Result<usize, AgentError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let mut current_id = self.first_node_id.clone();
        self.run_loop_inner(state, &mut current_id, run_ctx).await
    }

    /// Runs the graph from its entry node and returns the final state.
    ///
    /// `None` config means `RunnableConfig::default()` (budget of 100 steps).
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        self.invoke_with_context(state, RunContext::new(config.unwrap_or_default()))
            .await
    }

    /// Runs the graph with a caller-built context (e.g. with a stream sender attached).
    pub async fn invoke_with_context(
        &self,
        state: S,
        run_ctx: RunContext<S, U>,
    ) -> Result<S, AgentError> {
        let mut state = state;
        self.run_from_entry(&mut state, &run_ctx).await?;
        Ok(state)
    }

    /// Streams the run: events for the enabled modes, then one `StreamEvent::End`.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S, U>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let mut run_ctx = RunContext::new(config.unwrap_or_default());
            run_ctx.stream_tx = Some(tx);
            run_ctx.stream_mode = mode_set;
            let writer = run_ctx.stream_writer();

            let mut state = state;
            let outcome = match graph.run_from_entry(&mut state, &run_ctx).await {
                Ok(steps) => RunOutcome::Completed { steps },
                Err(AgentError::RecursionLimit { limit }) => RunOutcome::RecursionLimit { limit },
                Err(e) => RunOutcome::Failed {
                    error: e.to_string(),
                },
            };
            writer.emit_end(outcome).await;
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio_stream::StreamExt;

    use crate::channels::{boxed_updater, FieldBasedUpdater};
    use crate::graph::{StateGraph, START};

    #[derive(Clone)]
    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, state: &i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::Continue))
        }
    }

    /// Returns `Next::End` regardless of its outgoing edge.
    struct EndAfterNode;

    #[async_trait]
    impl Node<i32> for EndAfterNode {
        fn id(&self) -> &str {
            "stop"
        }
        async fn run(&self, state: &i32) -> Result<(i32, Next), AgentError> {
            Ok((state * 100, Next::End))
        }
    }

    struct FailingNode;

    #[async_trait]
    impl Node<i32> for FailingNode {
        fn id(&self) -> &str {
            "boom"
        }
        async fn run(&self, _state: &i32) -> Result<(i32, Next), AgentError> {
            Err(AgentError::ExecutionFailed("boom".into()))
        }
    }

    fn add(id: &'static str, delta: i32) -> Arc<dyn Node<i32>> {
        Arc::new(AddNode { id, delta })
    }

    fn two_step_graph() -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("first", add("first", 1))
            .add_node("second", add("second", 2))
            .add_edge(START, "first")
            .add_edge("first", "second")
            .add_edge("second", END);
        graph.compile().expect("graph compiles")
    }

    /// Loops `tick` until the counter reaches `until`, then ends.
    fn counting_loop(until: i32) -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("tick", add("tick", 1)).add_edge(START, "tick");
        graph.add_conditional_edges(
            "tick",
            Arc::new(move |s: &i32| if *s >= until { END.to_string() } else { "tick".to_string() }),
            None,
        );
        graph.compile().expect("graph compiles")
    }

    #[tokio::test]
    async fn invoke_runs_linear_chain() {
        let out = two_step_graph().invoke(0, None).await.unwrap();
        assert_eq!(out, 3);
    }

    /// **Scenario**: A node returning Next::End stops the run even with an outgoing edge.
    #[tokio::test]
    async fn invoke_next_end_stops_early() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("stop", Arc::new(EndAfterNode))
            .add_node("after", add("after", 1000))
            .add_edge(START, "stop")
            .add_edge("stop", "after")
            .add_edge("after", END);
        let out = graph.compile().unwrap().invoke(1, None).await.unwrap();
        assert_eq!(out, 100);
    }

    /// **Scenario**: A conditional loop runs exactly as many steps as it needs within budget.
    #[tokio::test]
    async fn invoke_conditional_loop_within_budget() {
        let out = counting_loop(10).invoke(0, None).await.unwrap();
        assert_eq!(out, 10);
    }

    /// **Scenario**: A run needing exactly `limit` steps completes; one more step fails.
    #[tokio::test]
    async fn recursion_limit_counts_node_executions() {
        let cfg = RunnableConfig::default().with_recursion_limit(5);
        assert_eq!(counting_loop(5).invoke(0, Some(cfg.clone())).await.unwrap(), 5);
        match counting_loop(6).invoke(0, Some(cfg)).await {
            Err(AgentError::RecursionLimit { limit }) => assert_eq!(limit, 5),
            other => panic!("expected RecursionLimit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invoke_propagates_node_error() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("boom", Arc::new(FailingNode))
            .add_edge(START, "boom")
            .add_edge("boom", END);
        let err = graph.compile().unwrap().invoke(0, None).await.unwrap_err();
        assert!(err.to_string().contains("boom"), "{}", err);
    }

    /// **Scenario**: An update type distinct from the state is merged by the configured updater.
    #[tokio::test]
    async fn invoke_merges_delta_updates() {
        #[derive(Clone, Debug, Default, PartialEq)]
        struct Log(Vec<String>);

        struct Say(&'static str);

        #[async_trait]
        impl Node<Log, String> for Say {
            fn id(&self) -> &str {
                self.0
            }
            async fn run(&self, _state: &Log) -> Result<(String, Next), AgentError> {
                Ok((self.0.to_string(), Next::Continue))
            }
        }

        let updater = FieldBasedUpdater::new(|cur: &mut Log, upd: &String| cur.0.push(upd.clone()));
        let mut graph = StateGraph::<Log, String>::with_updater(boxed_updater(updater));
        graph
            .add_node("hello", Arc::new(Say("hello")))
            .add_node("world", Arc::new(Say("world")))
            .add_edge(START, "hello")
            .add_edge("hello", "world")
            .add_edge("world", END);
        let out = graph.compile().unwrap().invoke(Log::default(), None).await.unwrap();
        assert_eq!(out.0, vec!["hello", "world"]);
    }

    /// **Scenario**: Streaming Updates yields one event per node, then a Completed end event.
    #[tokio::test]
    async fn stream_updates_then_completed() {
        let events: Vec<_> = two_step_graph()
            .stream(0, None, [StreamMode::Updates])
            .collect()
            .await;
        assert_eq!(events.len(), 3, "{:?}", events);
        assert!(matches!(&events[0], StreamEvent::Updates { node_id, update } if node_id == "first" && *update == 1));
        assert!(matches!(&events[1], StreamEvent::Updates { node_id, update } if node_id == "second" && *update == 3));
        assert!(matches!(&events[2], StreamEvent::End(RunOutcome::Completed { steps: 2 })));
    }

    /// **Scenario**: Budget exhaustion is reported as a distinct terminal event.
    #[tokio::test]
    async fn stream_reports_recursion_limit() {
        let cfg = RunnableConfig::default().with_recursion_limit(3);
        let events: Vec<_> = counting_loop(100)
            .stream(0, Some(cfg), [StreamMode::Values])
            .collect()
            .await;
        let values = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Values(_)))
            .count();
        assert_eq!(values, 3);
        assert!(matches!(
            events.last(),
            Some(StreamEvent::End(RunOutcome::RecursionLimit { limit: 3 }))
        ));
    }

    #[tokio::test]
    async fn stream_tasks_mode_wraps_each_node() {
        let events: Vec<_> = two_step_graph()
            .stream(0, None, [StreamMode::Tasks])
            .collect()
            .await;
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                StreamEvent::TaskStart { .. } => "start",
                StreamEvent::TaskEnd { result: Ok(()), .. } => "ok",
                StreamEvent::End(_) => "end",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["start", "ok", "start", "ok", "end"]);
    }

    #[tokio::test]
    async fn stream_reports_failure() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("boom", Arc::new(FailingNode))
            .add_edge(START, "boom")
            .add_edge("boom", END);
        let events: Vec<_> = graph.compile().unwrap().stream(0, None, [StreamMode::Values]).collect().await;
        assert!(matches!(events.as_slice(), [StreamEvent::End(RunOutcome::Failed { .. })]));
    }
}
