//! State graph: nodes, explicit edges and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using [`START`]
//! and [`END`], and route on state with `add_conditional_edges`. `compile` checks
//! the topology and returns a [`CompiledStateGraph`].
//!
//! A node has either one outgoing edge or conditional edges, never both. Cycles
//! are allowed only through conditional edges; the run loop's step budget bounds them.
//!
//! # Updates
//!
//! Nodes return an update `U`. `StateGraph::new()` is for graphs where `U == S`
//! and the update replaces the state. Use [`StateGraph::with_updater`] when the
//! update is a delta, e.g. `RunUpdate` merged into `RunState`.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::channels::{BoxedStateUpdater, ReplaceUpdater};

use super::compile_error::CompilationError;
use super::compiled::CompiledStateGraph;
use super::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use super::node::Node;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// Graph under construction.
pub struct StateGraph<S, U = S> {
    nodes: HashMap<String, Arc<dyn Node<S, U>>>,
    /// (from, to). START may appear as from, END as to.
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    state_updater: BoxedStateUpdater<S, U>,
}

impl<S> Default for StateGraph<S, S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S, S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Empty graph whose node outputs replace the state.
    pub fn new() -> Self {
        Self::with_updater(Arc::new(ReplaceUpdater))
    }
}

impl<S, U> StateGraph<S, U>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    /// Empty graph that folds node updates in with `updater`.
    pub fn with_updater(updater: BoxedStateUpdater<S, U>) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            state_updater: updater,
        }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S, U>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id` (use START / END for entry and exit).
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// After `source` runs, `path(&merged_state)` picks the next node.
    ///
    /// The key is looked up in `path_map` when given, else used as the node id.
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "supervisor",
    ///     Arc::new(|s: &RunState| s.next.to_string()),
    ///     Some([("FINISH".into(), END.into()), ("researcher".into(), "researcher".into())]
    ///         .into_iter()
    ///         .collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Validates the topology and builds the executable graph.
    pub fn compile(self) -> Result<CompiledStateGraph<S, U>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(path_map) = &router.path_map {
                if let Some(bad) = path_map
                    .values()
                    .find(|t| t.as_str() != END && !self.nodes.contains_key(t.as_str()))
                {
                    return Err(CompilationError::InvalidConditionalPathMap(bad.clone()));
                }
            }
        }

        let mut start_targets = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = match (start_targets.next(), start_targets.next()) {
            (None, _) => return Err(CompilationError::MissingStart),
            (Some(first), None) => first,
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START".into(),
                ))
            }
        };
        if first == END {
            return Err(CompilationError::InvalidChain("START leads directly to END".into()));
        }

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if next_map
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "node {} has more than one outgoing edge",
                    from
                )));
            }
        }
        for (source, router) in &self.conditional_edges {
            if next_map.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(source.clone()));
            }
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }

        if self.conditional_edges.is_empty() {
            let mut visited = HashSet::new();
            let mut current = first.clone();
            while current != END {
                if !visited.insert(current.clone()) {
                    return Err(CompilationError::InvalidChain(format!(
                        "cycle through {} without conditional exit",
                        current
                    )));
                }
                current = match next_map.get(&current) {
                    Some(NextEntry::Unconditional(to)) => to.clone(),
                    _ => break,
                };
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            state_updater: self.state_updater,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::AgentError;
    use crate::graph::Next;

    #[derive(Clone)]
    struct Noop(&'static str);

    #[async_trait]
    impl Node<i32> for Noop {
        fn id(&self) -> &str {
            self.0
        }
        async fn run(&self, state: &i32) -> Result<(i32, Next), AgentError> {
            Ok((*state, Next::Continue))
        }
    }

    fn two_nodes() -> StateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("a", Arc::new(Noop("a")))
            .add_node("b", Arc::new(Noop("b")));
        graph
    }

    /// **Scenario**: Compile fails when a node has both an outgoing edge and conditional edges.
    #[test]
    fn compile_fails_when_node_has_both_edge_and_conditional() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a").add_edge("a", "b").add_edge("b", END);
        graph.add_conditional_edges("a", Arc::new(|_| "b".to_string()), None);
        match graph.compile() {
            Err(CompilationError::NodeHasBothEdgeAndConditional(id)) => assert_eq!(id, "a"),
            Err(e) => panic!("expected NodeHasBothEdgeAndConditional(a), got {:?}", e),
            Ok(_) => panic!("expected compile error"),
        }
    }

    #[test]
    fn compile_fails_on_unknown_node() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a").add_edge("a", "ghost");
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::NodeNotFound(id)) if id == "ghost"
        ));
    }

    #[test]
    fn compile_fails_without_start() {
        let mut graph = two_nodes();
        graph.add_edge("a", "b").add_edge("b", END);
        assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
    }

    #[test]
    fn compile_fails_without_path_to_end() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "b".to_string()),
            Some([("b".to_string(), "b".to_string())].into_iter().collect()),
        );
        assert!(matches!(graph.compile(), Err(CompilationError::MissingEnd)));
    }

    /// **Scenario**: A path-map target that is not a node is rejected at compile time.
    #[test]
    fn compile_fails_on_bad_path_map_target() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a").add_edge("b", END);
        graph.add_conditional_edges(
            "a",
            Arc::new(|_| "x".to_string()),
            Some([("x".to_string(), "nowhere".to_string())].into_iter().collect()),
        );
        assert!(matches!(
            graph.compile(),
            Err(CompilationError::InvalidConditionalPathMap(t)) if t == "nowhere"
        ));
    }

    #[test]
    fn compile_fails_on_unconditional_cycle() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a").add_edge("a", "b").add_edge("b", "a");
        graph.add_node("c", Arc::new(Noop("c")));
        graph.add_edge("c", END);
        assert!(matches!(graph.compile(), Err(CompilationError::InvalidChain(_))));
    }

    #[test]
    fn compile_fails_on_duplicate_outgoing_edge() {
        let mut graph = two_nodes();
        graph
            .add_edge(START, "a")
            .add_edge("a", "b")
            .add_edge("a", END)
            .add_edge("b", END);
        assert!(matches!(graph.compile(), Err(CompilationError::InvalidChain(_))));
    }

    /// **Scenario**: Cycles through a conditional node compile; the budget bounds them at run time.
    #[test]
    fn compile_accepts_conditional_cycle() {
        let mut graph = two_nodes();
        graph.add_edge(START, "a").add_edge("b", "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(|s: &i32| if *s > 0 { "b".into() } else { END.into() }),
            None,
        );
        assert!(graph.compile().is_ok());
    }
}
