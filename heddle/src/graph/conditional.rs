//! Conditional edges: route to the next node based on the merged state.
//!
//! The router returns a key; the key is looked up in the optional path map, or
//! used directly as the next node id.

use std::collections::HashMap;
use std::sync::Arc;

/// Router function: state in, routing key out.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional key → node map.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S> {
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Node id (or END) to run after the source node.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// How the compiled graph picks the node after a given one.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Fixed outgoing edge; the node's own `Next` is still honored.
    Unconditional(String),
    /// Decided by the router from state; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}
