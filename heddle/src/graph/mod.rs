//! State graph runtime: build with [`StateGraph`], run with [`CompiledStateGraph`].
//!
//! Generic over the state `S` and the update `U` a node returns. The team graph
//! uses `StateGraph<RunState, RunUpdate>`; the tests here also use plain integers.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod next;
mod node;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use next::Next;
pub use node::Node;
pub use run_context::{RunContext, RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use state_graph::{StateGraph, END, START};
