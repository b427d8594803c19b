//! # Heddle
//!
//! A supervisor-driven team of agents built on a small state graph runtime.
//! One supervisor plans a task once, then hands control to one worker at a
//! time (researcher, generator, validator) until it answers FINISH or the step
//! budget runs out.
//!
//! ## Design principles
//!
//! - **Delta updates**: units read `&RunState` and return a [`RunUpdate`]; the graph
//!   merges it with per-field reducers ([`RunState::merge`]). Nothing mutates state in place.
//! - **Closed routing**: the supervisor's choices are typed ([`RouteTarget`], [`SupervisorAction`]);
//!   anything the oracle returns outside that set decodes to the FINISH fail-safe.
//! - **Bounded runs**: every run has a step budget ([`RunnableConfig::recursion_limit`], 100 by default).
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`RunContext`].
//! - [`state`]: [`RunState`], [`RunUpdate`], [`RunStateUpdater`].
//! - [`planner`]: rule-based [`plan`] producing a [`Plan`].
//! - [`supervisor`]: [`SupervisorNode`], [`SupervisorAction`], [`supervisor_tools`].
//! - [`worker`]: [`WorkerNode`] and the built-in instructions.
//! - [`team`]: member ids and [`build_team_graph`], [`run_team`], [`run_team_stream`].
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`].
//! - [`tool_source`]: [`ToolSource`], [`ElasticsearchTool`], [`MockToolSource`].
//! - [`stream`]: [`StreamEvent`], [`StreamMode`], [`RunOutcome`].
//! - [`settings`]: [`RunSettings`] from the environment.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use heddle::{
//!     build_team_graph, run_team, supervisor_tools, ChatOpenAI, Message, RunnableConfig,
//!     SupervisorNode, TeamUnits, Worker, WorkerNode,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let sup = ChatOpenAI::new("gpt-4o").with_tools(supervisor_tools()).with_temperature(0.0);
//! let mut units = TeamUnits::new(SupervisorNode::new(Arc::new(sup)));
//! for worker in Worker::ALL {
//!     let llm = Arc::new(ChatOpenAI::new("gpt-4o").with_temperature(0.0));
//!     units = units.with_worker(WorkerNode::with_default_instruction(worker, llm));
//! }
//! let graph = build_team_graph(units)?;
//! let state = run_team(
//!     &graph,
//!     vec![Message::human("Generate an ingest pipeline for these logs: ...")],
//!     RunnableConfig::default(),
//! )
//! .await?;
//! println!("{}", state.messages.len());
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod planner;
pub mod settings;
pub mod state;
pub mod stream;
pub mod supervisor;
pub mod team;
pub mod tool_source;
pub mod worker;

pub use channels::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater, ReplaceUpdater, StateUpdater};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, RunContext, RunnableConfig, StateGraph,
    DEFAULT_RECURSION_LIMIT, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolCall, ToolChoiceMode};
pub use message::{Message, Role};
pub use planner::{plan, Complexity, Plan, PlanError, PlanStatus, RequestType, Step};
pub use settings::{RunSettings, SettingsError};
pub use state::{RunState, RunStateUpdater, RunUpdate};
pub use stream::{RunOutcome, StreamEvent, StreamMode, StreamWriter};
pub use supervisor::{
    supervisor_tools, SupervisorAction, SupervisorNode, SupervisorOptions, SupervisorPhase,
};
pub use team::{
    build_team_graph, run_team, run_team_stream, Goto, RouteTarget, TeamUnits, UnitId, Worker,
    FINISH, SUPERVISOR,
};
pub use tool_source::{
    ElasticsearchTool, MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec,
};
pub use worker::WorkerNode;
