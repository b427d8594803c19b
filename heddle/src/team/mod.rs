//! The supervisor team: identifiers plus the fixed graph topology.
//!
//! [`build_team_graph`] wires the supervisor and the three workers:
//! `START → supervisor`, every worker → supervisor, supervisor → conditional on
//! `RunState::next` (`FINISH` maps to END). [`run_team_stream`] drives one run.

mod graph;
mod members;

pub use graph::{build_team_graph, run_team, run_team_stream, TeamUnits};
pub use members::{Goto, RouteTarget, UnitId, UnknownName, Worker, FINISH, SUPERVISOR};
