//! Closed identifier sets shared by the planner, the supervisor and the graph.
//!
//! Every routing decision goes through these enums, so an unregistered unit name
//! is rejected when it is parsed and never reaches dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node id of the supervisor in the team graph.
pub const SUPERVISOR: &str = "supervisor";

/// Terminal routing sentinel.
pub const FINISH: &str = "FINISH";

/// Unknown unit or route name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {name:?} (expected one of: {expected})")]
pub struct UnknownName {
    kind: &'static str,
    name: String,
    expected: &'static str,
}

/// One of the three task executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Worker {
    /// Gathers documentation and best practices.
    Researcher,
    /// Produces the ingest pipeline.
    Generator,
    /// Tests the pipeline against the sample documents.
    Validator,
}

impl Worker {
    /// All workers in their intended execution order.
    pub const ALL: [Worker; 3] = [Worker::Researcher, Worker::Generator, Worker::Validator];

    /// Node id of this worker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Worker::Researcher => "researcher",
            Worker::Generator => "generator",
            Worker::Validator => "validator",
        }
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Worker {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Worker::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "worker",
                name: s.to_string(),
                expected: "researcher, generator, validator",
            })
    }
}

/// Author of a message produced inside the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum UnitId {
    Supervisor,
    Worker(Worker),
}

impl UnitId {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitId::Supervisor => SUPERVISOR,
            UnitId::Worker(w) => w.as_str(),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Worker> for UnitId {
    fn from(worker: Worker) -> Self {
        UnitId::Worker(worker)
    }
}

impl From<UnitId> for String {
    fn from(id: UnitId) -> Self {
        id.as_str().to_string()
    }
}

impl FromStr for UnitId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SUPERVISOR {
            return Ok(UnitId::Supervisor);
        }
        s.parse::<Worker>()
            .map(UnitId::Worker)
            .map_err(|_| UnknownName {
                kind: "unit",
                name: s.to_string(),
                expected: "supervisor, researcher, generator, validator",
            })
    }
}

impl TryFrom<String> for UnitId {
    type Error = UnknownName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Argument of the routing action: a worker or `FINISH`, nothing else.
///
/// The supervisor itself is not a valid target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RouteTarget {
    Worker(Worker),
    Finish,
}

impl RouteTarget {
    /// Allowed targets in the order they are presented to the oracle.
    pub const ALL: [RouteTarget; 4] = [
        RouteTarget::Finish,
        RouteTarget::Worker(Worker::Researcher),
        RouteTarget::Worker(Worker::Generator),
        RouteTarget::Worker(Worker::Validator),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteTarget::Worker(w) => w.as_str(),
            RouteTarget::Finish => FINISH,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RouteTarget> for String {
    fn from(target: RouteTarget) -> Self {
        target.as_str().to_string()
    }
}

impl FromStr for RouteTarget {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "route target",
                name: s.to_string(),
                expected: "FINISH, researcher, generator, validator",
            })
    }
}

impl TryFrom<String> for RouteTarget {
    type Error = UnknownName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Value of `RunState::next`: which unit runs after the supervisor, or the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Goto {
    Supervisor,
    Worker(Worker),
    #[default]
    Finish,
}

impl Goto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goto::Supervisor => SUPERVISOR,
            Goto::Worker(w) => w.as_str(),
            Goto::Finish => FINISH,
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Goto::Finish)
    }
}

impl fmt::Display for Goto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RouteTarget> for Goto {
    fn from(target: RouteTarget) -> Self {
        match target {
            RouteTarget::Worker(w) => Goto::Worker(w),
            RouteTarget::Finish => Goto::Finish,
        }
    }
}

impl From<Goto> for String {
    fn from(goto: Goto) -> Self {
        goto.as_str().to_string()
    }
}

impl TryFrom<String> for Goto {
    type Error = UnknownName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == SUPERVISOR {
            return Ok(Goto::Supervisor);
        }
        s.parse::<RouteTarget>().map(Goto::from)
    }
}
