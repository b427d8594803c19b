//! Plan and step data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::team::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    General,
    ElasticsearchPipelineGeneration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Whether the plan carries predefined steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Steps were synthesized for the request.
    Planned,
    /// No rule matched; routing is left entirely to the supervisor.
    Unstructured,
}

/// One advisory step, owned by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the plan.
    pub index: usize,
    pub worker: Worker,
    pub task: String,
    pub description: String,
    pub expected_output: String,
    /// Lower bound of the time estimate.
    pub estimated_minutes: u32,
    pub estimated_minutes_max: u32,
}

/// Execution plan produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub source_request: String,
    pub request_type: RequestType,
    pub complexity: Complexity,
    pub steps: Vec<Step>,
    pub success_criteria: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Number of steps plus one for planning itself.
    pub estimated_steps: usize,
    pub estimated_total_minutes: u32,
    pub required_workers: Vec<Worker>,
    pub context: String,
    pub status: PlanStatus,
}

impl Plan {
    /// Step at 0-based `position`, if the plan has one there.
    pub fn step(&self, position: usize) -> Option<&Step> {
        self.steps.get(position)
    }

    /// Message text announcing the plan: a header followed by the plan as pretty JSON.
    pub fn summary(&self) -> String {
        let body = serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"plan not serializable: {}\"}}", e));
        match self.status {
            PlanStatus::Planned => format!("Execution plan created: {}", body),
            PlanStatus::Unstructured => format!(
                "Execution plan created: {}\nNo predefined steps; route workers as the conversation requires.",
                body
            ),
        }
    }
}
