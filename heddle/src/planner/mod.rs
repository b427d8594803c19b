//! Rule-based planner: classifies a request and synthesizes an execution plan.
//!
//! No oracle call is involved. Requests mentioning `pipeline` or `ingest`
//! (case-insensitive) get the fixed researcher → generator → validator plan;
//! anything else gets a general plan with no predefined steps and the explicit
//! status [`PlanStatus::Unstructured`].
//!
//! The plan is advisory: the supervisor still picks every hand-off itself.

mod plan;

pub use plan::{Complexity, Plan, PlanStatus, RequestType, Step};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::team::Worker;

/// Context recorded when the caller supplies none.
pub const DEFAULT_CONTEXT: &str = "No additional context provided";

/// Keywords that select the ingest pipeline plan.
const PIPELINE_KEYWORDS: [&str; 2] = ["pipeline", "ingest"];

/// Fixed success criteria attached to every plan.
const SUCCESS_CRITERIA: [&str; 4] = [
    "All required tasks are completed successfully",
    "Output meets quality standards",
    "Results are properly documented",
    "Any errors or issues are identified and addressed",
];

/// Precondition violations on planner input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The request was empty or whitespace only.
    #[error("user request must not be empty")]
    EmptyRequest,
}

/// Builds a plan for `user_request`, timestamped now.
///
/// Returns [`PlanError::EmptyRequest`] for a blank request; never panics.
pub fn plan(user_request: &str, context: Option<&str>) -> Result<Plan, PlanError> {
    plan_at(user_request, context, Utc::now())
}

/// Same as [`plan`] with an explicit creation time.
pub fn plan_at(
    user_request: &str,
    context: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Plan, PlanError> {
    if user_request.trim().is_empty() {
        return Err(PlanError::EmptyRequest);
    }

    let request_type = classify(user_request);
    let (complexity, steps, status) = match request_type {
        RequestType::ElasticsearchPipelineGeneration => {
            (Complexity::High, pipeline_steps(), PlanStatus::Planned)
        }
        RequestType::General => {
            warn!("no domain keyword matched; plan has no predefined steps");
            (Complexity::Medium, Vec::new(), PlanStatus::Unstructured)
        }
    };

    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONTEXT)
        .to_string();

    let plan = Plan {
        source_request: user_request.to_string(),
        request_type,
        complexity,
        estimated_steps: steps.len() + 1,
        estimated_total_minutes: steps.iter().map(|s| s.estimated_minutes).sum(),
        required_workers: Worker::ALL.to_vec(),
        steps,
        success_criteria: SUCCESS_CRITERIA.iter().map(|s| s.to_string()).collect(),
        context,
        created_at,
        status,
    };
    debug!(
        request_type = ?plan.request_type,
        steps = plan.steps.len(),
        total_minutes = plan.estimated_total_minutes,
        "plan created"
    );
    Ok(plan)
}

fn classify(user_request: &str) -> RequestType {
    let lower = user_request.to_lowercase();
    if PIPELINE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        RequestType::ElasticsearchPipelineGeneration
    } else {
        RequestType::General
    }
}

fn pipeline_steps() -> Vec<Step> {
    vec![
        Step {
            index: 1,
            worker: Worker::Researcher,
            task: "Research Elasticsearch ingest pipeline documentation and best practices".into(),
            description: "Gather comprehensive information about Elasticsearch ingest processors, \
                          ECS field mappings, and pipeline optimization techniques"
                .into(),
            expected_output: "Documentation and best practices for pipeline generation".into(),
            estimated_minutes: 2,
            estimated_minutes_max: 3,
        },
        Step {
            index: 2,
            worker: Worker::Generator,
            task: "Generate ingest pipeline configuration".into(),
            description: "Create a complete Elasticsearch ingest pipeline based on the log samples \
                          and research findings"
                .into(),
            expected_output:
                "Complete pipeline configuration with processors, field mappings, and error handling"
                    .into(),
            estimated_minutes: 3,
            estimated_minutes_max: 5,
        },
        Step {
            index: 3,
            worker: Worker::Validator,
            task: "Validate and test the pipeline".into(),
            description: "Test the generated pipeline against the provided log samples to ensure \
                          proper processing"
                .into(),
            expected_output: "Validation results and any necessary pipeline adjustments".into(),
            estimated_minutes: 2,
            estimated_minutes_max: 3,
        },
    ]
}
