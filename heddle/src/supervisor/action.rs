//! The two supervisor actions, their tool schemas, and decoding from an oracle reply.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::llm::LlmResponse;
use crate::team::RouteTarget;
use crate::tool_source::ToolSpec;

pub const TOOL_ROUTE: &str = "route";
pub const TOOL_CREATE_PLAN: &str = "create_execution_plan";

/// Arguments of `create_execution_plan`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanArgs {
    #[serde(rename = "userRequest")]
    pub user_request: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Arguments of `route`. Unknown targets fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RouteArgs {
    pub next: RouteTarget,
}

/// A decoded supervisor decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorAction {
    Plan(PlanArgs),
    Route(RouteArgs),
}

/// Why an oracle reply carried no usable action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("reply has no tool call")]
    NoToolCall,
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("malformed arguments for {action}: {reason}")]
    MalformedArguments { action: String, reason: String },
}

impl SupervisorAction {
    /// Decodes the first tool call of `response`; later calls are ignored.
    pub fn decode(response: &LlmResponse) -> Result<Self, ActionError> {
        let call = response.tool_calls.first().ok_or(ActionError::NoToolCall)?;
        let malformed = |e: serde_json::Error| ActionError::MalformedArguments {
            action: call.name.clone(),
            reason: e.to_string(),
        };
        match call.name.as_str() {
            TOOL_CREATE_PLAN => serde_json::from_str(&call.arguments)
                .map(SupervisorAction::Plan)
                .map_err(malformed),
            TOOL_ROUTE => serde_json::from_str(&call.arguments)
                .map(SupervisorAction::Route)
                .map_err(malformed),
            other => Err(ActionError::UnknownAction(other.to_string())),
        }
    }
}

/// Tool specs offered to the supervisor's oracle: routing and planning.
pub fn supervisor_tools() -> Vec<ToolSpec> {
    let targets: Vec<&str> = RouteTarget::ALL.iter().map(RouteTarget::as_str).collect();
    vec![
        ToolSpec {
            name: TOOL_ROUTE.to_string(),
            description: Some("Select the next role.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "next": { "type": "string", "enum": targets }
                },
                "required": ["next"]
            }),
        },
        ToolSpec {
            name: TOOL_CREATE_PLAN.to_string(),
            description: Some(
                "Analyze user requirements and create a comprehensive execution plan for the agent team"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "userRequest": {
                        "type": "string",
                        "description": "The user's original request or requirement"
                    },
                    "context": {
                        "type": "string",
                        "description": "Additional context or constraints for the plan"
                    }
                },
                "required": ["userRequest"]
            }),
        },
    ]
}
