//! Supervisor unit: plans once, then picks every hand-off until FINISH.
//!
//! Each turn the oracle sees the rendered prompt (see [`prompt::render`]) and
//! may call `create_execution_plan` or `route`. Only the first tool call
//! counts. A reply that decodes to neither ends the run through the fail-safe:
//! `"No valid action taken"` with `next = FINISH`.
//!
//! | action | delta |
//! |--------|-------|
//! | plan   | plan summary message, `execution_plan`, `planning_complete = true`, `current_step = 0`, `next = supervisor` |
//! | route  | `"Routing to: <target>"`, `next = target`, `current_step + 1` when the target owns the current step |
//! | none   | `"No valid action taken"`, `next = FINISH` |

mod action;
pub mod prompt;

pub use action::{
    supervisor_tools, ActionError, PlanArgs, RouteArgs, SupervisorAction, TOOL_CREATE_PLAN,
    TOOL_ROUTE,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::planner::{self, Plan};
use crate::state::{RunState, RunUpdate};
use crate::team::{Goto, RouteTarget, UnitId, SUPERVISOR};

/// Message posted when the oracle reply carries no usable action.
pub const NO_VALID_ACTION: &str = "No valid action taken";

/// Where the supervisor is in its workflow, derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    AwaitingPlan,
    Routing,
    Finished,
}

impl SupervisorPhase {
    /// `Finished` once the supervisor has posted a decision with `next == FINISH`.
    pub fn of(state: &RunState) -> Self {
        let supervisor_spoke_last = state
            .last_message()
            .and_then(Message::author)
            .is_some_and(|a| a == UnitId::Supervisor);
        if supervisor_spoke_last && state.next.is_finish() {
            SupervisorPhase::Finished
        } else if !state.planning_complete {
            SupervisorPhase::AwaitingPlan
        } else {
            SupervisorPhase::Routing
        }
    }
}

/// Behaviour switches for the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Turn a route chosen before any plan exists into a plan action.
    pub require_plan: bool,
}

impl SupervisorOptions {
    pub fn require_plan(self, require_plan: bool) -> Self {
        Self { require_plan }
    }
}

/// The routing unit. Holds an oracle client bound to [`supervisor_tools`].
pub struct SupervisorNode {
    llm: Arc<dyn LlmClient>,
    options: SupervisorOptions,
}

impl SupervisorNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            options: SupervisorOptions::default(),
        }
    }

    pub fn with_options(self, options: SupervisorOptions) -> Self {
        Self { options, ..self }
    }

    /// Asks the oracle and decodes its reply; `None` means no valid action.
    async fn decide(&self, state: &RunState) -> Result<Option<SupervisorAction>, AgentError> {
        let response = self.llm.invoke(&prompt::render(state)).await?;
        let action = match SupervisorAction::decode(&response) {
            Ok(action) => action,
            Err(e) => {
                warn!(error = %e, "supervisor reply has no valid action, finishing");
                return Ok(None);
            }
        };
        if let SupervisorAction::Route(route) = &action {
            if !state.planning_complete {
                if self.options.require_plan {
                    debug!(route_to = %route.next, "route before plan, planning first");
                    return Ok(Some(SupervisorAction::Plan(PlanArgs {
                        user_request: state.latest_user_request().unwrap_or_default().to_string(),
                        context: None,
                    })));
                }
                warn!(route_to = %route.next, "routing before an execution plan exists");
            }
        }
        Ok(Some(action))
    }

    /// Delta for the plan action. The request is read from the conversation;
    /// the oracle's paraphrase is only used when no user request is present.
    fn plan_update(state: &RunState, args: &PlanArgs) -> Result<(RunUpdate, Plan), AgentError> {
        let request = state
            .latest_user_request()
            .unwrap_or(args.user_request.as_str());
        let plan = planner::plan(request, args.context.as_deref())?;
        info!(
            request_type = ?plan.request_type,
            steps = plan.steps.len(),
            "execution plan created"
        );
        let update = RunUpdate::message(Message::human(plan.summary()).by(UnitId::Supervisor))
            .with_plan(plan.clone())
            .with_current_step(0)
            .with_next(Goto::Supervisor);
        Ok((update, plan))
    }

    fn route_update(state: &RunState, target: RouteTarget) -> RunUpdate {
        let update = RunUpdate::message(
            Message::human(format!("Routing to: {}", target)).by(UnitId::Supervisor),
        )
        .with_next(Goto::from(target));
        let owns_current_step = match (target, &state.execution_plan) {
            (RouteTarget::Worker(w), Some(plan)) => plan
                .step(state.current_step)
                .is_some_and(|step| step.worker == w),
            _ => false,
        };
        if owns_current_step {
            update.with_current_step(state.current_step + 1)
        } else {
            update
        }
    }

    fn fail_safe_update() -> RunUpdate {
        RunUpdate::message(Message::human(NO_VALID_ACTION).by(UnitId::Supervisor))
            .with_next(Goto::Finish)
    }

    async fn turn(
        &self,
        state: &RunState,
        ctx: Option<&RunContext<RunState, RunUpdate>>,
    ) -> Result<(RunUpdate, Next), AgentError> {
        let update = match self.decide(state).await? {
            Some(SupervisorAction::Plan(args)) => {
                let (update, plan) = Self::plan_update(state, &args)?;
                if let Some(ctx) = ctx {
                    ctx.emit_custom(json!({
                        "type": "plan_created",
                        "request_type": plan.request_type,
                        "complexity": plan.complexity,
                        "steps": plan.steps.len(),
                        "status": plan.status,
                    }))
                    .await;
                }
                update
            }
            Some(SupervisorAction::Route(RouteArgs { next })) => Self::route_update(state, next),
            None => Self::fail_safe_update(),
        };
        Ok((update, Next::Continue))
    }
}

#[async_trait]
impl Node<RunState, RunUpdate> for SupervisorNode {
    fn id(&self) -> &str {
        SUPERVISOR
    }

    async fn run(&self, state: &RunState) -> Result<(RunUpdate, Next), AgentError> {
        self.turn(state, None).await
    }

    async fn run_with_context(
        &self,
        state: &RunState,
        ctx: &RunContext<RunState, RunUpdate>,
    ) -> Result<(RunUpdate, Next), AgentError> {
        self.turn(state, Some(ctx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::llm::{LlmResponse, MockLlm};
    use crate::team::Worker;

    fn node(reply: LlmResponse) -> SupervisorNode {
        SupervisorNode::new(Arc::new(MockLlm::new(vec![reply])))
    }

    fn request() -> RunState {
        RunState::new(vec![Message::human("Generate an ingest pipeline for these logs")])
    }

    fn planned() -> RunState {
        let state = request();
        let plan = planner::plan("ingest pipeline", None).unwrap();
        state.merge(&RunUpdate::default().with_plan(plan).with_current_step(0))
    }

    /// **Scenario**: The plan action stores the plan and loops back to the supervisor.
    #[tokio::test]
    async fn plan_action_loops_back_to_supervisor() {
        let sup = node(LlmResponse::tool_call(
            TOOL_CREATE_PLAN,
            r#"{"userRequest":"paraphrase","context":"logs from prod"}"#,
        ));
        let (update, _) = sup.run(&request()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Supervisor));
        assert_eq!(update.planning_complete, Some(true));
        assert_eq!(update.current_step, Some(0));
        let plan = update.execution_plan.as_ref().unwrap();
        assert_eq!(plan.source_request, "Generate an ingest pipeline for these logs");
        assert_eq!(plan.context, "logs from prod");
        assert_eq!(plan.steps.len(), 3);
        assert!(update.messages[0].content().starts_with("Execution plan created: "));
        assert_eq!(update.messages[0].author(), Some(UnitId::Supervisor));
    }

    #[tokio::test]
    async fn plan_action_without_any_request_is_invalid_input() {
        let sup = node(LlmResponse::tool_call(TOOL_CREATE_PLAN, r#"{"userRequest":"  "}"#));
        let err = sup.run(&RunState::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }

    /// **Scenario**: Routing to the owner of the current step advances the step.
    #[tokio::test]
    async fn route_to_step_owner_advances_step() {
        let sup = node(LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"researcher"}"#));
        let (update, _) = sup.run(&planned()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Worker(Worker::Researcher)));
        assert_eq!(update.current_step, Some(1));
        assert_eq!(update.messages[0].content(), "Routing to: researcher");
        assert!(update.execution_plan.is_none());
    }

    #[tokio::test]
    async fn route_out_of_order_keeps_step() {
        let sup = node(LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"validator"}"#));
        let (update, _) = sup.run(&planned()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Worker(Worker::Validator)));
        assert_eq!(update.current_step, None);
    }

    #[tokio::test]
    async fn route_finish() {
        let sup = node(LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"FINISH"}"#));
        let (update, _) = sup.run(&planned()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Finish));
        assert_eq!(update.messages[0].content(), "Routing to: FINISH");
    }

    /// **Scenario**: Any reply without a valid action finishes the run with the fail-safe message.
    #[tokio::test]
    async fn invalid_replies_fail_safe_to_finish() {
        let replies = [
            LlmResponse::text("I think the researcher should go"),
            LlmResponse::tool_call("delegate", "{}"),
            LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"supervisor"}"#),
            LlmResponse::tool_call(TOOL_ROUTE, "not json"),
        ];
        for reply in replies {
            let (update, _) = node(reply).run(&planned()).await.unwrap();
            assert_eq!(update.next, Some(Goto::Finish));
            assert_eq!(update.messages.len(), 1);
            assert_eq!(update.messages[0].content(), NO_VALID_ACTION);
            assert!(update.execution_plan.is_none());
        }
    }

    #[tokio::test]
    async fn route_before_plan_is_allowed_by_default() {
        let sup = node(LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"generator"}"#));
        let (update, _) = sup.run(&request()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Worker(Worker::Generator)));
        assert!(update.execution_plan.is_none());
    }

    /// **Scenario**: With `require_plan`, a premature route becomes a plan action.
    #[tokio::test]
    async fn require_plan_turns_premature_route_into_plan() {
        let sup = node(LlmResponse::tool_call(TOOL_ROUTE, r#"{"next":"generator"}"#))
            .with_options(SupervisorOptions::default().require_plan(true));
        let (update, _) = sup.run(&request()).await.unwrap();
        assert_eq!(update.next, Some(Goto::Supervisor));
        assert!(update.execution_plan.is_some());
    }

    #[tokio::test]
    async fn oracle_failure_is_run_level_error() {
        let sup = SupervisorNode::new(Arc::new(MockLlm::failing("503")));
        assert!(matches!(
            sup.run(&request()).await,
            Err(AgentError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn phase_follows_state() {
        assert_eq!(SupervisorPhase::of(&request()), SupervisorPhase::AwaitingPlan);
        let state = planned();
        assert_eq!(SupervisorPhase::of(&state), SupervisorPhase::Routing);
        let done = state.merge(
            &RunUpdate::message(Message::human("Routing to: FINISH").by(UnitId::Supervisor))
                .with_next(Goto::Finish),
        );
        assert_eq!(SupervisorPhase::of(&done), SupervisorPhase::Finished);
    }
}
