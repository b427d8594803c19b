//! Supervisor prompt rendering.

use crate::message::Message;
use crate::state::RunState;
use crate::team::{RouteTarget, Worker};

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// System instruction naming the workers and the plan-then-route workflow.
pub fn system_prompt() -> String {
    format!(
        "You are a supervisor tasked with managing a conversation between the following workers: {}. \
You have access to a planning tool that can analyze user requirements and create execution plans. \
WORKFLOW: If no execution plan exists yet, use the planning tool to create one; you will be asked \
again once the plan is in the conversation. If an execution plan exists, use the routing tool to \
select the next worker to execute the plan. Each worker will perform a task and respond with their \
results and status. When all tasks are completed, respond with FINISH.",
        join(Worker::ALL)
    )
}

/// Closing question appended after the conversation.
pub fn closing_prompt() -> String {
    format!(
        "Given the conversation above, who should act next? Or should we FINISH? Select one of: {}",
        join(RouteTarget::ALL)
    )
}

/// `[system] ++ state.messages ++ [closing question]`.
pub fn render(state: &RunState) -> Vec<Message> {
    let mut messages = Vec::with_capacity(state.messages.len() + 2);
    messages.push(Message::system(system_prompt()));
    messages.extend(state.messages.iter().cloned());
    messages.push(Message::human(closing_prompt()));
    messages
}
