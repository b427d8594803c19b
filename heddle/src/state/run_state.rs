use serde::{Deserialize, Serialize};

use crate::channels::{last_value, topic, StateUpdater};
use crate::message::Message;
use crate::planner::Plan;
use crate::team::{Goto, UnitId};

/// State carried through one supervisor run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Conversation history; append-only.
    pub messages: Vec<Message>,
    /// Unit to run after the supervisor, or `FINISH`.
    pub next: Goto,
    pub execution_plan: Option<Plan>,
    /// 0-based index into `execution_plan.steps`.
    pub current_step: usize,
    /// Set once a plan exists; never cleared.
    pub planning_complete: bool,
}

impl RunState {
    /// Initial state for a run: the seed messages, `next = FINISH`, no plan.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Returns the merged state; `self` is left untouched.
    pub fn merge(&self, update: &RunUpdate) -> RunState {
        RunState {
            messages: topic(&self.messages, &update.messages),
            next: last_value(&self.next, update.next.as_ref()),
            execution_plan: match &update.execution_plan {
                Some(plan) => Some(plan.clone()),
                None => self.execution_plan.clone(),
            },
            current_step: last_value(&self.current_step, update.current_step.as_ref()),
            planning_complete: last_value(
                &self.planning_complete,
                update.planning_complete.as_ref(),
            ),
        }
    }

    /// Content of the latest human message that no unit authored.
    pub fn latest_user_request(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user_request())
            .map(Message::content)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages authored by `unit`, oldest first.
    pub fn messages_by(&self, unit: UnitId) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |m| m.author() == Some(unit))
    }
}

/// Partial state returned by a unit. Absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUpdate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Goto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_complete: Option<bool>,
}

impl RunUpdate {
    /// Update carrying exactly one message.
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
            ..Self::default()
        }
    }

    pub fn with_next(self, next: Goto) -> Self {
        Self {
            next: Some(next),
            ..self
        }
    }

    pub fn with_current_step(self, step: usize) -> Self {
        Self {
            current_step: Some(step),
            ..self
        }
    }

    pub fn with_plan(self, plan: Plan) -> Self {
        Self {
            execution_plan: Some(plan),
            planning_complete: Some(true),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == RunUpdate::default()
    }
}

/// Graph updater that applies [`RunState::merge`].
#[derive(Debug, Clone, Default)]
pub struct RunStateUpdater;

impl StateUpdater<RunState, RunUpdate> for RunStateUpdater {
    fn apply_update(&self, current: &mut RunState, update: &RunUpdate) {
        *current = current.merge(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use crate::team::Worker;

    fn seeded() -> RunState {
        RunState::new(vec![Message::human("generate an ingest pipeline")])
    }

    /// **Scenario**: A fresh run state defaults to FINISH, no plan, step 0, not planned.
    #[test]
    fn new_state_defaults() {
        let s = seeded();
        assert_eq!(s.next, Goto::Finish);
        assert!(s.execution_plan.is_none());
        assert_eq!(s.current_step, 0);
        assert!(!s.planning_complete);
    }

    /// **Scenario**: Merging an empty delta is the identity, however often it is repeated.
    #[test]
    fn empty_delta_is_identity() {
        let mut s = seeded().merge(
            &RunUpdate::message(Message::human("Routing to: researcher").by(UnitId::Supervisor))
                .with_next(Goto::Worker(Worker::Researcher)),
        );
        let before = s.clone();
        for _ in 0..5 {
            s = s.merge(&RunUpdate::default());
        }
        assert_eq!(s, before);
    }

    /// **Scenario**: Messages concatenate in order and never shrink.
    #[test]
    fn messages_append_in_order() {
        let s = seeded();
        let a = Message::human("a").by(Worker::Researcher);
        let b = Message::human("b").by(Worker::Generator);
        let merged = s.merge(&RunUpdate {
            messages: vec![a.clone(), b.clone()],
            ..RunUpdate::default()
        });
        assert_eq!(merged.messages.len(), 3);
        assert_eq!(merged.messages[1], a);
        assert_eq!(merged.messages[2], b);
        assert_eq!(s.messages.len(), 1, "merge must not mutate the input");
    }

    /// **Scenario**: Scalar fields take the delta value when present, else keep the old one.
    #[test]
    fn scalar_fields_last_value_wins() {
        let p = plan("pipeline", None).unwrap();
        let s = seeded().merge(&RunUpdate::default().with_plan(p.clone()).with_next(Goto::Supervisor));
        assert!(s.planning_complete);
        assert_eq!(s.execution_plan.as_ref(), Some(&p));
        assert_eq!(s.next, Goto::Supervisor);

        let s2 = s.merge(&RunUpdate::default().with_current_step(2));
        assert_eq!(s2.current_step, 2);
        assert_eq!(s2.next, Goto::Supervisor);
        assert!(s2.planning_complete);
        assert_eq!(s2.execution_plan, s.execution_plan);
    }

    #[test]
    fn latest_user_request_skips_authored_messages() {
        let s = seeded().merge(&RunUpdate {
            messages: vec![
                Message::human("follow-up request"),
                Message::human("done").by(Worker::Researcher),
            ],
            ..RunUpdate::default()
        });
        assert_eq!(s.latest_user_request(), Some("follow-up request"));
        assert_eq!(s.messages_by(UnitId::Worker(Worker::Researcher)).count(), 1);
        assert_eq!(s.last_message().map(Message::content), Some("done"));
    }

    #[test]
    fn updater_applies_merge() {
        let mut s = seeded();
        RunStateUpdater.apply_update(&mut s, &RunUpdate::default().with_next(Goto::Supervisor));
        assert_eq!(s.next, Goto::Supervisor);
        assert!(RunUpdate::default().is_empty());
    }
}
