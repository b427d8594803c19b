//! Shared run state and the deltas units return.
//!
//! [`RunState`] is owned by the compiled graph. Units read it through `&RunState`
//! and return a [`RunUpdate`]; the graph folds the update in with
//! [`RunState::merge`] (via [`RunStateUpdater`]) before the next unit runs.
//!
//! Per-field reducers:
//!
//! | field               | reducer                          |
//! |---------------------|----------------------------------|
//! | `messages`          | topic (append in order)          |
//! | `next`              | last value                       |
//! | `execution_plan`    | last value                       |
//! | `current_step`      | last value                       |
//! | `planning_complete` | last value                       |

mod run_state;

pub use run_state::{RunState, RunStateUpdater, RunUpdate};
