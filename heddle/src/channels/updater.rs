//! State updater: how a node's output is merged into the graph state.
//!
//! Nodes return an update of type `U`, which may differ from the state `S`
//! (e.g. `RunUpdate` for `RunState`, where every field is optional). The compiled
//! graph owns the state and is the only caller of `apply_update`, so merges
//! happen strictly between node runs.
//!
//! ```rust,ignore
//! use heddle::channels::StateUpdater;
//!
//! #[derive(Clone, Debug)]
//! struct Tally { seen: Vec<String>, total: i32 }
//!
//! #[derive(Debug)]
//! struct TallyUpdater;
//!
//! impl StateUpdater<Tally, (String, i32)> for TallyUpdater {
//!     fn apply_update(&self, current: &mut Tally, update: &(String, i32)) {
//!         current.seen.push(update.0.clone());
//!         current.total += update.1;
//!     }
//! }
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// Folds a node update `U` into the current state `S`.
pub trait StateUpdater<S, U = S>: Send + Sync + Debug
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
{
    /// Apply `update` to `current`. Called once after every node execution.
    fn apply_update(&self, current: &mut S, update: &U);
}

/// Replaces the whole state with the node's output.
#[derive(Debug, Clone, Default)]
pub struct ReplaceUpdater;

impl<S> StateUpdater<S, S> for ReplaceUpdater
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn apply_update(&self, current: &mut S, update: &S) {
        *current = update.clone();
    }
}

/// Updater backed by a closure with custom per-field logic.
pub struct FieldBasedUpdater<S, U, F>
where
    F: Fn(&mut S, &U) + Send + Sync + 'static,
{
    updater_fn: F,
    _marker: PhantomData<fn(&mut S, &U)>,
}

impl<S, U, F> Debug for FieldBasedUpdater<S, U, F>
where
    F: Fn(&mut S, &U) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBasedUpdater")
            .field("updater_fn", &"<function>")
            .finish()
    }
}

impl<S, U, F> FieldBasedUpdater<S, U, F>
where
    F: Fn(&mut S, &U) + Send + Sync + 'static,
{
    pub fn new(updater_fn: F) -> Self {
        Self {
            updater_fn,
            _marker: PhantomData,
        }
    }
}

impl<S, U, F> StateUpdater<S, U> for FieldBasedUpdater<S, U, F>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
    F: Fn(&mut S, &U) + Send + Sync + 'static,
{
    fn apply_update(&self, current: &mut S, update: &U) {
        (self.updater_fn)(current, update);
    }
}

/// Type-erased updater stored in graphs.
pub type BoxedStateUpdater<S, U = S> = Arc<dyn StateUpdater<S, U>>;

pub fn boxed_updater<S, U, T>(updater: T) -> BoxedStateUpdater<S, U>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: Clone + Send + Sync + Debug + 'static,
    T: StateUpdater<S, U> + 'static,
{
    Arc::new(updater)
}
