//! Per-field reducers and state updaters.
//!
//! A graph state is merged field by field. Two strategies cover every field of
//! `RunState`:
//!
//! - [`topic`]: append the update's items after the current ones (message history).
//! - [`last_value`]: take the update when present, otherwise keep the current value.
//!
//! [`StateUpdater`] decides how a node's output is folded into the state the graph
//! carries between nodes. [`ReplaceUpdater`] is the default for graphs whose nodes
//! return full states; [`FieldBasedUpdater`] wraps a closure.

mod updater;

pub use updater::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater, ReplaceUpdater, StateUpdater};

/// Topic reducer: `current ++ update`, preserving order on both sides.
///
/// Appending an empty slice is the identity.
pub fn topic<T: Clone>(current: &[T], update: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(current.len() + update.len());
    out.extend_from_slice(current);
    out.extend_from_slice(update);
    out
}

/// Last-value reducer: the update wins when it carries a value.
pub fn last_value<T: Clone>(current: &T, update: Option<&T>) -> T {
    update.unwrap_or(current).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_appends_in_order() {
        assert_eq!(topic(&[1, 2], &[3]), vec![1, 2, 3]);
        assert_eq!(topic::<i32>(&[], &[]), Vec::<i32>::new());
    }

    /// **Scenario**: Appending nothing leaves the sequence unchanged.
    #[test]
    fn topic_with_empty_update_is_identity() {
        let cur = vec!["a".to_string(), "b".to_string()];
        assert_eq!(topic(&cur, &[]), cur);
    }

    #[test]
    fn last_value_prefers_update() {
        assert_eq!(last_value(&1, Some(&2)), 2);
        assert_eq!(last_value(&1, None), 1);
    }
}
