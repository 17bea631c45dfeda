//! Immutable navigation history stack
//!
//! A [`History`] is an ordered stack of screen states, most recent last.
//! Every structural operation returns a new snapshot; existing snapshots
//! stay valid and can be read concurrently without locking.

use std::sync::Arc;

use crate::codec::{CodecError, StateCodec};

/// Errors produced by history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A history always keeps at least one entry
    #[error("cannot pop the last history entry")]
    CannotPopLast,

    /// Construction from an empty sequence
    #[error("a history must contain at least one entry")]
    Empty,

    /// A persisted or embedded representation that cannot be restored
    #[error("malformed history representation: {0}")]
    Malformed(String),

    /// A single entry failed to encode or decode
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Immutable stack of screen states, bottom first, top (current) last
///
/// Cloning a `History` is cheap: snapshots share their entries. The stack
/// is never empty once built.
#[derive(Debug)]
pub struct History<S> {
    entries: Arc<Vec<S>>,
}

impl<S> Clone for History<S> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<S: Clone> History<S> {
    /// Create a history containing a single seed state
    pub fn single(seed: S) -> Self {
        Self {
            entries: Arc::new(vec![seed]),
        }
    }

    /// Create a history from an ordered sequence of states, bottom first
    pub fn replace_all(states: Vec<S>) -> Result<Self, HistoryError> {
        if states.is_empty() {
            return Err(HistoryError::Empty);
        }
        Ok(Self {
            entries: Arc::new(states),
        })
    }

    /// The current (top) state
    pub fn top(&self) -> &S {
        // Invariant: entries is never empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Number of entries in the stack
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A history is never empty once built
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate entries from the bottom of the stack to the top
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.entries.iter()
    }

    /// New history with `state` pushed as the new top
    pub fn push(&self, state: S) -> Self {
        let mut entries = self.entries.as_ref().clone();
        entries.push(state);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// New history without the current top
    pub fn pop(&self) -> Result<Self, HistoryError> {
        if self.entries.len() == 1 {
            return Err(HistoryError::CannotPopLast);
        }
        let mut entries = self.entries.as_ref().clone();
        entries.pop();
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    /// New history with the top entry swapped for `state`
    pub fn replace_top(&self, state: S) -> Self {
        let mut entries = self.entries.as_ref().clone();
        let last = entries.len() - 1;
        entries[last] = state;
        Self {
            entries: Arc::new(entries),
        }
    }

    /// New history truncated so that the entry at `index` becomes the top
    pub(crate) fn truncate_to(&self, index: usize) -> Self {
        let entries = self.entries[..=index].to_vec();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Serialize the entries accepted by `filter`, in original order
    ///
    /// Returns `None` when every entry was filtered out; callers must not
    /// persist anything in that case. Filtered entries are permanently
    /// dropped across a persistence round trip.
    pub fn serialize(
        &self,
        codec: &dyn StateCodec<S>,
        filter: &dyn Fn(&S) -> bool,
    ) -> Result<Option<serde_json::Value>, HistoryError> {
        let mut encoded = Vec::with_capacity(self.entries.len());
        for state in self.entries.iter() {
            if filter(state) {
                encoded.push(codec.encode(state)?);
            }
        }
        if encoded.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::Value::Array(encoded)))
    }

    /// Rebuild a history from a portable representation
    ///
    /// Fails on anything other than a non-empty array of decodable
    /// entries. Corrupt input is never masked by a default history.
    pub fn deserialize(
        value: &serde_json::Value,
        codec: &dyn StateCodec<S>,
    ) -> Result<Self, HistoryError> {
        let items = value
            .as_array()
            .ok_or_else(|| HistoryError::Malformed("expected an array of entries".to_string()))?;
        if items.is_empty() {
            return Err(HistoryError::Malformed(
                "history representation holds no entries".to_string(),
            ));
        }
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            entries.push(codec.decode(item)?);
        }
        Ok(Self {
            entries: Arc::new(entries),
        })
    }
}

impl<S: Clone + PartialEq> History<S> {
    /// Whether `state` appears anywhere in the stack
    pub fn contains(&self, state: &S) -> bool {
        self.entries.iter().any(|s| s == state)
    }

    /// Index of the most recent entry equal to `state`, if any
    pub(crate) fn topmost_position(&self, state: &S) -> Option<usize> {
        self.entries.iter().rposition(|s| s == state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SerdeCodec;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Screen {
        name: String,
        transient: bool,
    }

    fn screen(name: &str) -> Screen {
        Screen {
            name: name.to_string(),
            transient: false,
        }
    }

    #[test]
    fn push_grows_and_moves_top() {
        let history = History::single(screen("home"))
            .push(screen("list"))
            .push(screen("detail"));

        assert_eq!(history.len(), 3);
        assert_eq!(history.top(), &screen("detail"));
    }

    #[test]
    fn pop_returns_previous_top() {
        let history = History::single(screen("home")).push(screen("list"));
        let popped = history.pop().unwrap();

        assert_eq!(popped.len(), 1);
        assert_eq!(popped.top(), &screen("home"));
        // The original snapshot is untouched.
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn pop_last_entry_fails() {
        let history = History::single(screen("home"));
        assert!(matches!(history.pop(), Err(HistoryError::CannotPopLast)));
    }

    #[test]
    fn replace_top_keeps_depth() {
        let history = History::single(screen("home")).push(screen("list"));
        let replaced = history.replace_top(screen("grid"));

        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced.top(), &screen("grid"));
    }

    #[test]
    fn replace_all_rejects_empty_input() {
        assert!(matches!(
            History::<Screen>::replace_all(Vec::new()),
            Err(HistoryError::Empty)
        ));
    }

    #[test]
    fn round_trip_preserves_order() {
        let codec = SerdeCodec::new();
        let history = History::single(screen("a"))
            .push(screen("b"))
            .push(screen("c"));

        let value = history
            .serialize(&codec, &|_| true)
            .unwrap()
            .expect("non-empty history serializes");
        let restored = History::deserialize(&value, &codec).unwrap();

        let names: Vec<_> = restored.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn filter_drops_entries_permanently() {
        let codec = SerdeCodec::new();
        let mut middle = screen("b");
        middle.transient = true;
        let history = History::single(screen("a")).push(middle).push(screen("c"));

        let value = history
            .serialize(&codec, &|s: &Screen| !s.transient)
            .unwrap()
            .expect("two entries survive the filter");
        let restored = History::deserialize(&value, &codec).unwrap();

        let names: Vec<_> = restored.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn serialize_everything_filtered_yields_none() {
        let codec = SerdeCodec::new();
        let history = History::single(screen("a"));
        let value = history.serialize(&codec, &|_| false).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn deserialize_rejects_empty_and_malformed() {
        let codec = SerdeCodec::<Screen>::new();

        let empty = serde_json::json!([]);
        assert!(matches!(
            History::deserialize(&empty, &codec),
            Err(HistoryError::Malformed(_))
        ));

        let not_array = serde_json::json!({"name": "home"});
        assert!(matches!(
            History::deserialize(&not_array, &codec),
            Err(HistoryError::Malformed(_))
        ));

        let bad_entry = serde_json::json!([42]);
        assert!(matches!(
            History::deserialize(&bad_entry, &codec),
            Err(HistoryError::Codec(_))
        ));
    }

    #[test]
    fn topmost_position_prefers_recent_duplicate() {
        let history = History::single(screen("a"))
            .push(screen("b"))
            .push(screen("a"))
            .push(screen("c"));

        assert_eq!(history.topmost_position(&screen("a")), Some(2));
        assert_eq!(history.topmost_position(&screen("x")), None);
        assert!(history.contains(&screen("b")));
        assert!(!history.contains(&screen("x")));
    }
}
