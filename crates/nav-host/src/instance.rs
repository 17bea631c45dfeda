//! Lifecycle-survival payloads
//!
//! [`InstanceState`] is the host's save/restore payload (survives process
//! death); [`ReentryIntent`] models an external trigger re-entering the
//! window, optionally carrying a whole replacement history.

use ahash::AHashMap;

use nav_core::{History, HistoryError, StateCodec};

use crate::delegate::HISTORY_KEY;

/// String-keyed payload the host persists across destructive lifecycle
/// events
///
/// An absent key means no prior snapshot; values are portable JSON.
#[derive(Debug, Default, Clone)]
pub struct InstanceState {
    entries: AHashMap<String, serde_json::Value>,
}

impl InstanceState {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.insert(key.into(), value);
    }

    /// Value stored under `key`, if any
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    /// Whether anything is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove and return the value stored under `key`
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.entries.remove(key)
    }
}

/// External trigger re-entering an already-running window
///
/// Extras are optional named values; a history embedded under the
/// well-known key unconditionally replaces the current navigation state.
#[derive(Debug, Default, Clone)]
pub struct ReentryIntent {
    extras: AHashMap<String, serde_json::Value>,
}

impl ReentryIntent {
    /// Create a trigger with no extras
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trigger carrying `history` as its embedded navigation
    /// state
    ///
    /// Every entry is embedded; re-entry payloads are not subject to the
    /// persistence filter.
    pub fn with_history<S: Clone>(
        history: &History<S>,
        codec: &dyn StateCodec<S>,
    ) -> Result<Self, HistoryError> {
        let value = history
            .serialize(codec, &|_| true)?
            .ok_or(HistoryError::Empty)?;
        let mut intent = Self::new();
        intent.insert_extra(HISTORY_KEY, value);
        Ok(intent)
    }

    /// Attach a named extra
    pub fn insert_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extras.insert(key.into(), value);
    }

    /// Named extra, if present
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extras.get(key)
    }
}
