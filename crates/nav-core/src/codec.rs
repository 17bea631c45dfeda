//! Pluggable screen-state codecs
//!
//! The flow core never looks inside a screen state. Persistence and
//! re-entry payloads go through a [`StateCodec`] that turns one state into
//! a portable JSON value and back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Errors produced while encoding or decoding a single screen state
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The state could not be turned into a portable value
    #[error("failed to encode screen state: {0}")]
    Encode(#[source] serde_json::Error),

    /// The portable value could not be turned back into a state
    #[error("failed to decode screen state: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Converts a single screen state to and from a portable representation
///
/// Implementations must be deterministic: a value produced by `encode`
/// must round-trip through `decode`. Decode failures on foreign input are
/// expected and surface as restore errors, never as silent fallbacks.
pub trait StateCodec<S>: Send + Sync {
    /// Encode one state into a portable JSON value
    fn encode(&self, state: &S) -> Result<serde_json::Value, CodecError>;

    /// Decode one state from a portable JSON value
    fn decode(&self, value: &serde_json::Value) -> Result<S, CodecError>;
}

/// Codec for any state type that already implements serde traits
#[derive(Debug, Default)]
pub struct SerdeCodec<S> {
    _phantom: PhantomData<fn() -> S>,
}

impl<S> SerdeCodec<S> {
    /// Create a new serde-backed codec
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<S> StateCodec<S> for SerdeCodec<S>
where
    S: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self, state: &S) -> Result<serde_json::Value, CodecError> {
        serde_json::to_value(state).map_err(CodecError::Encode)
    }

    fn decode(&self, value: &serde_json::Value) -> Result<S, CodecError> {
        serde_json::from_value(value.clone()).map_err(CodecError::Decode)
    }
}
