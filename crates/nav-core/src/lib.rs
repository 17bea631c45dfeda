//! Core navigation-history controller
//!
//! This crate provides the fundamental abstractions for single-window
//! navigation: an immutable history stack of application screens and a
//! flow engine that serializes screen transitions through one dispatcher.

pub mod codec;
pub mod flow;
pub mod history;

// Re-export commonly used types
pub use codec::{CodecError, SerdeCodec, StateCodec};
pub use flow::{
    Direction, Flow, Traversal, TraversalCallback, TraversalDispatcher,
};
pub use history::{History, HistoryError};
