//! Flow engine: owns the current history and serializes transitions
//!
//! All navigation requests funnel through a [`Flow`], which hands them one
//! at a time to the attached [`TraversalDispatcher`] and waits for its
//! [`TraversalCallback`] before servicing the next request.

use crate::history::History;

mod dispatcher;
mod engine;

pub use dispatcher::{TraversalCallback, TraversalDispatcher};
pub use engine::Flow;

/// Semantic kind of a transition
///
/// Consumed by dispatchers to pick presentation (e.g. animation); the flow
/// core itself attaches no meaning beyond labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Navigating to a new screen
    Forward,
    /// Returning to a screen deeper in the stack
    Backward,
    /// Swapping the visible state without stack semantics
    Replace,
}

/// One pending transition between two history snapshots
///
/// Lives only for the duration of a single dispatch; never persisted.
#[derive(Debug, Clone)]
pub struct Traversal<S> {
    /// History before the transition; `None` for a bootstrap dispatch
    /// that renders the current stack to a freshly attached dispatcher
    pub origin: Option<History<S>>,

    /// History the flow will commit once the callback fires
    pub destination: History<S>,

    /// How the dispatcher should present the change
    pub direction: Direction,
}
