//! Dispatcher capability and its completion token

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::engine::{service_queue, FlowState};
use super::Traversal;
use crate::history::History;

/// External consumer of traversals
///
/// A dispatcher presents each [`Traversal`] (typically by swapping views,
/// possibly animated) and must invoke the paired [`TraversalCallback`]
/// exactly once, eventually, on the same logical thread. A dispatcher that
/// drops the callback without completing it stalls the flow permanently;
/// the core does not detect or recover from that.
pub trait TraversalDispatcher<S>: Send + Sync {
    /// Handle one traversal and signal completion through `callback`
    fn dispatch(&self, traversal: Traversal<S>, callback: TraversalCallback<S>);
}

/// Single-use completion token for one dispatched traversal
///
/// Consuming [`complete`](Self::complete) commits the traversal's
/// destination as the flow's current history and unblocks the next queued
/// request. The token is not `Clone` and `complete` takes it by value, so
/// a second invocation cannot be expressed.
pub struct TraversalCallback<S> {
    state: Arc<Mutex<FlowState<S>>>,
    destination: History<S>,
}

impl<S> std::fmt::Debug for TraversalCallback<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalCallback").finish_non_exhaustive()
    }
}

impl<S> TraversalCallback<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(state: Arc<Mutex<FlowState<S>>>, destination: History<S>) -> Self {
        Self { state, destination }
    }

    /// Mark the dispatched traversal as finished
    ///
    /// Commits the destination history and services the next queued
    /// request, if any and if a dispatcher is still attached.
    pub fn complete(self) {
        {
            let mut state = self.state.lock();
            state.history = self.destination;
            state.in_flight = false;
        }
        debug!("traversal committed");
        service_queue(&self.state);
    }
}
