//! Flow engine implementation

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use super::dispatcher::{TraversalCallback, TraversalDispatcher};
use super::{Direction, Traversal};
use crate::history::History;

/// A navigation request as recorded at arrival time
///
/// Requests are evaluated against the then-current history when they are
/// dispatched, not when they are enqueued, so a queued request always
/// applies on top of every commit that preceded it.
enum Request<S> {
    /// Render the current history to a freshly attached dispatcher
    Bootstrap,
    /// Navigate to a screen, reusing an existing stack position if present
    GoTo(S),
    /// Pop the current top
    GoBack,
    /// Swap the whole stack
    Replace(History<S>, Direction),
}

/// Flow state stored internally
pub(crate) struct FlowState<S> {
    pub(crate) history: History<S>,
    pub(crate) dispatcher: Option<Weak<dyn TraversalDispatcher<S>>>,
    queue: VecDeque<Request<S>>,
    pub(crate) in_flight: bool,
}

/// Owner of the current navigation history
///
/// Guarantees at most one in-flight [`Traversal`] at a time: requests made
/// while one is outstanding (or while no dispatcher is attached) queue in
/// arrival order. Cloning a `Flow` yields another handle to the same
/// engine, which is how a flow survives destructive host events.
pub struct Flow<S> {
    state: Arc<Mutex<FlowState<S>>>,
}

impl<S> Clone for Flow<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S> Flow<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a flow owning `history`
    pub fn new(history: History<S>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlowState {
                history,
                dispatcher: None,
                queue: VecDeque::new(),
                in_flight: false,
            })),
        }
    }

    /// Snapshot of the committed history
    pub fn history(&self) -> History<S> {
        self.state.lock().history.clone()
    }

    /// Attach `dispatcher`, superseding any previous one
    ///
    /// An attach that finds the flow idle (nothing queued, nothing in
    /// flight) dispatches a bootstrap traversal so the dispatcher can
    /// render the current history; this covers both the very first attach
    /// and a re-attach after pause or a window rebuild. If requests queued
    /// up while no dispatcher was attached, the oldest one is dispatched
    /// instead.
    pub fn set_dispatcher(&self, dispatcher: &Arc<dyn TraversalDispatcher<S>>) {
        {
            let mut state = self.state.lock();
            state.dispatcher = Some(Arc::downgrade(dispatcher));
            if state.queue.is_empty() && !state.in_flight {
                state.queue.push_back(Request::Bootstrap);
            }
        }
        debug!("dispatcher attached");
        service_queue(&self.state);
    }

    /// Detach `dispatcher` if it is the one currently attached
    ///
    /// A stale detach (after a superseding `set_dispatcher`) is a no-op,
    /// so pause/teardown races cannot strip a newer dispatcher.
    pub fn remove_dispatcher(&self, dispatcher: &Arc<dyn TraversalDispatcher<S>>) {
        let mut state = self.state.lock();
        let current = match &state.dispatcher {
            Some(weak) => Weak::ptr_eq(weak, &Arc::downgrade(dispatcher)),
            None => false,
        };
        if current {
            state.dispatcher = None;
            debug!("dispatcher detached");
        }
    }

    /// Request navigation to `state`
    ///
    /// If an equal state already sits on the stack the flow pops back to
    /// its most recent occurrence (replacing the top when the occurrence
    /// is the top itself) instead of pushing a duplicate.
    pub fn go_to(&self, state: S) {
        self.state.lock().queue.push_back(Request::GoTo(state));
        service_queue(&self.state);
    }

    /// Request popping the current top
    ///
    /// Returns false, leaving everything untouched, when the committed
    /// stack cannot pop further; the host decides what exhausting the
    /// stack means (usually leaving the application).
    pub fn go_back(&self) -> bool {
        let can_go_back = {
            let mut state = self.state.lock();
            let can_go_back = state.history.len() > 1;
            if can_go_back {
                state.queue.push_back(Request::GoBack);
            }
            can_go_back
        };
        if can_go_back {
            service_queue(&self.state);
        }
        can_go_back
    }

    /// Request wholesale replacement of the stack
    pub fn set_history(&self, history: History<S>, direction: Direction) {
        self.state
            .lock()
            .queue
            .push_back(Request::Replace(history, direction));
        service_queue(&self.state);
    }
}

/// Dispatch the oldest serviceable request, if the flow is idle
///
/// The state lock is never held across the call into the dispatcher, so a
/// dispatcher that completes its callback synchronously re-enters here
/// without deadlocking.
pub(crate) fn service_queue<S>(state: &Arc<Mutex<FlowState<S>>>)
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    loop {
        let (dispatcher, traversal, callback) = {
            let mut locked = state.lock();
            if locked.in_flight {
                return;
            }
            let Some(weak) = locked.dispatcher.clone() else {
                return;
            };
            let Some(dispatcher) = weak.upgrade() else {
                // The dispatcher was dropped without a detach call.
                locked.dispatcher = None;
                return;
            };
            let Some(request) = locked.queue.pop_front() else {
                return;
            };

            let current = locked.history.clone();
            let (origin, destination, direction) = match request {
                Request::Bootstrap => (None, current, Direction::Replace),
                Request::GoBack => match current.pop() {
                    Ok(destination) => (Some(current), destination, Direction::Backward),
                    Err(_) => {
                        // Earlier commits shrank the stack; nothing to pop.
                        debug!("skipping go-back against a one-entry stack");
                        continue;
                    }
                },
                Request::GoTo(target) => match current.topmost_position(&target) {
                    Some(index) if index + 1 == current.len() => {
                        let destination = current.replace_top(target);
                        (Some(current), destination, Direction::Replace)
                    }
                    Some(index) => {
                        let destination = current.truncate_to(index);
                        (Some(current), destination, Direction::Backward)
                    }
                    None => {
                        let destination = current.push(target);
                        (Some(current), destination, Direction::Forward)
                    }
                },
                Request::Replace(history, direction) => (Some(current), history, direction),
            };

            locked.in_flight = true;
            let callback = TraversalCallback::new(Arc::clone(state), destination.clone());
            (
                dispatcher,
                Traversal {
                    origin,
                    destination,
                    direction,
                },
                callback,
            )
        };

        debug!(
            direction = ?traversal.direction,
            depth = traversal.destination.len(),
            "dispatching traversal"
        );
        dispatcher.dispatch(traversal, callback);
        return;
    }
}
