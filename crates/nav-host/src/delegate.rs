//! Flow lifecycle adapter
//!
//! [`FlowDelegate`] mirrors the host window's lifecycle callbacks onto a
//! [`Flow`]: each host callback has exactly one corresponding method here
//! and the host is expected to forward all of them.

use std::sync::Arc;

use tracing::{debug, info};

use nav_core::{Direction, Flow, History, HistoryError, StateCodec, TraversalDispatcher};

use crate::instance::{InstanceState, ReentryIntent};
use crate::services::Services;

/// Well-known key for an embedded or persisted history representation
pub const HISTORY_KEY: &str = "nav_flow.history";

/// Errors surfaced by the lifecycle adapter
#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    /// A flow is already installed for this window
    #[error("a navigation flow is already installed for this window")]
    AlreadyInstalled,

    /// A persisted or embedded history could not be restored
    ///
    /// Restore failures are fatal for the session; there is no fallback
    /// to the default history.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Handle carrying a live flow across a destructive-but-same-process
/// lifecycle event (e.g. a configuration change)
pub struct RetainedFlow<S> {
    pub(crate) flow: Flow<S>,
}

/// Builder wiring a delegate's collaborators before installation
///
/// All collaborators are explicit constructor inputs; there is no ambient
/// registry to consult.
pub struct Installer<S> {
    codec: Arc<dyn StateCodec<S>>,
    dispatcher: Arc<dyn TraversalDispatcher<S>>,
    default_history: History<S>,
    persist_filter: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S> Installer<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Start an installation with the required collaborators
    pub fn new(
        codec: Arc<dyn StateCodec<S>>,
        dispatcher: Arc<dyn TraversalDispatcher<S>>,
        default_history: History<S>,
    ) -> Self {
        Self {
            codec,
            dispatcher,
            default_history,
            persist_filter: Arc::new(|_| true),
        }
    }

    /// Predicate deciding which entries survive persistence
    ///
    /// Entries rejected by the filter are dropped permanently across a
    /// save/restore round trip. Defaults to persisting everything.
    pub fn persist_filter(mut self, filter: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        self.persist_filter = Arc::new(filter);
        self
    }

    /// Resolve the authoritative history and install the delegate
    ///
    /// Source precedence, highest first: the re-entry intent's embedded
    /// history, the retained flow handle, the persisted snapshot, the
    /// default history. Exactly one source is used; the rest are
    /// discarded. Malformed embedded or persisted data is a hard error.
    ///
    /// Installation registers the flow in `services` and fails with
    /// [`DelegateError::AlreadyInstalled`] if this window already has one.
    /// The dispatcher is attached immediately, so it must be ready to
    /// receive the bootstrap traversal before this call.
    pub fn install(
        self,
        services: &mut Services,
        retained: Option<RetainedFlow<S>>,
        saved: Option<&InstanceState>,
        intent: Option<&ReentryIntent>,
    ) -> Result<FlowDelegate<S>, DelegateError> {
        let (flow, source) = if let Some(value) = intent.and_then(|i| i.extra(HISTORY_KEY)) {
            let history = History::deserialize(value, self.codec.as_ref())?;
            (Flow::new(history), "re-entry intent")
        } else if let Some(retained) = retained {
            (retained.flow, "retained flow")
        } else if let Some(value) = saved.and_then(|s| s.get(HISTORY_KEY)) {
            let history = History::deserialize(value, self.codec.as_ref())?;
            (Flow::new(history), "saved snapshot")
        } else {
            (Flow::new(self.default_history), "default history")
        };
        info!(source, "navigation history resolved");

        services
            .provide(flow.clone())
            .map_err(|_| DelegateError::AlreadyInstalled)?;

        flow.set_dispatcher(&self.dispatcher);
        Ok(FlowDelegate {
            flow,
            dispatcher: self.dispatcher,
            codec: self.codec,
            persist_filter: self.persist_filter,
            attached: true,
        })
    }
}

/// Lifecycle adapter binding one [`Flow`] to one host window
pub struct FlowDelegate<S> {
    flow: Flow<S>,
    dispatcher: Arc<dyn TraversalDispatcher<S>>,
    codec: Arc<dyn StateCodec<S>>,
    persist_filter: Arc<dyn Fn(&S) -> bool + Send + Sync>,
    attached: bool,
}

impl<S> std::fmt::Debug for FlowDelegate<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDelegate")
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl<S> FlowDelegate<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// The flow this delegate manages
    pub fn flow(&self) -> &Flow<S> {
        &self.flow
    }

    /// Forward an external re-entry trigger
    ///
    /// A history embedded in the trigger replaces the current stack
    /// outright, regardless of its contents (deep-link semantics). A
    /// trigger without one is ignored.
    pub fn on_new_intent(&self, intent: &ReentryIntent) -> Result<(), DelegateError> {
        if let Some(value) = intent.extra(HISTORY_KEY) {
            let history = History::deserialize(value, self.codec.as_ref())?;
            info!(depth = history.len(), "re-entry intent replaces history");
            self.flow.set_history(history, Direction::Replace);
        }
        Ok(())
    }

    /// Host entered the active window
    ///
    /// Attaches the dispatcher unless installation already did; calling
    /// this redundantly never attaches twice.
    pub fn on_resume(&mut self) {
        if !self.attached {
            self.attached = true;
            self.flow.set_dispatcher(&self.dispatcher);
        }
    }

    /// Host left the active window
    ///
    /// Always detaches and clears the attach flag; safe to call
    /// repeatedly. No traversal is delivered while the host is paused.
    pub fn on_pause(&mut self) {
        self.flow.remove_dispatcher(&self.dispatcher);
        self.attached = false;
    }

    /// Hand out the flow for a destructive-but-same-process event
    pub fn on_retain(&self) -> RetainedFlow<S> {
        RetainedFlow {
            flow: self.flow.clone(),
        }
    }

    /// Persist the filtered history into the host's survival payload
    ///
    /// When every entry is rejected by the persistence filter nothing is
    /// written, leaving the payload untouched.
    pub fn on_save_state(&self, out: &mut InstanceState) -> Result<(), DelegateError> {
        match self
            .flow
            .history()
            .serialize(self.codec.as_ref(), &*self.persist_filter)?
        {
            Some(value) => {
                debug!("history snapshot saved");
                out.insert(HISTORY_KEY, value);
            }
            None => debug!("every entry is transient; skipping history snapshot"),
        }
        Ok(())
    }

    /// Host back-navigation request
    ///
    /// False means the stack cannot pop further and the host should apply
    /// its own fallback (typically finishing the window).
    pub fn on_back_pressed(&self) -> bool {
        self.flow.go_back()
    }
}
