//! Host-side lifecycle adapter for the navigation flow
//!
//! Binds a `nav_core::Flow` to a host window's lifecycle: resolving the
//! authoritative history at creation, attaching and detaching the
//! dispatcher around the active window, persisting the stack across
//! destructive lifecycle events, and absorbing external re-entry triggers.

pub mod delegate;
pub mod instance;
pub mod services;

// Re-export commonly used types
pub use delegate::{DelegateError, FlowDelegate, Installer, RetainedFlow, HISTORY_KEY};
pub use instance::{InstanceState, ReentryIntent};
pub use services::{DuplicateCapability, Services};
