//! Typed capability registry for one host window
//!
//! Replaces string-keyed service lookup: capabilities are registered and
//! retrieved by their concrete type, so a lookup cannot dynamically miss
//! or return the wrong shape.

use ahash::AHashMap;
use std::any::{Any, TypeId};

/// A capability of this type was provided twice for the same window
#[derive(Debug, thiserror::Error)]
#[error("capability {type_name} is already provided for this window")]
pub struct DuplicateCapability {
    type_name: &'static str,
}

/// Per-window registry mapping capability types to instances
#[derive(Default)]
pub struct Services {
    entries: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Services {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `capability`, failing fast if one of this type exists
    pub fn provide<T: Any + Send + Sync>(
        &mut self,
        capability: T,
    ) -> Result<(), DuplicateCapability> {
        use std::collections::hash_map::Entry;

        match self.entries.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(DuplicateCapability {
                type_name: std::any::type_name::<T>(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(capability));
                Ok(())
            }
        }
    }

    /// Look up a capability by type, if one was provided
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Whether a capability of this type was provided
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}
