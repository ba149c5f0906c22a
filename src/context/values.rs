//! # Type-keyed value map carried by a [`Context`](crate::Context).
//!
//! The key of an entry is its Rust type: callers define a newtype per value
//! (`struct RequestOrigin(String)`) and look it up with `get::<RequestOrigin>()`.
//! Maps are immutable once shared; `with` clones the backing map.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable, cheaply cloneable map from type to value.
#[derive(Clone, Default)]
pub struct Values {
    map: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Values {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this map with `value` inserted (replacing a previous value of the same type).
    pub fn with<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut map = (*self.map).clone();
        map.insert(TypeId::of::<T>(), Arc::new(value));
        Self { map: Arc::new(map) }
    }

    /// Returns a copy of this map extended with every entry of `other`.
    ///
    /// On a type present in both, the entry from `other` wins.
    pub fn merged(&self, other: &Values) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut map = (*self.map).clone();
        map.extend(other.map.iter().map(|(k, v)| (*k, Arc::clone(v))));
        Self { map: Arc::new(map) }
    }

    /// Looks up the value stored for type `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no value is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("len", &self.len()).finish()
    }
}
