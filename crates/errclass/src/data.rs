//! Type-erased metadata attached to error classes and error instances.
//!
//! Values are stored behind `Arc<dyn Any>` and read back through typed
//! accessors that return `None` on a type mismatch instead of panicking.
//! A key may also be stored with an explicit "absent" value, which stops
//! lookups from falling through to an ancestor.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::key::{DataKey, CAPTURE_STACK, DISABLE_INHERITANCE, LOG_ON_CREATION};

/// Shared, type-erased metadata value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// One metadata assignment, applied when a class or error is created.
#[derive(Clone)]
pub struct ErrorOption {
    pub(crate) key: DataKey,
    pub(crate) value: Option<Value>,
}

impl ErrorOption {
    pub fn key(&self) -> DataKey {
        self.key
    }
}

impl core::fmt::Debug for ErrorOption {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErrorOption")
            .field("key", &self.key)
            .field("set", &self.value.is_some())
            .finish()
    }
}

/// Store `value` under `key`.
pub fn set_data<T>(key: DataKey, value: T) -> ErrorOption
where
    T: Any + Send + Sync,
{
    ErrorOption {
        key,
        value: Some(Arc::new(value)),
    }
}

/// Store an explicit "absent" under `key`, hiding any inherited value.
pub fn clear_data(key: DataKey) -> ErrorOption {
    ErrorOption { key, value: None }
}

/// Log the rendered error (with a stack dump) as soon as it is created.
pub fn log_on_creation() -> ErrorOption {
    set_data(*LOG_ON_CREATION, true)
}

pub fn no_log_on_creation() -> ErrorOption {
    set_data(*LOG_ON_CREATION, false)
}

/// Capture a backtrace when an error of this class is created.
pub fn capture_stack() -> ErrorOption {
    set_data(*CAPTURE_STACK, true)
}

pub fn no_capture_stack() -> ErrorOption {
    set_data(*CAPTURE_STACK, false)
}

/// Do not copy any metadata from the parent class (or, on an instance,
/// from the error's class).
pub fn disable_inheritance() -> ErrorOption {
    set_data(*DISABLE_INHERITANCE, true)
}

/// Flat key/value metadata store.
#[derive(Clone, Default)]
pub struct DataMap {
    entries: HashMap<DataKey, Option<Value>>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply options in order; a later option for the same key wins.
    pub(crate) fn from_options(options: &[ErrorOption]) -> Self {
        let mut map = Self::new();
        for option in options {
            map.entries.insert(option.key(), option.value.clone());
        }
        map
    }

    /// Copy every entry of `parent` whose key is not set here.
    pub(crate) fn inherit_from(&mut self, parent: &DataMap) {
        for (key, value) in &parent.entries {
            self.entries.entry(*key).or_insert_with(|| value.clone());
        }
    }

    /// True if the disable-inheritance marker is set.
    pub(crate) fn disables_inheritance(&self) -> bool {
        self.flag(*DISABLE_INHERITANCE).unwrap_or(false)
    }

    /// Remove the disable-inheritance marker, returning whether it was set.
    pub(crate) fn take_disable_inheritance(&mut self) -> bool {
        let disabled = self.disables_inheritance();
        self.entries.remove(&*DISABLE_INHERITANCE);
        disabled
    }

    /// True if `key` has an entry, including an explicit "absent".
    pub fn contains_key(&self, key: DataKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// The stored value, or `None` if unset or explicitly absent.
    pub fn get(&self, key: DataKey) -> Option<&Value> {
        self.entries.get(&key).and_then(|v| v.as_ref())
    }

    /// Typed lookup. A value of another type reads as absent.
    pub fn get_as<T: Any>(&self, key: DataKey) -> Option<&T> {
        self.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub(crate) fn flag(&self, key: DataKey) -> Option<bool> {
        self.get_as::<bool>(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for DataMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}
