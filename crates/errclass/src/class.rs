//! Error classes and the wrapping policy.
//!
//! Classes form an immutable tree. Each class owns a flattened copy of its
//! ancestors' metadata, computed once when it is created, so lookups never
//! walk the tree. Classes live for the whole process and are recorded in a
//! grow-only registry.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::data::{self, DataMap, ErrorOption, Value};
use crate::error::{BoxError, Error, Message, SharedError};
use crate::foreign;
use crate::key::DataKey;

/// How far `contains` looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Equivalence {
    /// Only the error's own class.
    #[default]
    Exact,
    /// Also the classes of the failures it wraps, level by level.
    IncludeWrapped,
}

/// A named node in the error class tree.
pub struct ErrorClass {
    parent: Option<&'static ErrorClass>,
    name: String,
    data: DataMap,
}

// ── Roots ─────────────────────────────────────────────────────────

/// Base class for classified foreign failures. No inherited behavior.
pub static SYSTEM_ERROR: Lazy<&'static ErrorClass> =
    Lazy::new(|| ErrorClass::build(None, "System Error".into(), &[]));

/// Default parent of new classes. Captures a backtrace on creation.
pub static HIERARCHICAL_ERROR: Lazy<&'static ErrorClass> =
    Lazy::new(|| ErrorClass::build(None, "Error".into(), &[data::capture_stack()]));

// ── Registry ──────────────────────────────────────────────────────

static REGISTRY: Mutex<Vec<&'static ErrorClass>> = Mutex::new(Vec::new());

fn register(class: &'static ErrorClass) {
    match REGISTRY.lock() {
        Ok(mut reg) => reg.push(class),
        Err(poisoned) => poisoned.into_inner().push(class),
    }
}

/// Snapshot of every class created so far, in creation order.
pub fn registered_classes() -> Vec<&'static ErrorClass> {
    match REGISTRY.lock() {
        Ok(reg) => reg.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// First registered class called `name`.
pub fn find_class(name: &str) -> Option<&'static ErrorClass> {
    registered_classes().into_iter().find(|c| c.name == name)
}

/// Shorthand for `ErrorClass::new(None, name, options)`.
pub fn new_class(name: impl Into<String>, options: &[ErrorOption]) -> &'static ErrorClass {
    ErrorClass::new(None, name, options)
}

// ── Construction and queries ──────────────────────────────────────

impl ErrorClass {
    /// Create a class under `parent` (the hierarchical root when `None`).
    ///
    /// Options apply in order, later ones winning. Parent metadata is then
    /// copied for every key the options left unset, unless
    /// [`disable_inheritance`](crate::disable_inheritance) was among them.
    pub fn new(
        parent: Option<&'static ErrorClass>,
        name: impl Into<String>,
        options: &[ErrorOption],
    ) -> &'static ErrorClass {
        let parent = parent.unwrap_or_else(|| *HIERARCHICAL_ERROR);
        Self::build(Some(parent), name.into(), options)
    }

    fn build(parent: Option<&'static ErrorClass>, name: String, options: &[ErrorOption]) -> &'static ErrorClass {
        let mut data = DataMap::from_options(options);
        if !data.take_disable_inheritance() {
            if let Some(parent) = parent {
                data.inherit_from(&parent.data);
            }
        }
        let class: &'static ErrorClass = Box::leak(Box::new(ErrorClass { parent, name, data }));
        register(class);
        class
    }

    /// Create a subclass of `self`.
    pub fn child(&'static self, name: impl Into<String>, options: &[ErrorOption]) -> &'static ErrorClass {
        Self::new(Some(self), name, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&'static ErrorClass> {
        self.parent
    }

    /// True if `ancestor` is `self` or one of its ancestors. O(depth).
    pub fn is(&self, ancestor: &ErrorClass) -> bool {
        let mut check = Some(self);
        while let Some(class) = check {
            if std::ptr::eq(class, ancestor) {
                return true;
            }
            check = class.parent;
        }
        false
    }

    /// Resolved (inherited) metadata for `key`.
    pub fn get_data(&self, key: DataKey) -> Option<&Value> {
        self.data.get(key)
    }

    /// Typed [`get_data`](Self::get_data); a value of another type reads as absent.
    pub fn data<T: 'static>(&self, key: DataKey) -> Option<&T> {
        self.data.get_as::<T>(key)
    }

    /// True if `err` belongs to this class or a descendant. Foreign
    /// failures are classified through the foreign table first.
    pub fn contains(&self, err: &(dyn StdError + 'static)) -> bool {
        self.contains_with(err, Equivalence::Exact)
    }

    pub fn contains_with(&self, err: &(dyn StdError + 'static), equivalence: Equivalence) -> bool {
        match err.downcast_ref::<Error>() {
            None => foreign::classify(err).is(self),
            Some(e) => {
                if e.class().is(self) {
                    return true;
                }
                equivalence == Equivalence::IncludeWrapped && self.contains_with(e.wrapped(), equivalence)
            }
        }
    }

    /// An absent error has no classification and is never contained.
    pub fn contains_opt(&self, err: Option<&(dyn StdError + 'static)>) -> bool {
        err.map_or(false, |e| self.contains(e))
    }
}

// ── Wrapping ──────────────────────────────────────────────────────

impl ErrorClass {
    /// Classify `err` under this class.
    ///
    /// An error already of this class (or a descendant) is returned as the
    /// same instance.
    pub fn wrap<E>(&'static self, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        self.wrap_inner(err.into(), &[], &[])
    }

    /// Like [`wrap`](Self::wrap) with instance metadata. An error already of
    /// this class gets a fresh occurrence over its underlying failure, so
    /// the original is never changed.
    pub fn wrap_with<E>(&'static self, err: E, options: &[ErrorOption]) -> Error
    where
        E: Into<BoxError>,
    {
        self.wrap_inner(err.into(), &[], options)
    }

    /// Like [`wrap`](Self::wrap), but an error already belonging to any of
    /// `excluded` passes through unchanged.
    pub fn wrap_unless<E>(&'static self, err: E, excluded: &[&ErrorClass]) -> Error
    where
        E: Into<BoxError>,
    {
        self.wrap_inner(err.into(), excluded, &[])
    }

    /// `None` in, `None` out.
    pub fn wrap_opt<E>(&'static self, err: Option<E>) -> Option<Error>
    where
        E: Into<BoxError>,
    {
        err.map(|e| self.wrap(e))
    }

    /// A new error of this class carrying `message`.
    pub fn error(&'static self, message: impl Into<String>) -> Error {
        self.wrap_inner(Box::new(Message(message.into())), &[], &[])
    }

    pub fn error_with(&'static self, message: impl Into<String>, options: &[ErrorOption]) -> Error {
        self.wrap_inner(Box::new(Message(message.into())), &[], options)
    }

    /// A new error of this class with a formatted message; see [`err!`](crate::err).
    pub fn errorf(&'static self, args: fmt::Arguments<'_>) -> Error {
        self.wrap_inner(Box::new(Message(fmt::format(args))), &[], &[])
    }

    #[inline(never)]
    fn wrap_inner(&'static self, err: BoxError, excluded: &[&ErrorClass], options: &[ErrorOption]) -> Error {
        let wrapped: SharedError = match err.downcast::<Error>() {
            Ok(existing) => {
                let existing = *existing;
                if existing.class().is(self) {
                    if options.is_empty() {
                        return existing;
                    }
                    return existing.with_options(options);
                } else if excluded.iter().any(|c| existing.class().is(c)) {
                    return existing;
                } else {
                    Arc::new(existing) as SharedError
                }
            }
            Err(foreign) => SharedError::from(foreign),
        };
        let data = (!options.is_empty()).then(|| DataMap::from_options(options));
        Error::build(self, wrapped, data)
    }
}

impl PartialEq for ErrorClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ErrorClass {}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ErrorClass");
        d.field("name", &self.name);
        if let Some(parent) = self.parent {
            d.field("parent", &parent.name);
        }
        d.field("data", &self.data);
        d.finish()
    }
}
