use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::class::{Equivalence, ErrorClass};
use crate::config::config;
use crate::data::{DataMap, ErrorOption, Value};
use crate::foreign;
use crate::frame::{self, Frame, Stack};
use crate::key::{DataKey, CAPTURE_STACK, LOG_ON_CREATION};
use crate::sink;

/// Any failure this library can annotate.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub(crate) type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// An occurrence of some underlying failure, classified by an [`ErrorClass`].
///
/// `Error` is a cheap handle: clones refer to the same occurrence, share its
/// exit list, and compare equal under [`Error::ptr_eq`]. Everything except
/// the exit list is fixed at creation.
#[derive(Clone)]
pub struct Error {
    inner: Arc<Inner>,
}

struct Inner {
    wrapped: SharedError,
    class: &'static ErrorClass,
    stack: Option<Stack>,
    exits: Mutex<Vec<Frame>>,
    data: Option<DataMap>,
}

/// Effective value of `key` for an error of `class` with instance `data`.
fn resolve<'a>(class: &'a ErrorClass, data: Option<&'a DataMap>, key: DataKey) -> Option<&'a Value> {
    if let Some(data) = data {
        if data.contains_key(key) {
            return data.get(key);
        }
        if data.disables_inheritance() {
            return None;
        }
    }
    class.get_data(key)
}

fn resolve_flag(class: &ErrorClass, data: Option<&DataMap>, key: DataKey) -> bool {
    resolve(class, data, key)
        .and_then(|v| v.downcast_ref::<bool>())
        .copied()
        .unwrap_or(false)
}

/// `<class>: <message>`, or an indented block for multi-line messages.
pub(crate) fn with_class_prefix(class: &str, message: &str) -> String {
    let message = message.trim_end_matches(&['\n', ' '][..]);
    if message.contains('\n') {
        format!("{}:\n  {}", class, message.replace('\n', "\n  "))
    } else {
        format!("{}: {}", class, message)
    }
}

impl Error {
    /// Create a new occurrence. Captures the stack and writes the creation
    /// log when the effective flags ask for it.
    #[inline(never)]
    pub(crate) fn build(class: &'static ErrorClass, wrapped: SharedError, data: Option<DataMap>) -> Self {
        let stack = if resolve_flag(class, data.as_ref(), *CAPTURE_STACK) {
            Some(frame::capture(config().max_stack_frames))
        } else {
            None
        };
        let log = resolve_flag(class, data.as_ref(), *LOG_ON_CREATION);

        let err = Self {
            inner: Arc::new(Inner {
                wrapped,
                class,
                stack,
                exits: Mutex::new(Vec::new()),
                data,
            }),
        };
        if log {
            sink::log_with_stack(&err.to_string());
        }
        err
    }

    /// A new occurrence of the same failure and class, with `options`
    /// layered over this one's instance data. Exits recorded so far carry
    /// over; `self` is left as it was.
    pub(crate) fn with_options(&self, options: &[ErrorOption]) -> Self {
        let mut data = DataMap::from_options(options);
        if let Some(prev) = &self.inner.data {
            data.inherit_from(prev);
        }
        let err = Self::build(self.inner.class, self.shared_wrapped(), Some(data));
        let exits = self.exits();
        err.lock_exits().extend(exits);
        err
    }

    /// The class that produced this error.
    #[inline]
    pub fn class(&self) -> &'static ErrorClass {
        self.inner.class
    }

    /// Name of the producing class.
    pub fn name(&self) -> &'static str {
        self.inner.class.name()
    }

    /// The underlying failure this error annotates.
    pub fn wrapped(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner.wrapped
    }

    pub(crate) fn shared_wrapped(&self) -> SharedError {
        Arc::clone(&self.inner.wrapped)
    }

    /// Instance data if present for `key`, else the class's inherited value.
    pub fn get_data(&self, key: DataKey) -> Option<&Value> {
        resolve(self.inner.class, self.inner.data.as_ref(), key)
    }

    /// Typed [`get_data`](Self::get_data); a value of another type reads as absent.
    pub fn data<T: 'static>(&self, key: DataKey) -> Option<&T> {
        self.get_data(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// True if this error's class is `class` or descends from it.
    pub fn is(&self, class: &ErrorClass) -> bool {
        class.contains(self)
    }

    pub fn is_with(&self, class: &ErrorClass, equivalence: Equivalence) -> bool {
        class.contains_with(self, equivalence)
    }

    /// Frames captured at creation; empty if stack capture was off.
    /// Symbols are resolved on the first call.
    pub fn stack(&self) -> &[Frame] {
        match &self.inner.stack {
            Some(stack) => stack.frames(),
            None => &[],
        }
    }

    /// Snapshot of the exit frames recorded so far, oldest first.
    pub fn exits(&self) -> Vec<Frame> {
        self.lock_exits().clone()
    }

    pub(crate) fn push_exit(&self, frame: Frame) {
        self.lock_exits().push(frame);
    }

    fn lock_exits(&self) -> MutexGuard<'_, Vec<Frame>> {
        match self.inner.exits.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Class-prefixed message without backtrace or exits. Nested classified
    /// errors contribute their own message form.
    pub fn message(&self) -> String {
        with_class_prefix(self.name(), &message_of(self.wrapped()))
    }

    /// True if both handles refer to the same occurrence.
    pub fn ptr_eq(a: &Error, b: &Error) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.wrapped())
    }
}

// ── Display ───────────────────────────────────────────────────────

/// `{}` renders the full form with backtrace and exits blocks;
/// `{:#}` renders only [`Error::message`].
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.message());
        }
        let name = self.name();
        f.write_str(&with_class_prefix(name, &self.wrapped().to_string()))?;
        let stack = self.stack();
        if !stack.is_empty() {
            write!(f, "\n\"{}\" backtrace:\n{}", name, frame::join(stack))?;
        }
        let exits = self.lock_exits();
        if !exits.is_empty() {
            write!(f, "\n\"{}\" exits:\n{}", name, frame::join(&exits))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        d.field("class", &self.name());
        d.field("wrapped", &self.wrapped().to_string());
        let stack = self.stack();
        if !stack.is_empty() {
            d.field("stack", &format_args!("<{} frames>", stack.len()));
        }
        let exits = self.lock_exits();
        if !exits.is_empty() {
            d.field("exits", &*exits);
        }
        if let Some(data) = &self.inner.data {
            d.field("data", data);
        }
        d.finish()
    }
}

/// A plain formatted failure, used by `ErrorClass::error` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(pub String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

// ── Queries over arbitrary failures ───────────────────────────────

/// The classified error inside `err`, if `err` is one.
pub fn as_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    err.downcast_ref::<Error>()
}

/// Metadata lookup that degrades to `None` for foreign failures.
pub fn get_data<'a>(err: &'a (dyn StdError + 'static), key: DataKey) -> Option<&'a Value> {
    as_error(err).and_then(|e| e.get_data(key))
}

/// The class of `err`; foreign failures go through the foreign classifier.
pub fn class_of(err: &(dyn StdError + 'static)) -> &'static ErrorClass {
    match as_error(err) {
        Some(e) => e.class(),
        None => foreign::classify(err),
    }
}

pub fn message_of(err: &(dyn StdError + 'static)) -> String {
    match as_error(err) {
        Some(e) => e.message(),
        None => err.to_string(),
    }
}

/// One level of unwrapping; foreign failures are returned as is.
pub fn wrapped_of<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    match as_error(err) {
        Some(e) => e.wrapped(),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{HIERARCHICAL_ERROR, SYSTEM_ERROR};
    use crate::classes::EOF;
    use crate::data::{capture_stack, clear_data, disable_inheritance, no_capture_stack, set_data};
    use crate::key::gen_sym;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn renders_class_and_message() {
        let class = ErrorClass::new(Some(*SYSTEM_ERROR), "Error", &[]);
        let err = class.error("testing");
        assert_eq!(err.to_string(), "Error: testing");
    }

    #[test]
    fn trailing_whitespace_trimmed() {
        let err = SYSTEM_ERROR.error("spaced \n\n");
        assert_eq!(err.to_string(), "System Error: spaced");
    }

    #[test]
    fn multiline_message_indented() {
        let err = SYSTEM_ERROR.error("first\nsecond\n");
        assert_eq!(err.to_string(), "System Error:\n  first\n  second");
    }

    #[test]
    fn backtrace_block_when_captured() {
        let err = HIERARCHICAL_ERROR.error("with stack");
        let s = err.to_string();
        assert!(s.starts_with("Error: with stack"), "{}", s);
        if !err.stack().is_empty() {
            assert!(s.contains("\n\"Error\" backtrace:\n"), "{}", s);
        }
    }

    #[test]
    fn instance_option_overrides_capture() {
        let err = HIERARCHICAL_ERROR.error_with("quiet", &[no_capture_stack()]);
        assert!(err.stack().is_empty());
        assert_eq!(err.to_string(), "Error: quiet");

        let err = SYSTEM_ERROR.error_with("loud", &[capture_stack()]);
        assert_eq!(err.get_data(*CAPTURE_STACK).and_then(|v| v.downcast_ref::<bool>()), Some(&true));
    }

    #[test]
    fn message_skips_blocks() {
        let err = HIERARCHICAL_ERROR.error("plain");
        assert_eq!(err.message(), "Error: plain");
        assert_eq!(format!("{:#}", err), "Error: plain");
    }

    #[test]
    fn nested_message_uses_inner_form() {
        let inner = SYSTEM_ERROR.error("disk full");
        let outer = EOF.wrap(inner);
        assert_eq!(outer.message(), "EOF: System Error: disk full");
    }

    #[test]
    fn source_is_wrapped() {
        let err = SYSTEM_ERROR.wrap(io::Error::new(io::ErrorKind::Other, "raw"));
        let src = err.source().map(|s| s.to_string());
        assert_eq!(src.as_deref(), Some("raw"));
        assert_eq!(wrapped_of(&err).to_string(), "raw");
    }

    #[test]
    fn free_queries_on_foreign() {
        let k = gen_sym();
        let raw = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert!(get_data(&raw, k).is_none());
        assert_eq!(class_of(&raw), *EOF);
        assert_eq!(message_of(&raw), raw.to_string());
        assert!(as_error(&raw).is_none());
    }

    #[test]
    fn instance_data_typed() {
        let k = gen_sym();
        let err = SYSTEM_ERROR.error_with("x", &[set_data(k, 404u16)]);
        assert_eq!(err.data::<u16>(k), Some(&404));
        assert_eq!(err.data::<u32>(k), None);
        assert_eq!(get_data(&err, k).and_then(|v| v.downcast_ref::<u16>()), Some(&404));
    }

    #[test]
    fn instance_disable_inheritance_hides_class_data() {
        let k = gen_sym();
        let own = gen_sym();
        let class = ErrorClass::new(Some(*SYSTEM_ERROR), "Keyed", &[set_data(k, 5u8), no_capture_stack()]);
        assert_eq!(class.error("inherits").data::<u8>(k), Some(&5));

        let err = class.error_with("isolated", &[disable_inheritance(), set_data(own, 1u8)]);
        assert!(err.get_data(k).is_none());
        assert_eq!(err.data::<u8>(own), Some(&1));
    }

    #[test]
    fn instance_clear_hides_one_class_key() {
        let k = gen_sym();
        let other = gen_sym();
        let class = ErrorClass::new(
            Some(*SYSTEM_ERROR),
            "Keyed Clear",
            &[set_data(k, 5u8), set_data(other, 6u8), no_capture_stack()],
        );
        let err = class.error_with("cleared", &[clear_data(k)]);
        assert!(err.get_data(k).is_none());
        assert_eq!(err.data::<u8>(other), Some(&6));
        assert_eq!(class.get_data(k).and_then(|v| v.downcast_ref::<u8>()), Some(&5));
    }

    #[test]
    fn stack_resolved_on_first_read() {
        let err = HIERARCHICAL_ERROR.error("lazy");
        let stack = err.inner.stack.as_ref().map(|s| s.is_resolved());
        assert_eq!(stack, Some(false));
        let _ = err.stack();
        assert_eq!(err.inner.stack.as_ref().map(|s| s.is_resolved()), Some(true));
    }

    #[test]
    fn clones_share_identity() {
        let a = SYSTEM_ERROR.error("same");
        let b = a.clone();
        assert!(Error::ptr_eq(&a, &b));
        let c = SYSTEM_ERROR.error("same");
        assert!(!Error::ptr_eq(&a, &c));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
