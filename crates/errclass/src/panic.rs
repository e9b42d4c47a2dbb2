//! Panic recovery at an explicit boundary.
//!
//! `catch_panic` runs a closure under `catch_unwind` and turns any panic into
//! a `Panic Error`, which logs on creation. Use it where an uncontrolled
//! fault must not cross, e.g. plugin calls or per-request handlers; it is
//! not a substitute for returning `Result` elsewhere.

use std::any::Any;
use std::panic::{self, UnwindSafe};

use crate::classes::PANIC_ERROR;
use crate::error::{BoxError, Error};
use crate::ClassResult;

/// Convert a panic payload into a classified error.
///
/// An `Error` or boxed error payload is wrapped; string payloads become
/// the message.
pub fn recover(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return PANIC_ERROR.wrap(*err),
        Err(p) => p,
    };
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return PANIC_ERROR.wrap(*err),
        Err(p) => p,
    };
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return PANIC_ERROR.error(*msg);
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return PANIC_ERROR.error(msg.clone());
    }
    PANIC_ERROR.error("panic with non-string payload")
}

/// Run `f`, converting a panic inside it into `Err(Panic Error)`.
pub fn catch_panic<F, T>(f: F) -> ClassResult<T>
where
    F: FnOnce() -> ClassResult<T> + UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(payload) => Err(recover(payload)),
    }
}
