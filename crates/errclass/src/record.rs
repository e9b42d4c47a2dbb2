//! Exit recording
//!
//! Intermediate frames annotate a classified error on its way up by
//! appending their own call site to its exit list:
//!
//! ```ignore
//! fn load() -> ClassResult<Config> {
//!     parse().map_err(record)
//! }
//! ```
//!
//! Recording never fails and never replaces the error; on failures this
//! library did not produce it does nothing.

use crate::error::{BoxError, Error};
use crate::frame;

/// Append the caller's location to `err`'s exits and return `err`.
#[inline(never)]
pub fn record(err: Error) -> Error {
    err.push_exit(frame::caller(0));
    err
}

/// Like [`record`], but attribute the exit to the frame `depth` levels
/// above the caller. `record_before(err, 0)` is `record(err)`.
#[inline(never)]
pub fn record_before(err: Error, depth: usize) -> Error {
    err.push_exit(frame::caller(depth));
    err
}

/// [`record`] for a boxed failure. Foreign failures come back untouched.
#[inline(never)]
pub fn record_boxed(err: BoxError) -> BoxError {
    if let Some(e) = err.downcast_ref::<Error>() {
        e.push_exit(frame::caller(0));
    }
    err
}

#[inline(never)]
pub fn record_boxed_before(err: BoxError, depth: usize) -> BoxError {
    if let Some(e) = err.downcast_ref::<Error>() {
        e.push_exit(frame::caller(depth));
    }
    err
}
