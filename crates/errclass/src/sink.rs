//! Logging collaborator
//!
//! Errors whose class asks for log-on-creation are written here exactly once,
//! when they are created. The library only hands over a rendered message and
//! a stack dump; formatting, levels and timestamps belong to the sink.
//!
//! The default sink forwards to the `log` facade under the `errclass`
//! target, so whichever logger the application installs receives it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::config::config;
use crate::frame;

/// `log` target used by the default sink and the logging error group.
pub const LOG_TARGET: &str = "errclass";

/// Destination for "message plus stack dump" writes.
pub trait LogSink: Send + Sync {
    fn log_with_stack(&self, message: &str, stack: &str);
}

/// Default sink: `log::error!` on [`LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn log_with_stack(&self, message: &str, stack: &str) {
        ::log::error!(target: LOG_TARGET, "{}\n{}", message, stack);
    }
}

static SINK: Lazy<RwLock<Arc<dyn LogSink>>> = Lazy::new(|| RwLock::new(Arc::new(FacadeSink)));

/// Install `sink` process-wide, returning the previous one.
pub fn set_log_sink(sink: Arc<dyn LogSink>) -> Arc<dyn LogSink> {
    let mut guard = match SINK.write() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    std::mem::replace(&mut *guard, sink)
}

/// Go back to [`FacadeSink`].
pub fn reset_log_sink() {
    set_log_sink(Arc::new(FacadeSink));
}

fn current_sink() -> Arc<dyn LogSink> {
    match SINK.read() {
        Ok(g) => Arc::clone(&g),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Largest prefix of `s` no longer than `max` bytes, on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Write `message` and the current stack to the installed sink.
///
/// Never fails: a panicking sink is contained here.
pub fn log_with_stack(message: &str) {
    let stack = frame::join(frame::capture(config().max_stack_frames).frames());
    let stack = truncate(&stack, config().stack_log_length);
    let sink = current_sink();
    let _ = panic::catch_unwind(AssertUnwindSafe(|| sink.log_with_stack(message, stack)));
}
