//! Well-known classes.
//!
//! Defect classes log on creation. The remaining classes mirror failures
//! from std and the OS and are what the foreign classifier hands back.

use once_cell::sync::Lazy;

use crate::class::{ErrorClass, SYSTEM_ERROR};
use crate::data::log_on_creation;

/// A class created on first use, for `static` declarations.
pub type LazyClass = Lazy<&'static ErrorClass>;

// ── Defects ───────────────────────────────────────────────────────

pub static NOT_IMPLEMENTED_ERROR: LazyClass =
    Lazy::new(|| ErrorClass::new(None, "Not Implemented Error", &[log_on_creation()]));
pub static PROGRAMMER_ERROR: LazyClass =
    Lazy::new(|| ErrorClass::new(None, "Programmer Error", &[log_on_creation()]));
pub static PANIC_ERROR: LazyClass = Lazy::new(|| ErrorClass::new(None, "Panic Error", &[log_on_creation()]));
pub static ERROR_GROUP_ERROR: LazyClass = Lazy::new(|| ErrorClass::new(None, "Error Group Error", &[]));

// ── OS ────────────────────────────────────────────────────────────

/// `io::Error` carrying a raw OS error code.
pub static SYSCALL_ERROR: LazyClass = Lazy::new(|| SYSTEM_ERROR.child("Syscall Error", &[]));
/// Bare errno values (`nix::errno::Errno` on unix).
pub static ERRNO_ERROR: LazyClass = Lazy::new(|| SYSTEM_ERROR.child("Errno Error", &[]));

// ── Network ───────────────────────────────────────────────────────

pub static NETWORK_ERROR: LazyClass = Lazy::new(|| SYSTEM_ERROR.child("Network Error", &[]));
pub static ADDR_ERROR: LazyClass = Lazy::new(|| NETWORK_ERROR.child("Addr Error", &[]));
pub static NET_OP_ERROR: LazyClass = Lazy::new(|| NETWORK_ERROR.child("Network Op Error", &[]));
pub static NET_PARSE_ERROR: LazyClass = Lazy::new(|| NETWORK_ERROR.child("Network Parse Error", &[]));

// ── IO ────────────────────────────────────────────────────────────

pub static IO_ERROR: LazyClass = Lazy::new(|| SYSTEM_ERROR.child("IO Error", &[]));
pub static EOF: LazyClass = Lazy::new(|| IO_ERROR.child("EOF", &[]));
pub static CLOSED_PIPE_ERROR: LazyClass = Lazy::new(|| IO_ERROR.child("Closed Pipe Error", &[]));
pub static SHORT_WRITE_ERROR: LazyClass = Lazy::new(|| IO_ERROR.child("Short Write Error", &[]));
pub static WOULD_BLOCK_ERROR: LazyClass = Lazy::new(|| IO_ERROR.child("Would Block Error", &[]));
pub static TIMEOUT_ERROR: LazyClass = Lazy::new(|| IO_ERROR.child("Timeout Error", &[]));
