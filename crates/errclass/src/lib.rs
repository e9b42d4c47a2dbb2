//! # errclass — hierarchical error classes
//!
//! Failures are classified into a tree of [`ErrorClass`]es. Each class
//! carries key/value metadata that its descendants inherit, and every
//! classified [`Error`] remembers where it was created and which call sites
//! it passed through on the way up.
//!
//! ## Design
//!
//! - **Classes** are process-lifetime values (`&'static ErrorClass`), declared
//!   once, usually in a `static` with `once_cell::sync::Lazy`. Membership is
//!   `class.is(ancestor)`: a walk up the parent chain.
//!
//! - **Errors** are cheap handles. Wrapping an error that already belongs to
//!   the class returns the same occurrence, so a failure can be classified at
//!   every layer it crosses without nesting.
//!
//! - **Metadata** is keyed by [`DataKey`]s from [`gen_sym`]. Lookup prefers
//!   per-error values, then the class's flattened inherited table. An
//!   explicit [`clear_data`] stops inheritance for one key,
//!   [`disable_inheritance`] for all of them.
//!
//! - **Foreign failures** (`io::Error`, `AddrParseError`, `nix` errno) are
//!   mapped onto built-in classes by [`classify`], so `IO_ERROR.contains(&e)`
//!   works whether or not `e` ever passed through this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use errclass::{ErrorClass, ClassResult, ResultExt, gen_sym, set_data, record, IO_ERROR};
//! use once_cell::sync::Lazy;
//!
//! static RETRY_AFTER: Lazy<errclass::DataKey> = Lazy::new(gen_sym);
//!
//! static STORAGE_ERROR: Lazy<&'static ErrorClass> =
//!     Lazy::new(|| ErrorClass::new(None, "Storage Error", &[set_data(*RETRY_AFTER, 5u32)]));
//! static DISK_FULL: Lazy<&'static ErrorClass> =
//!     Lazy::new(|| STORAGE_ERROR.child("Disk Full", &[]));
//!
//! fn write_block() -> ClassResult<()> {
//!     Err(DISK_FULL.error("no space left on /data"))
//! }
//!
//! fn flush() -> ClassResult<()> {
//!     write_block().map_err(record)
//! }
//!
//! let err = flush().unwrap_err();
//! assert!(err.is(*STORAGE_ERROR));
//! assert_eq!(err.data::<u32>(*RETRY_AFTER), Some(&5));
//! assert_eq!(err.exits().len(), 1);
//!
//! let io = std::fs::read("/definitely/not/here").wrap_err(*IO_ERROR).unwrap_err();
//! assert!(IO_ERROR.contains(&io));
//! ```
//!
//! ## Modules
//!
//! | Module    | Contents |
//! |-----------|----------|
//! | `class`   | `ErrorClass`, roots, wrapping, membership, registry |
//! | `classes` | Well-known classes (defects, IO, network, OS) |
//! | `error`   | `Error` handle, rendering, queries over any failure |
//! | `data`    | `ErrorOption` constructors and `DataMap` |
//! | `foreign` | Classification of failures from std and nix |
//! | `record`  | Exit recording |
//! | `group`   | `ErrorGroup`, `LoggingErrorGroup`, `Finalizer` |
//! | `panic`   | `catch_panic`, `recover` |
//! | `sink`    | `LogSink` and the creation-log path |
//! | `config`  | Environment-driven limits |
//!
//! ## Configuration
//!
//! | Variable                    | Default | Effect |
//! |-----------------------------|---------|--------|
//! | `ERRCLASS_STACK_LOG_LENGTH` | 4096    | Max bytes of stack dump per creation log |
//! | `ERRCLASS_MAX_STACK_FRAMES` | 256     | Max frames captured per error |

mod key;
mod data;
mod config;
mod frame;
mod sink;
mod error;
mod class;
mod classes;
mod foreign;
mod record;
#[macro_use]
mod macros;
mod convert;
mod panic;
mod group;

// ── Public API ────────────────────────────────────────────────────

pub use key::{gen_sym, DataKey};
pub use data::{
    capture_stack, clear_data, disable_inheritance, log_on_creation, no_capture_stack, no_log_on_creation,
    set_data, DataMap, ErrorOption, Value,
};
pub use config::{config, env_get, set_config, Config};
pub use frame::{Frame, UNKNOWN_FRAME};
pub use sink::{log_with_stack, reset_log_sink, set_log_sink, FacadeSink, LogSink, LOG_TARGET};
pub use error::{as_error, class_of, get_data, message_of, wrapped_of, BoxError, Error, Message};
pub use class::{find_class, new_class, registered_classes, Equivalence, ErrorClass, HIERARCHICAL_ERROR, SYSTEM_ERROR};
pub use classes::{
    LazyClass, ADDR_ERROR, CLOSED_PIPE_ERROR, EOF, ERRNO_ERROR, ERROR_GROUP_ERROR, IO_ERROR, NETWORK_ERROR,
    NET_OP_ERROR, NET_PARSE_ERROR, NOT_IMPLEMENTED_ERROR, PANIC_ERROR, PROGRAMMER_ERROR, SHORT_WRITE_ERROR,
    SYSCALL_ERROR, TIMEOUT_ERROR, WOULD_BLOCK_ERROR,
};
pub use foreign::classify;
pub use record::{record, record_before, record_boxed, record_boxed_before};
pub use convert::ResultExt;
pub use panic::{catch_panic, recover};
pub use group::{finalize_all, ErrorGroup, Finalizer, LoggingErrorGroup};

/// Convenience Result alias.
pub type ClassResult<T> = Result<T, Error>;
