//! # errclass-http — HTTP responses from error classes
//!
//! Attaches an HTTP status code and an optional user-facing body to error
//! classes through ordinary class metadata, so a handler can turn any
//! failure into a response without matching on its type:
//!
//! ```rust
//! use errclass::ErrorClass;
//! use errclass_http::{error_body, set_status_code, status_code};
//! use once_cell::sync::Lazy;
//!
//! static INVALID_REQUEST: Lazy<&'static ErrorClass> =
//!     Lazy::new(|| ErrorClass::new(None, "Invalid Request", &[set_status_code(400)]));
//!
//! let err = INVALID_REQUEST.error("missing field `name`");
//! assert_eq!(status_code(&err, 500), 400);
//! assert_eq!(error_body(&err), "Invalid Request: missing field `name`");
//! ```
//!
//! Both values are inherited down the class tree and can be overridden per
//! class or per error.

use std::error::Error as StdError;

use errclass::{class_of, clear_data, gen_sym, get_data, message_of, set_data, DataKey, ErrorOption};
use once_cell::sync::Lazy;

static STATUS_CODE: Lazy<DataKey> = Lazy::new(gen_sym);
static ERROR_BODY: Lazy<DataKey> = Lazy::new(gen_sym);

/// Option controlling the HTTP status code of a class or error.
pub fn set_status_code(code: u16) -> ErrorOption {
    set_data(*STATUS_CODE, code)
}

/// Option replacing the user-visible body with a fixed message.
///
/// Use it for classes whose underlying messages must not leak to clients.
pub fn override_error_body(message: impl Into<String>) -> ErrorOption {
    set_data(*ERROR_BODY, message.into())
}

/// Option restoring the default body for a subtree below an override.
pub fn restore_default_error_body() -> ErrorOption {
    clear_data(*ERROR_BODY)
}

/// Status code attached to `err`'s class or instance, else `default`.
///
/// Failures not produced by errclass carry no metadata and always get
/// `default`.
pub fn status_code(err: &(dyn StdError + 'static), default: u16) -> u16 {
    get_data(err, *STATUS_CODE)
        .and_then(|v| v.downcast_ref::<u16>())
        .copied()
        .unwrap_or(default)
}

/// User-visible message for `err`.
///
/// `<class>: <override>` when an override is in effect, otherwise the
/// class-prefixed message without backtrace or exits.
pub fn error_body(err: &(dyn StdError + 'static)) -> String {
    match get_data(err, *ERROR_BODY).and_then(|v| v.downcast_ref::<String>()) {
        Some(body) => format!("{}: {}", class_of(err), body),
        None => message_of(err),
    }
}
