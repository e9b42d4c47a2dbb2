/// Create a classified error from a format string.
///
/// # Forms
///
/// ```ignore
/// // Message only
/// err!(*PROGRAMMER_ERROR, "index {} out of range", idx)
///
/// // With per-instance options
/// err!(*INVALID_REQUEST, [set_status_code(400)], "missing field {}", name)
/// ```
#[macro_export]
macro_rules! err {
    // ── With options ──────────────────────────────────────────
    ($class:expr, [ $($opt:expr),* $(,)? ], $($arg:tt)+) => {
        $class.error_with(::std::format!($($arg)+), &[ $($opt),* ])
    };

    // ── Basic ─────────────────────────────────────────────────
    ($class:expr, $($arg:tt)+) => {
        $class.errorf(::std::format_args!($($arg)+))
    };
}

/// Early-return a classified error if a condition is false.
///
/// The error is converted with `Into`, so the enclosing function may return
/// `ClassResult<_>` or `Result<_, BoxError>`.
///
/// ```ignore
/// ensure!(port != 0, *CONFIG_ERROR, "port must be set");
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $class:expr, $($arg:tt)+) => {
        if !$cond {
            return ::std::result::Result::Err($crate::err!($class, $($arg)+).into());
        }
    };
}
