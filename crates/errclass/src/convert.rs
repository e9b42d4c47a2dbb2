use crate::class::ErrorClass;
use crate::data::ErrorOption;
use crate::error::{BoxError, Error};
use crate::ClassResult;

// ── ResultExt ─────────────────────────────────────────────────────

/// Extension trait for classifying any `Result`'s error during propagation.
///
/// `Ok` values are the "no error" case and pass through untouched.
///
/// ```ignore
/// use errclass::{ResultExt, IO_ERROR};
///
/// let text = std::fs::read_to_string("config.toml").wrap_err(*IO_ERROR)?;
/// ```
pub trait ResultExt<T> {
    fn wrap_err(self, class: &'static ErrorClass) -> ClassResult<T>;

    fn wrap_err_with(self, class: &'static ErrorClass, options: &[ErrorOption]) -> ClassResult<T>;

    fn wrap_err_unless(self, class: &'static ErrorClass, excluded: &[&ErrorClass]) -> ClassResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn wrap_err(self, class: &'static ErrorClass) -> ClassResult<T> {
        self.map_err(|e| class.wrap(e))
    }

    fn wrap_err_with(self, class: &'static ErrorClass, options: &[ErrorOption]) -> ClassResult<T> {
        self.map_err(|e| class.wrap_with(e, options))
    }

    fn wrap_err_unless(self, class: &'static ErrorClass, excluded: &[&ErrorClass]) -> ClassResult<T> {
        self.map_err(|e| class.wrap_unless(e, excluded))
    }
}

// ── Into<io::Error> ───────────────────────────────────────────────

impl From<Error> for std::io::Error {
    /// Carry a classified error through APIs that speak `io::Error`.
    fn from(err: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}
