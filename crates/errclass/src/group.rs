//! Error aggregation
//!
//! [`ErrorGroup`] collects failures from independent steps (closing several
//! files, tearing down a set of workers) and folds them into one result.
//! [`LoggingErrorGroup`] logs each failure as it arrives and only reports
//! counts at the end.
//!
//! Both implement [`Finalizer`], so a cleanup path can fold several groups
//! with [`finalize_all`].

use std::fmt;

use crate::classes::ERROR_GROUP_ERROR;
use crate::error::BoxError;
use crate::sink::LOG_TARGET;

/// Anything that can be folded into a single outcome. Finalizing resets the
/// collector.
pub trait Finalizer {
    fn finalize(&mut self) -> Result<(), BoxError>;
}

// ── ErrorGroup ────────────────────────────────────────────────────

/// Collects failures, optionally keeping only the first `limit`.
#[derive(Default)]
pub struct ErrorGroup {
    errors: Vec<BoxError>,
    limit: usize,
    excess: usize,
}

impl ErrorGroup {
    /// An unbounded group.
    pub fn new() -> Self {
        Self::default()
    }

    /// A group that keeps at most `limit` failures and counts the rest.
    /// A limit of zero means unbounded.
    pub fn bounded(limit: usize) -> Self {
        Self {
            errors: Vec::new(),
            limit,
            excess: 0,
        }
    }

    pub fn add<E: Into<BoxError>>(&mut self, err: E) {
        if self.limit > 0 && self.errors.len() == self.limit {
            self.excess += 1;
        } else {
            self.errors.push(err.into());
        }
    }

    /// Add `err` if there is one.
    pub fn add_opt<E: Into<BoxError>>(&mut self, err: Option<E>) {
        if let Some(err) = err {
            self.add(err);
        }
    }

    /// Collect the error side of `result`, handing back the success value.
    pub fn add_result<T, E: Into<BoxError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    /// Number of retained failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures dropped because the group was full.
    pub fn excess(&self) -> usize {
        self.excess
    }

    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }
}

impl Finalizer for ErrorGroup {
    /// - nothing collected: `Ok(())`
    /// - exactly one failure and nothing dropped: that failure, unchanged
    /// - otherwise an `Error Group Error` listing each message on its own
    ///   line, plus `... and N more.` when failures were dropped
    fn finalize(&mut self) -> Result<(), BoxError> {
        let mut errors = std::mem::take(&mut self.errors);
        let excess = std::mem::replace(&mut self.excess, 0);

        if errors.is_empty() {
            return Ok(());
        }
        if errors.len() == 1 && excess == 0 {
            return Err(errors.remove(0));
        }
        let mut lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        if excess > 0 {
            lines.push(format!("... and {} more.", excess));
        }
        Err(Box::new(ERROR_GROUP_ERROR.error(lines.join("\n"))))
    }
}

impl fmt::Debug for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorGroup")
            .field("len", &self.errors.len())
            .field("limit", &self.limit)
            .field("excess", &self.excess)
            .finish()
    }
}

// ── LoggingErrorGroup ─────────────────────────────────────────────

/// Logs each failure at `error` level and keeps only counts.
#[derive(Debug, Clone)]
pub struct LoggingErrorGroup {
    name: String,
    total: usize,
    failed: usize,
}

impl LoggingErrorGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            failed: 0,
        }
    }

    /// Count one attempt; `Some` counts and logs a failure.
    pub fn add_opt<E: fmt::Display>(&mut self, err: Option<E>) {
        self.total += 1;
        if let Some(err) = err {
            ::log::error!(target: LOG_TARGET, "{}: {}", self.name, err);
            self.failed += 1;
        }
    }

    /// Count one failed attempt.
    pub fn add<E: fmt::Display>(&mut self, err: E) {
        self.add_opt(Some(err));
    }

    /// Count one attempt from its outcome, handing back the success value.
    pub fn add_result<T, E: fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => {
                self.add_opt(None::<E>);
                Some(v)
            }
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl Finalizer for LoggingErrorGroup {
    /// `Error Group Error: <name>: <failed> of <total> failed.` if anything
    /// failed.
    fn finalize(&mut self) -> Result<(), BoxError> {
        let total = std::mem::replace(&mut self.total, 0);
        let failed = std::mem::replace(&mut self.failed, 0);
        if failed == 0 {
            return Ok(());
        }
        Err(Box::new(
            ERROR_GROUP_ERROR.errorf(format_args!("{}: {} of {} failed.", self.name, failed, total)),
        ))
    }
}

/// Finalize each collector and fold the outcomes through an [`ErrorGroup`].
pub fn finalize_all(finalizers: &mut [&mut dyn Finalizer]) -> Result<(), BoxError> {
    let mut group = ErrorGroup::new();
    for finalizer in finalizers.iter_mut() {
        if let Err(e) = finalizer.finalize() {
            group.add(e);
        }
    }
    group.finalize()
}
