//! Call-site frames for backtraces and exit records.
//!
//! Capturing only walks the stack and keeps instruction pointers; symbols
//! are looked up the first time the frames are asked for. Leading frames
//! that belong to the capture machinery itself are dropped at that point so
//! that index 0 is the code that asked for the capture.

use std::ffi::c_void;
use std::fmt;

use once_cell::sync::OnceCell;

/// Rendering of a frame nothing could be resolved for.
pub const UNKNOWN_FRAME: &str = "unknown.unknown:0";

/// Demangled path prefixes of frames that are never the caller of interest.
const INTERNAL: &[&str] = &[
    "backtrace::",
    "_Unwind_",
    concat!(env!("CARGO_CRATE_NAME"), "::frame::"),
    concat!(env!("CARGO_CRATE_NAME"), "::record::"),
    concat!(env!("CARGO_CRATE_NAME"), "::class::"),
    concat!(env!("CARGO_CRATE_NAME"), "::error::"),
    concat!(env!("CARGO_CRATE_NAME"), "::convert::"),
    concat!(env!("CARGO_CRATE_NAME"), "::sink::"),
    concat!(env!("CARGO_CRATE_NAME"), "::panic::"),
    concat!(env!("CARGO_CRATE_NAME"), "::group::"),
    "core::result::Result",
    "core::ops::function::",
];

/// Physical frames walked beyond the configured cap, to cover the
/// internal frames dropped at the top.
const INTERNAL_HEADROOM: usize = 32;

/// One resolved program location.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    function: Option<String>,
    file: Option<String>,
    line: u32,
}

impl Frame {
    /// A frame that renders as [`UNKNOWN_FRAME`].
    pub const fn unknown() -> Self {
        Self {
            function: None,
            file: None,
            line: 0,
        }
    }

    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: Some(function.into()),
            file: Some(file.into()),
            line,
        }
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Base name of the source file.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn is_unknown(&self) -> bool {
        self.function.is_none() && self.file.is_none()
    }

    fn from_symbol(sym: &backtrace::Symbol) -> Self {
        let function = sym
            .name()
            .map(|n| strip_hash(&format!("{:#}", n)).to_string())
            .filter(|n| !n.is_empty());
        let file = sym
            .filename()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string);
        Self {
            function,
            file,
            line: sym.lineno().unwrap_or(0),
        }
    }

    fn is_internal(&self) -> bool {
        self.function.as_deref().map_or(false, is_internal_path)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str(UNKNOWN_FRAME);
        }
        write!(
            f,
            "{}:{}:{}",
            self.function.as_deref().unwrap_or("unknown"),
            self.file.as_deref().unwrap_or("unknown"),
            self.line
        )
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self)
    }
}

/// True if some [`INTERNAL`] prefix starts a path segment of `path`.
///
/// A segment starts at the beginning of the path or right after `<`, `&`,
/// a space or `::`, so `<errclass::class::ErrorClass>::wrap` matches but
/// `my_errclass::class::load` does not.
fn is_internal_path(path: &str) -> bool {
    INTERNAL.iter().any(|prefix| {
        path.match_indices(prefix).any(|(at, _)| {
            let head = &path[..at];
            head.is_empty() || head.ends_with(&['<', '&', ' '][..]) || head.ends_with("::")
        })
    })
}

/// Drop a trailing `::h<16 hex>` symbol hash.
fn strip_hash(name: &str) -> &str {
    match name.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => head,
        _ => name,
    }
}

/// Logical frames at `ip`, innermost inlined call first.
fn symbolize(ip: usize, out: &mut Vec<Frame>) {
    let before = out.len();
    backtrace::resolve(ip as *mut c_void, |sym| out.push(Frame::from_symbol(sym)));
    if out.len() == before {
        out.push(Frame::unknown());
    }
}

/// Instruction pointers captured at some point, resolved on first use.
pub(crate) struct Stack {
    ips: Vec<usize>,
    limit: usize,
    frames: OnceCell<Vec<Frame>>,
}

impl Stack {
    /// Frames from the first non-internal one, at most `limit` of them.
    pub(crate) fn frames(&self) -> &[Frame] {
        self.frames.get_or_init(|| {
            let mut all = Vec::with_capacity(self.ips.len());
            for &ip in &self.ips {
                symbolize(ip, &mut all);
            }
            all.into_iter()
                .skip_while(Frame::is_internal)
                .take(self.limit)
                .collect()
        })
    }

    #[cfg(test)]
    pub(crate) fn is_resolved(&self) -> bool {
        self.frames.get().is_some()
    }
}

/// Walk the current stack without resolving any symbols.
#[inline(never)]
pub(crate) fn capture(limit: usize) -> Stack {
    let max = limit.saturating_add(INTERNAL_HEADROOM);
    let mut ips = Vec::new();
    if limit > 0 {
        backtrace::trace(|f| {
            ips.push(f.ip() as usize);
            ips.len() < max
        });
    }
    Stack {
        ips,
        limit,
        frames: OnceCell::new(),
    }
}

/// The frame `depth` levels above the first non-library frame.
///
/// Symbols are resolved only as far up the stack as needed.
#[inline(never)]
pub(crate) fn caller(depth: usize) -> Frame {
    let mut remaining = depth;
    let mut in_user = false;
    let mut found = None;
    backtrace::trace(|f| {
        let mut logical = Vec::new();
        symbolize(f.ip() as usize, &mut logical);
        for frame in logical {
            in_user = in_user || !frame.is_internal();
            if !in_user {
                continue;
            }
            if remaining == 0 {
                found = Some(frame);
                return false;
            }
            remaining -= 1;
        }
        true
    });
    found.unwrap_or_else(Frame::unknown)
}

/// Render frames one per line.
pub(crate) fn join(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
