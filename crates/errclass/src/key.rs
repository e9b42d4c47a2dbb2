//! Data keys that namespace metadata stored on classes and errors.
//!
//! A `DataKey` can only be obtained from [`gen_sym`], so two subsystems that
//! attach data to the same error never collide unless they share the key
//! value itself.

use core::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque, process-unique metadata slot identifier.
///
/// Equality is identity of the `gen_sym` call that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataKey {
    id: u64,
}

impl DataKey {
    /// Raw counter value, for diagnostics only.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.id
    }
}

/// Issue a brand new, never-before-seen `DataKey`.
///
/// Safe to call concurrently from any number of threads.
#[inline]
pub fn gen_sym() -> DataKey {
    DataKey {
        id: LAST_ID.fetch_add(1, Ordering::Relaxed) + 1,
    }
}

impl core::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DataKey({})", self.id)
    }
}

// ── Library-reserved keys ─────────────────────────────────────────

pub(crate) static LOG_ON_CREATION: Lazy<DataKey> = Lazy::new(gen_sym);
pub(crate) static CAPTURE_STACK: Lazy<DataKey> = Lazy::new(gen_sym);
pub(crate) static DISABLE_INHERITANCE: Lazy<DataKey> = Lazy::new(gen_sym);
