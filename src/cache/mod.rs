//! Handle-indexed cache of case sets.
//!
//! This module provides the storage side of the case-set tools:
//! - Immutable case sets referenced by short random handles
//! - Time-based expiry against an injectable clock
//! - Lazy deletion on lookup, plus an optional background sweep
//! - A bound on entry count with eviction under memory pressure

mod case_set;
mod handle;
mod storage;
mod sweep;
mod traits;

pub use case_set::{CaseId, CaseSet};
pub use handle::{Handle, HandleKind};
pub use storage::{CaseSetStore, Origin, StoreError, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
pub use sweep::spawn_sweeper;
#[cfg(test)]
pub use traits::ManualClock;
