//! In-memory case-set store with time-based expiry.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::case_set::CaseSet;
use super::handle::{Handle, HandleKind};
use super::traits::{Clock, SystemClock};

/// Default time-to-live for cached case sets.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Default upper bound on live entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Where a case set came from.
#[derive(Debug, Clone)]
pub struct Origin {
  pub kind: HandleKind,
  /// Human readable description, e.g. `ssm(gene=BRAF, aa_change=V600E)`
  pub description: String,
}

impl Origin {
  pub fn new(kind: HandleKind, description: impl Into<String>) -> Self {
    Self {
      kind,
      description: description.into(),
    }
  }
}

/// A single cached case set.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub handle: Handle,
  pub cases: Arc<CaseSet>,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub origin: String,
}

impl CacheEntry {
  fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }
}

/// Failure to resolve a handle.
///
/// Both variants mean "handle invalid" to a caller; the split only exists
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
  #[error("case set {0} was never issued or has been removed")]
  NotFound(Handle),

  #[error("case set {handle} expired at {expired_at}")]
  Expired {
    handle: Handle,
    expired_at: DateTime<Utc>,
  },
}

impl StoreError {
  pub fn handle(&self) -> &Handle {
    match self {
      Self::NotFound(handle) => handle,
      Self::Expired { handle, .. } => handle,
    }
  }
}

/// Concurrency-safe map from handles to immutable case sets.
///
/// All operations take the lock for the duration of a single map access.
/// Case sets are handed out as `Arc`s so set algebra runs outside the lock.
pub struct CaseSetStore {
  entries: Mutex<HashMap<Handle, CacheEntry>>,
  clock: Arc<dyn Clock>,
  ttl: Duration,
  max_entries: usize,
}

impl CaseSetStore {
  /// Create a store using the system clock and default limits.
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      clock: Arc::new(SystemClock),
      ttl: Duration::seconds(DEFAULT_TTL_SECS),
      max_entries: DEFAULT_MAX_ENTRIES,
    }
  }

  /// Set the default time-to-live used by `store`.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Set the entry count at which old entries start being evicted.
  pub fn with_max_entries(mut self, max_entries: usize) -> Self {
    self.max_entries = max_entries.max(1);
    self
  }

  /// Replace the time source.
  #[allow(dead_code)]
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<Handle, CacheEntry>> {
    // Every critical section leaves the map consistent, so a panic elsewhere
    // does not invalidate it.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Insert a case set with the default TTL.
  pub fn store(&self, cases: CaseSet, origin: Origin) -> Handle {
    self.put(cases, self.ttl, origin)
  }

  /// Insert a case set under a fresh handle that expires after `ttl`.
  pub fn put(&self, cases: CaseSet, ttl: Duration, origin: Origin) -> Handle {
    let now = self.clock.now();
    let size = cases.len();
    let mut pressure_evicted = None;

    let handle = {
      let mut entries = self.lock();

      if entries.len() >= self.max_entries {
        entries.retain(|_, entry| !entry.is_expired(now));
      }
      if entries.len() >= self.max_entries {
        let oldest = entries
          .values()
          .min_by_key(|entry| entry.expires_at)
          .map(|entry| entry.handle.clone());
        if let Some(oldest) = oldest {
          pressure_evicted = entries.remove(&oldest);
        }
      }

      let handle = loop {
        let candidate = Handle::generate(origin.kind);
        if !entries.contains_key(&candidate) {
          break candidate;
        }
      };

      entries.insert(
        handle.clone(),
        CacheEntry {
          handle: handle.clone(),
          cases: Arc::new(cases),
          created_at: now,
          expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
          origin: origin.description,
        },
      );
      handle
    };

    if let Some(evicted) = pressure_evicted {
      tracing::warn!(
        handle = %evicted.handle,
        origin = %evicted.origin,
        created_at = %evicted.created_at,
        "case set store full, evicted entry closest to expiry"
      );
    }
    tracing::debug!(handle = %handle, cases = size, "stored case set");

    handle
  }

  /// Resolve a handle to its case set.
  ///
  /// An expired entry is removed as a side effect.
  pub fn get(&self, handle: &Handle) -> Result<Arc<CaseSet>, StoreError> {
    let now = self.clock.now();
    let mut entries = self.lock();

    let expired_at = match entries.get(handle) {
      None => return Err(StoreError::NotFound(handle.clone())),
      Some(entry) if entry.is_expired(now) => entry.expires_at,
      Some(entry) => return Ok(Arc::clone(&entry.cases)),
    };

    entries.remove(handle);
    Err(StoreError::Expired {
      handle: handle.clone(),
      expired_at,
    })
  }

  /// Remove a handle. Returns whether an entry was present.
  ///
  /// Store API only, no tool exposes explicit removal.
  #[allow(dead_code)]
  pub fn evict(&self, handle: &Handle) -> bool {
    self.lock().remove(handle).is_some()
  }

  /// Remove every expired entry, returning how many were dropped.
  pub fn purge_expired(&self) -> usize {
    let now = self.clock.now();
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
  }

  /// Number of entries currently held, including expired ones not yet purged.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}

impl Default for CaseSetStore {
  fn default() -> Self {
    Self::new()
  }
}
