//! Background purge of expired case sets.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::storage::CaseSetStore;

/// Periodically drop expired entries so memory is reclaimed even when
/// handles are created faster than they are looked up.
///
/// Correctness never depends on this task: lookups expire entries lazily.
pub fn spawn_sweeper(store: Arc<CaseSetStore>, interval: Duration) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
      ticker.tick().await;
      let purged = store.purge_expired();
      if purged > 0 {
        tracing::debug!(purged, remaining = store.len(), "swept expired case sets");
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::case_set::CaseSet;
  use crate::cache::handle::HandleKind;
  use crate::cache::storage::Origin;
  use crate::cache::traits::ManualClock;

  #[tokio::test(start_paused = true)]
  async fn test_sweeper_purges_expired_entries() {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(CaseSetStore::new().with_clock(clock.clone()));
    store.put(
      ["case1"].into_iter().collect::<CaseSet>(),
      chrono::Duration::seconds(1),
      Origin::new(HandleKind::Project, "project(TCGA-TEST)"),
    );
    clock.advance(chrono::Duration::seconds(2));

    let sweeper = spawn_sweeper(Arc::clone(&store), Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert!(store.is_empty());
    sweeper.abort();
  }
}
