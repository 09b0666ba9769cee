//! Time source for the case-set store.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// The store never reads the system clock directly, so expiry can be driven
/// deterministically in tests.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
  use super::Clock;
  use chrono::{DateTime, Duration, TimeZone, Utc};
  use std::sync::Mutex;

  /// Clock that only moves when told to.
  #[derive(Debug)]
  pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
  }

  impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
      Self {
        now: Mutex::new(start),
      }
    }

    pub fn advance(&self, by: Duration) {
      let mut now = self.now.lock().unwrap();
      *now += by;
    }
  }

  impl Default for ManualClock {
    fn default() -> Self {
      Self::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }
  }

  impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
      *self.now.lock().unwrap()
    }
  }
}
