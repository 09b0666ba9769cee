//! The data-source seam between the case-set tools and the GDC.

use async_trait::async_trait;

use super::types::Predicate;
use crate::cache::CaseSet;

/// Failure talking to the external data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  #[error("request to the GDC {endpoint} endpoint timed out")]
  Timeout { endpoint: String },

  #[error("request to the GDC {endpoint} endpoint failed: {source}")]
  Http {
    endpoint: String,
    source: reqwest::Error,
  },

  #[error("the GDC {endpoint} endpoint returned HTTP {status}")]
  Status { endpoint: String, status: u16 },

  #[error("unexpected response from the GDC {endpoint} endpoint: {message}")]
  Malformed { endpoint: String, message: String },
}

impl SourceError {
  /// Whether repeating the identical request could plausibly succeed.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Timeout { .. } | Self::Http { .. } => true,
      Self::Status { status, .. } => *status == 429 || *status >= 500,
      Self::Malformed { .. } => false,
    }
  }
}

/// Anything that can materialize the set of cases matching a predicate.
#[async_trait]
pub trait CaseSource: Send + Sync {
  async fn fetch_cases(&self, predicate: &Predicate) -> Result<CaseSet, SourceError>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transient_classification() {
    let status = |status| SourceError::Status {
      endpoint: "cases".to_string(),
      status,
    };
    assert!(status(503).is_transient());
    assert!(status(429).is_transient());
    assert!(!status(400).is_transient());
    assert!(SourceError::Timeout {
      endpoint: "ssms".to_string()
    }
    .is_transient());
    assert!(!SourceError::Malformed {
      endpoint: "ssms".to_string(),
      message: "missing field `pagination`".to_string(),
    }
    .is_transient());
  }
}
