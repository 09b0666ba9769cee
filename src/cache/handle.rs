//! Opaque handles that stand in for cached case sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation that produced a case set.
///
/// Encoded as the handle prefix so an invalid handle can still be traced back
/// to the tool that has to be re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
  Project,
  Ssm,
  Cnv,
  Msi,
  Intersect,
  Union,
}

impl HandleKind {
  pub const ALL: [HandleKind; 6] = [
    HandleKind::Project,
    HandleKind::Ssm,
    HandleKind::Cnv,
    HandleKind::Msi,
    HandleKind::Intersect,
    HandleKind::Union,
  ];

  pub fn prefix(self) -> &'static str {
    match self {
      Self::Project => "project",
      Self::Ssm => "ssm",
      Self::Cnv => "cnv",
      Self::Msi => "msi",
      Self::Intersect => "intersect",
      Self::Union => "union",
    }
  }

  fn from_prefix(prefix: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.prefix() == prefix)
  }
}

/// Number of hex digits in the random part of a handle (64 bits).
const TOKEN_LEN: usize = 16;

/// Short token referencing a case set held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
  /// Generate a new random handle of the given kind.
  ///
  /// Uniqueness against live handles is enforced by the store, this only
  /// supplies the entropy.
  pub fn generate(kind: HandleKind) -> Self {
    Self(format!("{}-{:016x}", kind.prefix(), random_token()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The kind encoded in the handle, if it looks like one this process issues.
  pub fn kind(&self) -> Option<HandleKind> {
    let (prefix, token) = self.as_str().rsplit_once('-')?;
    let well_formed =
      token.len() == TOKEN_LEN && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !well_formed {
      return None;
    }
    HandleKind::from_prefix(prefix)
  }
}

/// 64 random bits from a v4 uuid, skipping its fixed version and variant bits.
fn random_token() -> u64 {
  let bits = uuid::Uuid::new_v4().as_u128();
  let high = (bits >> 64) as u64;
  let low = bits as u64;
  // Version nibble sits at bits 12..16 of the high half
  let high = ((high >> 16) << 12) | (high & 0x0fff);
  // Variant takes the top two bits of the low half
  (high << 4) | (low & 0xf)
}

impl fmt::Display for Handle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Handle {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<String> for Handle {
  fn from(s: String) -> Self {
    Self(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_generated_handle_format() {
    let h = Handle::generate(HandleKind::Ssm);
    assert!(h.as_str().starts_with("ssm-"));
    assert_eq!(h.as_str().len(), "ssm-".len() + TOKEN_LEN);
    assert_eq!(h.kind(), Some(HandleKind::Ssm));
  }

  #[test]
  fn test_generated_handles_differ() {
    let a = Handle::generate(HandleKind::Project);
    let b = Handle::generate(HandleKind::Project);
    assert_ne!(a, b);
  }

  #[test]
  fn test_every_token_digit_varies() {
    let tokens: Vec<String> = (0..64)
      .map(|_| {
        let h = Handle::generate(HandleKind::Msi);
        h.as_str()["msi-".len()..].to_string()
      })
      .collect();
    for pos in 0..TOKEN_LEN {
      let first = tokens[0].as_bytes()[pos];
      assert!(
        tokens.iter().any(|t| t.as_bytes()[pos] != first),
        "digit {} is constant",
        pos
      );
    }
  }

  #[test]
  fn test_kind_round_trips_for_every_prefix() {
    for kind in HandleKind::ALL {
      assert_eq!(Handle::generate(kind).kind(), Some(kind));
    }
  }

  #[test]
  fn test_kind_rejects_mangled_handles() {
    assert_eq!(Handle::from("ssm-0123").kind(), None);
    assert_eq!(Handle::from("ssm-0123456789ABCDEF").kind(), None);
    assert_eq!(Handle::from("gene-0123456789abcdef").kind(), None);
    assert_eq!(Handle::from("Cases-SSM-BRAF").kind(), None);
    assert_eq!(Handle::from("").kind(), None);
  }

  #[test]
  fn test_serializes_as_plain_string() {
    let h = Handle::from("cnv-0123456789abcdef");
    assert_eq!(
      serde_json::to_string(&h).unwrap(),
      "\"cnv-0123456789abcdef\""
    );
  }
}
