//! Case identifiers and immutable case sets.

use std::collections::HashSet;
use std::fmt;

/// Opaque identifier of one case record in the GDC (a case UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(String);

impl CaseId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for CaseId {
  fn from(s: &str) -> Self {
    Self::new(s)
  }
}

impl From<String> for CaseId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

/// A set of cases produced by a retrieval or a set operation.
///
/// There are no mutating methods: once built, a set only ever produces new
/// sets through `intersection` and `union`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseSet {
  cases: HashSet<CaseId>,
}

impl CaseSet {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.cases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cases.is_empty()
  }

  pub fn contains(&self, id: &CaseId) -> bool {
    self.cases.contains(id)
  }

  /// Cases present in both sets.
  pub fn intersection(&self, other: &CaseSet) -> CaseSet {
    // Iterate the smaller side
    let (small, large) = if self.len() <= other.len() {
      (self, other)
    } else {
      (other, self)
    };
    small
      .cases
      .iter()
      .filter(|id| large.contains(id))
      .cloned()
      .collect()
  }

  /// Cases present in either set.
  pub fn union(&self, other: &CaseSet) -> CaseSet {
    self.cases.union(&other.cases).cloned().collect()
  }

  /// Number of cases present in both sets, without materializing them.
  pub fn intersection_len(&self, other: &CaseSet) -> usize {
    let (small, large) = if self.len() <= other.len() {
      (self, other)
    } else {
      (other, self)
    };
    small.cases.iter().filter(|id| large.contains(id)).count()
  }
}

impl FromIterator<CaseId> for CaseSet {
  fn from_iter<I: IntoIterator<Item = CaseId>>(iter: I) -> Self {
    Self {
      cases: iter.into_iter().collect(),
    }
  }
}

impl<'a> FromIterator<&'a str> for CaseSet {
  fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
    iter.into_iter().map(CaseId::from).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(ids: &[&str]) -> CaseSet {
    ids.iter().copied().collect()
  }

  #[test]
  fn test_duplicates_collapse() {
    let s = set(&["case1", "case1", "case2"]);
    assert_eq!(s.len(), 2);
  }

  #[test]
  fn test_intersection() {
    let a = set(&["case1", "case2", "case3"]);
    let b = set(&["case2", "case3", "case4"]);
    assert_eq!(a.intersection(&b), set(&["case2", "case3"]));
    assert_eq!(a.intersection_len(&b), 2);
  }

  #[test]
  fn test_union() {
    let a = set(&["case1", "case2"]);
    let b = set(&["case2", "case3"]);
    assert_eq!(a.union(&b), set(&["case1", "case2", "case3"]));
  }

  #[test]
  fn test_intersection_with_empty() {
    let a = set(&["case1"]);
    assert!(a.intersection(&CaseSet::empty()).is_empty());
    assert_eq!(CaseSet::empty().intersection_len(&a), 0);
  }
}
