//! Domain types for GDC case queries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cache::HandleKind;

/// Copy number change category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CnvChange {
  #[serde(rename = "gain")]
  Gain,
  #[serde(rename = "amplification")]
  Amplification,
  #[serde(rename = "heterozygous deletion")]
  HeterozygousDeletion,
  #[serde(rename = "homozygous deletion")]
  HomozygousDeletion,
}

impl CnvChange {
  pub const ALL: [CnvChange; 4] = [
    CnvChange::Gain,
    CnvChange::Amplification,
    CnvChange::HeterozygousDeletion,
    CnvChange::HomozygousDeletion,
  ];

  /// Name used in tool arguments.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Gain => "gain",
      Self::Amplification => "amplification",
      Self::HeterozygousDeletion => "heterozygous deletion",
      Self::HomozygousDeletion => "homozygous deletion",
    }
  }

  /// Value of `cnv.cnv_change_5_category` in the GDC.
  ///
  /// The GDC files heterozygous deletions under `loss`.
  pub fn gdc_category(self) -> &'static str {
    match self {
      Self::HeterozygousDeletion => "loss",
      other => other.as_str(),
    }
  }
}

impl fmt::Display for CnvChange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Microsatellite instability status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MsiStatus {
  /// Microsatellite instable
  #[default]
  Msi,
  /// Microsatellite stable
  Mss,
}

impl MsiStatus {
  pub const ALL: [MsiStatus; 2] = [MsiStatus::Msi, MsiStatus::Mss];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Msi => "msi",
      Self::Mss => "mss",
    }
  }
}

impl fmt::Display for MsiStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A biological condition selecting a set of cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// Cases belonging to a project, e.g. `TCGA-BRCA`
  Project { project: String },
  /// Cases carrying a simple somatic mutation in a gene
  SimpleSomaticMutation {
    gene: String,
    aa_change: Option<String>,
  },
  /// Cases with a copy number variant in a gene
  CopyNumberVariant {
    gene: String,
    cnv_change: Option<CnvChange>,
  },
  /// Cases with the given microsatellite instability status
  MicrosatelliteInstability { msi_status: MsiStatus },
}

impl Predicate {
  pub fn handle_kind(&self) -> HandleKind {
    match self {
      Self::Project { .. } => HandleKind::Project,
      Self::SimpleSomaticMutation { .. } => HandleKind::Ssm,
      Self::CopyNumberVariant { .. } => HandleKind::Cnv,
      Self::MicrosatelliteInstability { .. } => HandleKind::Msi,
    }
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Project { project } => write!(f, "project({})", project),
      Self::SimpleSomaticMutation { gene, aa_change } => match aa_change {
        Some(aa) => write!(f, "ssm(gene={}, aa_change={})", gene, aa),
        None => write!(f, "ssm(gene={})", gene),
      },
      Self::CopyNumberVariant { gene, cnv_change } => match cnv_change {
        Some(change) => write!(f, "cnv(gene={}, cnv_change={})", gene, change),
        None => write!(f, "cnv(gene={})", gene),
      },
      Self::MicrosatelliteInstability { msi_status } => write!(f, "msi({})", msi_status),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cnv_change_names_match_serde() {
    for change in CnvChange::ALL {
      let json = serde_json::to_value(change).unwrap();
      assert_eq!(json, serde_json::Value::from(change.as_str()));
    }
  }

  #[test]
  fn test_heterozygous_deletion_maps_to_loss() {
    assert_eq!(CnvChange::HeterozygousDeletion.gdc_category(), "loss");
    assert_eq!(CnvChange::HomozygousDeletion.gdc_category(), "homozygous deletion");
    assert_eq!(CnvChange::Gain.gdc_category(), "gain");
  }

  #[test]
  fn test_msi_status_parses_lowercase() {
    let status: MsiStatus = serde_json::from_str("\"mss\"").unwrap();
    assert_eq!(status, MsiStatus::Mss);
    assert_eq!(MsiStatus::default(), MsiStatus::Msi);
  }

  #[test]
  fn test_predicate_display() {
    let p = Predicate::SimpleSomaticMutation {
      gene: "BRAF".to_string(),
      aa_change: Some("V600E".to_string()),
    };
    assert_eq!(p.to_string(), "ssm(gene=BRAF, aa_change=V600E)");
    assert_eq!(p.handle_kind(), HandleKind::Ssm);

    let p = Predicate::CopyNumberVariant {
      gene: "CDKN2A".to_string(),
      cnv_change: Some(CnvChange::HomozygousDeletion),
    };
    assert_eq!(p.to_string(), "cnv(gene=CDKN2A, cnv_change=homozygous deletion)");
  }
}
