//! Typed request and response contract for every tool.
//!
//! Responses only ever carry handles and numbers, never case identifiers.

use serde::{Deserialize, Serialize};

use super::error::ToolError;
use crate::cache::Handle;
use crate::gdc::{CnvChange, MsiStatus, Predicate};

/// A tool invocation, e.g. `{"tool": "get_case_set_size", "arguments": {"case_set": "..."}}`.
///
/// Unknown argument names are rejected: a misspelled optional filter would
/// otherwise silently widen the query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
  tag = "tool",
  content = "arguments",
  rename_all = "snake_case",
  deny_unknown_fields
)]
pub enum ToolRequest {
  GetCasesByProject {
    project: String,
  },
  GetSimpleSomaticMutationOccurrences {
    gene: String,
    aa_change: Option<String>,
  },
  GetCopyNumberVariantOccurrences {
    gene: String,
    cnv_change: Option<CnvChange>,
  },
  GetMicrosatelliteInstabilityOccurrences {
    #[serde(default)]
    msi_status: MsiStatus,
  },
  ComputeCaseIntersection {
    case_set_a: Handle,
    case_set_b: Handle,
  },
  ComputeCaseUnion {
    case_set_a: Handle,
    case_set_b: Handle,
  },
  GetCaseSetSize {
    case_set: Handle,
  },
  ComputeFrequency {
    numerator: Handle,
    denominator: Handle,
  },
}

/// Names of all tools, in catalog order.
pub const TOOL_NAMES: [&str; 8] = [
  "get_cases_by_project",
  "get_simple_somatic_mutation_occurrences",
  "get_copy_number_variant_occurrences",
  "get_microsatellite_instability_occurrences",
  "compute_case_intersection",
  "compute_case_union",
  "get_case_set_size",
  "compute_frequency",
];

impl ToolRequest {
  pub fn name(&self) -> &'static str {
    match self {
      Self::GetCasesByProject { .. } => TOOL_NAMES[0],
      Self::GetSimpleSomaticMutationOccurrences { .. } => TOOL_NAMES[1],
      Self::GetCopyNumberVariantOccurrences { .. } => TOOL_NAMES[2],
      Self::GetMicrosatelliteInstabilityOccurrences { .. } => TOOL_NAMES[3],
      Self::ComputeCaseIntersection { .. } => TOOL_NAMES[4],
      Self::ComputeCaseUnion { .. } => TOOL_NAMES[5],
      Self::GetCaseSetSize { .. } => TOOL_NAMES[6],
      Self::ComputeFrequency { .. } => TOOL_NAMES[7],
    }
  }

  /// Parse a request from its JSON form, reporting problems as a tool error.
  pub fn from_json(value: serde_json::Value) -> Result<Self, ToolError> {
    serde_json::from_value(value).map_err(|e| {
      ToolError::InvalidArguments(format!(
        "{}. Valid tools are: {}.",
        e,
        TOOL_NAMES.join(", ")
      ))
    })
  }

  /// The retrieval predicate, for retrieval tools.
  ///
  /// Free-text parameters are trimmed; blank ones are rejected.
  pub fn predicate(&self) -> Result<Option<Predicate>, ToolError> {
    let predicate = match self {
      Self::GetCasesByProject { project } => Predicate::Project {
        project: required("project", project, "'TCGA-BRCA'")?,
      },
      Self::GetSimpleSomaticMutationOccurrences { gene, aa_change } => {
        Predicate::SimpleSomaticMutation {
          gene: required("gene", gene, "'BRAF'")?,
          aa_change: optional(aa_change),
        }
      }
      Self::GetCopyNumberVariantOccurrences { gene, cnv_change } => Predicate::CopyNumberVariant {
        gene: required("gene", gene, "'CDKN2A'")?,
        cnv_change: *cnv_change,
      },
      Self::GetMicrosatelliteInstabilityOccurrences { msi_status } => {
        Predicate::MicrosatelliteInstability {
          msi_status: *msi_status,
        }
      }
      _ => return Ok(None),
    };
    Ok(Some(predicate))
  }
}

fn required(name: &str, value: &str, example: &str) -> Result<String, ToolError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ToolError::InvalidArguments(format!(
      "parameter `{}` must not be empty, for example {}",
      name, example
    )));
  }
  Ok(value.to_string())
}

fn optional(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(String::from)
}

/// Reference to a stored case set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseSetRef {
  pub handle: Handle,
  /// The query succeeded but matched no cases; the handle is still valid
  pub empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseCount {
  pub count: usize,
}

/// `count / total`, with both sample sizes kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frequency {
  /// Cases in both the numerator and the denominator
  pub count: usize,
  /// Cases in the denominator
  pub total: usize,
  pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
  CaseSet(CaseSetRef),
  Count(CaseCount),
  Frequency(Frequency),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
  Ok { result: ToolOutput },
  Error { kind: &'static str, message: String },
}

impl From<ToolError> for ToolResponse {
  fn from(e: ToolError) -> Self {
    Self::Error {
      kind: e.kind(),
      message: e.to_string(),
    }
  }
}

impl From<Result<ToolOutput, ToolError>> for ToolResponse {
  fn from(result: Result<ToolOutput, ToolError>) -> Self {
    match result {
      Ok(result) => Self::Ok { result },
      Err(e) => Self::from(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_ssm_request() {
    let request = ToolRequest::from_json(json!({
      "tool": "get_simple_somatic_mutation_occurrences",
      "arguments": {"gene": "BRAF", "aa_change": "V600E"}
    }))
    .unwrap();
    assert_eq!(
      request,
      ToolRequest::GetSimpleSomaticMutationOccurrences {
        gene: "BRAF".to_string(),
        aa_change: Some("V600E".to_string()),
      }
    );
    assert_eq!(request.name(), "get_simple_somatic_mutation_occurrences");
  }

  #[test]
  fn test_optional_arguments_may_be_omitted() {
    let request = ToolRequest::from_json(json!({
      "tool": "get_copy_number_variant_occurrences",
      "arguments": {"gene": "MYC"}
    }))
    .unwrap();
    assert_eq!(
      request.predicate().unwrap(),
      Some(Predicate::CopyNumberVariant {
        gene: "MYC".to_string(),
        cnv_change: None,
      })
    );

    let request = ToolRequest::from_json(json!({
      "tool": "get_microsatellite_instability_occurrences",
      "arguments": {}
    }))
    .unwrap();
    assert_eq!(
      request.predicate().unwrap(),
      Some(Predicate::MicrosatelliteInstability {
        msi_status: MsiStatus::Msi
      })
    );
  }

  #[test]
  fn test_invalid_cnv_change_is_rejected() {
    let err = ToolRequest::from_json(json!({
      "tool": "get_copy_number_variant_occurrences",
      "arguments": {"gene": "MYC", "cnv_change": "deletion"}
    }))
    .unwrap_err();
    assert_eq!(err.kind(), "invalid_arguments");
  }

  #[test]
  fn test_misspelled_optional_argument_is_rejected() {
    let err = ToolRequest::from_json(json!({
      "tool": "get_simple_somatic_mutation_occurrences",
      "arguments": {"gene": "BRAF", "amino_acid_change": "V600E"}
    }))
    .unwrap_err();
    assert_eq!(err.kind(), "invalid_arguments");
    assert!(err.to_string().contains("amino_acid_change"));

    let err = ToolRequest::from_json(json!({
      "tool": "get_copy_number_variant_occurrences",
      "arguments": {"gene": "MYC", "cnv_changes": "gain"}
    }))
    .unwrap_err();
    assert_eq!(err.kind(), "invalid_arguments");
  }

  #[test]
  fn test_unknown_tool_lists_valid_tools() {
    let err = ToolRequest::from_json(json!({"tool": "get_genes", "arguments": {}})).unwrap_err();
    assert!(err.to_string().contains("compute_case_intersection"));
  }

  #[test]
  fn test_blank_parameters_are_rejected() {
    let request = ToolRequest::GetCasesByProject {
      project: "  ".to_string(),
    };
    assert!(matches!(
      request.predicate(),
      Err(ToolError::InvalidArguments(_))
    ));
  }

  #[test]
  fn test_parameters_are_trimmed() {
    let request = ToolRequest::GetSimpleSomaticMutationOccurrences {
      gene: " KRAS ".to_string(),
      aa_change: Some(" ".to_string()),
    };
    assert_eq!(
      request.predicate().unwrap(),
      Some(Predicate::SimpleSomaticMutation {
        gene: "KRAS".to_string(),
        aa_change: None,
      })
    );
  }

  #[test]
  fn test_combinators_have_no_predicate() {
    let request = ToolRequest::GetCaseSetSize {
      case_set: Handle::from("ssm-0123456789abcdef"),
    };
    assert_eq!(request.predicate().unwrap(), None);
  }

  #[test]
  fn test_response_shapes() {
    let ok = ToolResponse::Ok {
      result: ToolOutput::Frequency(Frequency {
        count: 2,
        total: 4,
        ratio: 0.5,
      }),
    };
    assert_eq!(
      serde_json::to_value(&ok).unwrap(),
      json!({"status": "ok", "result": {"count": 2, "total": 4, "ratio": 0.5}})
    );

    let err = ToolResponse::from(ToolError::InvalidArguments("bad".to_string()));
    assert_eq!(
      serde_json::to_value(&err).unwrap(),
      json!({"status": "error", "kind": "invalid_arguments", "message": "Invalid tool call: bad"})
    );
  }
}
