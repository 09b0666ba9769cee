//! Agent-facing errors.
//!
//! Every message tells the model what to do next, since the error text is the
//! only feedback it gets.

use crate::cache::{Handle, HandleKind, StoreError};
use crate::gdc::{Predicate, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
  /// The handle never existed, was evicted, or expired
  #[error("Case set {handle} was not found in the server side cache, perhaps it expired? {hint}")]
  InvalidHandle { handle: Handle, hint: String },

  #[error("Querying the GDC for {predicate} failed: {message}. {hint}")]
  Upstream {
    predicate: String,
    message: String,
    hint: String,
  },

  #[error(
    "Case set {handle} is empty, so a frequency over it is undefined. \
     Report that no cases match the denominator condition rather than a percentage, \
     or check that the denominator was retrieved with the intended parameters."
  )]
  DivisionUndefined { handle: Handle },

  #[error("Invalid tool call: {0}")]
  InvalidArguments(String),
}

impl ToolError {
  /// Stable machine-readable error kind.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidHandle { .. } => "invalid_handle",
      Self::Upstream { .. } => "upstream_error",
      Self::DivisionUndefined { .. } => "division_undefined",
      Self::InvalidArguments(_) => "invalid_arguments",
    }
  }

  pub fn upstream(predicate: &Predicate, err: &SourceError) -> Self {
    let hint = if err.is_transient() {
      "This looks like a temporary problem with the GDC API; retry the same call."
    } else {
      "Check the parameters (gene symbols like 'BRAF', amino acid changes in HGVS protein \
       notation like 'V600E', project ids like 'TCGA-BRCA') and retry with revised values."
    };
    Self::Upstream {
      predicate: predicate.to_string(),
      message: err.to_string(),
      hint: hint.to_string(),
    }
  }
}

impl From<StoreError> for ToolError {
  fn from(err: StoreError) -> Self {
    // Not found and expired look the same to the agent, keep the detail in the logs
    tracing::debug!(error = %err, "case set lookup failed");
    let handle = err.handle().clone();
    let hint = rerun_hint(&handle);
    Self::InvalidHandle { handle, hint }
  }
}

/// Suggest how to obtain a fresh handle, based on the kind encoded in it.
pub fn rerun_hint(handle: &Handle) -> String {
  let retrieval = |tool: &str, args: &str| {
    format!(
      "Call {} again with the same {} to cache those cases again, then use the new handle.",
      tool, args
    )
  };

  match handle.kind() {
    Some(HandleKind::Project) => retrieval("get_cases_by_project", "project"),
    Some(HandleKind::Ssm) => retrieval(
      "get_simple_somatic_mutation_occurrences",
      "gene and amino acid change",
    ),
    Some(HandleKind::Cnv) => retrieval(
      "get_copy_number_variant_occurrences",
      "gene and copy number change",
    ),
    Some(HandleKind::Msi) => retrieval(
      "get_microsatellite_instability_occurrences",
      "microsatellite instability status",
    ),
    Some(HandleKind::Intersect) => "This handle was computed by compute_case_intersection. \
       Re-run the retrieval tools for its inputs, then compute the intersection again."
      .to_string(),
    Some(HandleKind::Union) => "This handle was computed by compute_case_union. \
       Re-run the retrieval tools for its inputs, then compute the union again."
      .to_string(),
    None => "The handle does not look like one issued by these tools \
       (for example 'ssm-3f9c0a1b2d4e5f60'). Copy handles exactly as returned, \
       or re-run the retrieval tool that produced it."
      .to_string(),
  }
}
