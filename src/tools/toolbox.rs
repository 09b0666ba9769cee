//! The set-algebra tools, built on the case-set store and a case source.

use std::sync::Arc;

use super::contract::{CaseCount, CaseSetRef, Frequency, ToolOutput, ToolRequest, ToolResponse};
use super::error::ToolError;
use crate::cache::{CaseSet, CaseSetStore, Handle, HandleKind, Origin};
use crate::gdc::{CaseSource, Predicate};

/// Entry point for every agent-facing operation.
///
/// Cheap to clone; clones share the same store and source.
#[derive(Clone)]
pub struct Toolbox {
  store: Arc<CaseSetStore>,
  source: Arc<dyn CaseSource>,
}

impl Toolbox {
  pub fn new(store: Arc<CaseSetStore>, source: Arc<dyn CaseSource>) -> Self {
    Self { store, source }
  }

  /// Execute a request and render the outcome for the agent.
  pub async fn call(&self, request: ToolRequest) -> ToolResponse {
    let tool = request.name();
    tracing::info!(tool, ?request, "tool call");

    let result = self.dispatch(request).await;
    if let Err(e) = &result {
      tracing::warn!(tool, kind = e.kind(), error = %e, "tool call failed");
    }
    ToolResponse::from(result)
  }

  async fn dispatch(&self, request: ToolRequest) -> Result<ToolOutput, ToolError> {
    if let Some(predicate) = request.predicate()? {
      return self.retrieve(predicate).await.map(ToolOutput::CaseSet);
    }

    match request {
      ToolRequest::ComputeCaseIntersection {
        case_set_a,
        case_set_b,
      } => self
        .intersect(&case_set_a, &case_set_b)
        .map(ToolOutput::CaseSet),
      ToolRequest::ComputeCaseUnion {
        case_set_a,
        case_set_b,
      } => self.union(&case_set_a, &case_set_b).map(ToolOutput::CaseSet),
      ToolRequest::GetCaseSetSize { case_set } => self.size(&case_set).map(ToolOutput::Count),
      ToolRequest::ComputeFrequency {
        numerator,
        denominator,
      } => self
        .frequency(&numerator, &denominator)
        .map(ToolOutput::Frequency),
      other => Err(ToolError::InvalidArguments(format!(
        "{} is not a set operation",
        other.name()
      ))),
    }
  }

  /// Query the source for a predicate and cache the matching cases.
  ///
  /// The store is only touched once the query has finished.
  pub async fn retrieve(&self, predicate: Predicate) -> Result<CaseSetRef, ToolError> {
    let cases = self
      .source
      .fetch_cases(&predicate)
      .await
      .map_err(|e| ToolError::upstream(&predicate, &e))?;

    let size = cases.len();
    let handle = self.store.store(
      cases,
      Origin::new(predicate.handle_kind(), predicate.to_string()),
    );

    tracing::info!(%predicate, %handle, cases = size, "cached case set");
    Ok(CaseSetRef {
      handle,
      empty: size == 0,
    })
  }

  /// Cache `a ∩ b` under a new handle.
  pub fn intersect(&self, a: &Handle, b: &Handle) -> Result<CaseSetRef, ToolError> {
    let (cases_a, cases_b) = (self.store.get(a)?, self.store.get(b)?);
    let origin = Origin::new(HandleKind::Intersect, format!("intersect({}, {})", a, b));
    Ok(self.store_derived(cases_a.intersection(&cases_b), origin))
  }

  /// Cache `a ∪ b` under a new handle.
  pub fn union(&self, a: &Handle, b: &Handle) -> Result<CaseSetRef, ToolError> {
    let (cases_a, cases_b) = (self.store.get(a)?, self.store.get(b)?);
    let origin = Origin::new(HandleKind::Union, format!("union({}, {})", a, b));
    Ok(self.store_derived(cases_a.union(&cases_b), origin))
  }

  pub fn size(&self, handle: &Handle) -> Result<CaseCount, ToolError> {
    let cases = self.store.get(handle)?;
    Ok(CaseCount { count: cases.len() })
  }

  /// `|numerator ∩ denominator| / |denominator|`.
  pub fn frequency(&self, numerator: &Handle, denominator: &Handle) -> Result<Frequency, ToolError> {
    let (num, den) = (self.store.get(numerator)?, self.store.get(denominator)?);
    if den.is_empty() {
      return Err(ToolError::DivisionUndefined {
        handle: denominator.clone(),
      });
    }

    let count = num.intersection_len(&den);
    let total = den.len();
    Ok(Frequency {
      count,
      total,
      ratio: count as f64 / total as f64,
    })
  }

  fn store_derived(&self, cases: CaseSet, origin: Origin) -> CaseSetRef {
    let empty = cases.is_empty();
    let handle = self.store.store(cases, origin);
    CaseSetRef { handle, empty }
  }
}
