//! Serde types matching GDC API requests and responses.
//!
//! Only the fields needed to recover case identifiers are modelled; any other
//! field in a hit is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cache::CaseId;

// ============================================================================
// Filters
// ============================================================================

/// GDC filter expression, e.g. `{"op": "in", "content": {"field": ..., "value": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "content", rename_all = "lowercase")]
pub enum Filter {
  In(FieldFilter),
  And(Vec<Filter>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
  pub field: String,
  pub value: Vec<String>,
}

impl Filter {
  pub fn field_in<I, S>(field: &str, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::In(FieldFilter {
      field: field.to_string(),
      value: values.into_iter().map(Into::into).collect(),
    })
  }

  pub fn and(filters: Vec<Filter>) -> Self {
    Self::And(filters)
  }
}

/// Body of a paged search request.
#[derive(Debug, Serialize)]
pub struct ApiSearchRequest<'a> {
  pub filters: &'a Filter,
  pub from: usize,
  pub size: usize,
  /// Comma separated, even for POST requests
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fields: Option<String>,
}

// ============================================================================
// Search response envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiSearchResponse<T> {
  pub data: ApiSearchData<T>,
  #[serde(default)]
  pub warnings: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSearchData<T> {
  #[serde(default = "Vec::new")]
  pub hits: Vec<T>,
  pub pagination: ApiPagination,
}

#[derive(Debug, Deserialize)]
pub struct ApiPagination {
  pub total: usize,
}

// ============================================================================
// Hits
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCaseRef {
  pub case_id: String,
}

/// Hit from the `ssms` endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiSsmHit {
  pub ssm_id: String,
}

/// Hit from the `ssm_occurrences` and `cnv_occurrences` endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiOccurrenceHit {
  pub case: ApiCaseRef,
}

/// Hit from the `cases` endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiCaseHit {
  pub id: String,
}

/// Hit from the `files` endpoint. A file can belong to several cases.
#[derive(Debug, Deserialize)]
pub struct ApiFileHit {
  #[serde(default)]
  pub cases: Vec<ApiCaseRef>,
}

impl ApiOccurrenceHit {
  pub fn into_case_id(self) -> CaseId {
    CaseId::new(self.case.case_id)
  }
}

impl ApiCaseHit {
  pub fn into_case_id(self) -> CaseId {
    CaseId::new(self.id)
  }
}

impl ApiFileHit {
  pub fn into_case_ids(self) -> impl Iterator<Item = CaseId> {
    self.cases.into_iter().map(|c| CaseId::new(c.case_id))
  }
}
