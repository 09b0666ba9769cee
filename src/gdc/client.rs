use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::api_types::{
  ApiCaseHit, ApiFileHit, ApiOccurrenceHit, ApiSearchRequest, ApiSearchResponse, ApiSsmHit,
};
use super::queries::{self, SearchQuery};
use super::source::{CaseSource, SourceError};
use super::types::Predicate;
use crate::cache::CaseSet;
use crate::config::GdcConfig;

/// One page of search hits.
#[derive(Debug)]
pub struct Page<T> {
  pub hits: Vec<T>,
  pub total: usize,
}

/// GDC API client
#[derive(Clone)]
pub struct GdcClient {
  http: reqwest::Client,
  base_url: Url,
  page_size: usize,
}

impl GdcClient {
  pub fn new(config: &GdcConfig) -> Result<Self> {
    let mut base_url = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid GDC API url {}: {}", config.url, e))?;
    // Endpoints are joined relative to the base path
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .gzip(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      page_size: config.page_size.max(1),
    })
  }

  /// Run a search and collect the hits of every page.
  pub async fn search_all<T: DeserializeOwned>(
    &self,
    query: &SearchQuery,
  ) -> Result<Vec<T>, SourceError> {
    let url = self
      .base_url
      .join(query.endpoint)
      .map_err(|e| SourceError::Malformed {
        endpoint: query.endpoint.to_string(),
        message: format!("cannot build url: {}", e),
      })?;

    paginate(self.page_size, |from| self.fetch_page(&url, query, from)).await
  }

  async fn fetch_page<T: DeserializeOwned>(
    &self,
    url: &Url,
    query: &SearchQuery,
    from: usize,
  ) -> Result<Page<T>, SourceError> {
    let endpoint = query.endpoint;
    let body = ApiSearchRequest {
      filters: &query.filter,
      from,
      size: self.page_size,
      fields: query.fields_param(),
    };

    tracing::debug!(endpoint, from, size = self.page_size, "querying GDC");

    let response = self
      .http
      .post(url.clone())
      .json(&body)
      .send()
      .await
      .map_err(|e| request_error(endpoint, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(SourceError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
      });
    }

    let response: ApiSearchResponse<T> = response.json().await.map_err(|e| {
      if e.is_decode() {
        SourceError::Malformed {
          endpoint: endpoint.to_string(),
          message: e.to_string(),
        }
      } else {
        request_error(endpoint, e)
      }
    })?;

    if !response.warnings.is_empty() {
      tracing::warn!(endpoint, warnings = ?response.warnings, "GDC returned warnings");
    }

    Ok(Page {
      hits: response.data.hits,
      total: response.data.pagination.total,
    })
  }

  async fn ssm_cases(&self, gene: &str, aa_change: Option<&str>) -> Result<CaseSet, SourceError> {
    // A single amino acid change may stem from several distinct SSMs
    let ssms: Vec<ApiSsmHit> = self.search_all(&queries::ssms(gene, aa_change)).await?;
    if ssms.is_empty() {
      return Ok(CaseSet::empty());
    }

    let ssm_ids = ssms.into_iter().map(|hit| hit.ssm_id).collect();
    let occurrences: Vec<ApiOccurrenceHit> =
      self.search_all(&queries::ssm_occurrences(ssm_ids)).await?;
    Ok(
      occurrences
        .into_iter()
        .map(ApiOccurrenceHit::into_case_id)
        .collect(),
    )
  }
}

fn request_error(endpoint: &str, e: reqwest::Error) -> SourceError {
  if e.is_timeout() {
    SourceError::Timeout {
      endpoint: endpoint.to_string(),
    }
  } else {
    SourceError::Http {
      endpoint: endpoint.to_string(),
      source: e,
    }
  }
}

/// Drive `fetch_page` with increasing offsets until `total` hits are covered.
pub async fn paginate<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>, SourceError>
where
  F: FnMut(usize) -> Fut,
  Fut: Future<Output = Result<Page<T>, SourceError>>,
{
  let mut all_hits = Vec::new();
  let mut from = 0usize;

  loop {
    let page = fetch_page(from).await?;
    all_hits.extend(page.hits);

    from = from.saturating_add(page_size);
    if from >= page.total {
      break;
    }
  }

  Ok(all_hits)
}

#[async_trait]
impl CaseSource for GdcClient {
  async fn fetch_cases(&self, predicate: &Predicate) -> Result<CaseSet, SourceError> {
    match predicate {
      Predicate::Project { project } => {
        let hits: Vec<ApiCaseHit> = self.search_all(&queries::project_cases(project)).await?;
        Ok(hits.into_iter().map(ApiCaseHit::into_case_id).collect())
      }
      Predicate::SimpleSomaticMutation { gene, aa_change } => {
        self.ssm_cases(gene, aa_change.as_deref()).await
      }
      Predicate::CopyNumberVariant { gene, cnv_change } => {
        let hits: Vec<ApiOccurrenceHit> = self
          .search_all(&queries::cnv_occurrences(gene, *cnv_change))
          .await?;
        Ok(hits.into_iter().map(ApiOccurrenceHit::into_case_id).collect())
      }
      Predicate::MicrosatelliteInstability { msi_status } => {
        let hits: Vec<ApiFileHit> = self.search_all(&queries::msi_files(*msi_status)).await?;
        Ok(hits.into_iter().flat_map(ApiFileHit::into_case_ids).collect())
      }
    }
  }
}
