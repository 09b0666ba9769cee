//! Translation of predicates into GDC search queries.

use super::api_types::Filter;
use super::types::{CnvChange, MsiStatus};

/// One paged search against a GDC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
  pub endpoint: &'static str,
  pub filter: Filter,
  pub fields: &'static [&'static str],
}

impl SearchQuery {
  pub fn fields_param(&self) -> Option<String> {
    if self.fields.is_empty() {
      None
    } else {
      Some(self.fields.join(","))
    }
  }
}

pub fn project_cases(project: &str) -> SearchQuery {
  SearchQuery {
    endpoint: "cases",
    filter: Filter::field_in("cases.project.project_id", [project]),
    fields: &["project.project_id", "submitter_id"],
  }
}

/// SSMs in a gene, optionally narrowed to one amino acid change.
pub fn ssms(gene: &str, aa_change: Option<&str>) -> SearchQuery {
  let filter = match aa_change {
    // e.g. "BRAF V600E"
    Some(aa) => Filter::field_in("gene_aa_change", [format!("{} {}", gene, aa)]),
    None => Filter::field_in("consequence.transcript.gene.symbol", [gene]),
  };
  SearchQuery {
    endpoint: "ssms",
    filter,
    fields: &["gene_aa_change", "ssm_id"],
  }
}

/// Cases in which any of the given SSMs occur.
pub fn ssm_occurrences(ssm_ids: Vec<String>) -> SearchQuery {
  SearchQuery {
    endpoint: "ssm_occurrences",
    filter: Filter::field_in("ssm.ssm_id", ssm_ids),
    fields: &["ssm.ssm_id", "case.submitter_id", "case.case_id"],
  }
}

pub fn cnv_occurrences(gene: &str, cnv_change: Option<CnvChange>) -> SearchQuery {
  let mut filters = vec![Filter::field_in("cnv.consequence.gene.symbol", [gene])];
  if let Some(change) = cnv_change {
    filters.push(Filter::field_in(
      "cnv.cnv_change_5_category",
      [change.gdc_category()],
    ));
  }
  SearchQuery {
    endpoint: "cnv_occurrences",
    filter: Filter::and(filters),
    fields: &[
      "cnv.cnv_change",
      "cnv.cnv_change_5_category",
      "cnv.consequence.gene.symbol",
      "case.submitter_id",
      "case.case_id",
    ],
  }
}

/// MSI status lives on BAM files, so the query runs against `files` and the
/// caller aggregates back up to cases.
pub fn msi_files(msi_status: MsiStatus) -> SearchQuery {
  SearchQuery {
    endpoint: "files",
    filter: Filter::and(vec![
      Filter::field_in("msi_status", [msi_status.as_str()]),
      Filter::field_in("data_format", ["BAM"]),
    ]),
    fields: &["msi_status", "msi_score", "cases.submitter_id", "cases.case_id"],
  }
}
