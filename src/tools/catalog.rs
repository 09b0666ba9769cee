//! Tool descriptions handed to the calling model.
//!
//! Parameter choices and defaults are read from the typed contract so the
//! text cannot drift from what `ToolRequest` accepts.

use serde_json::{json, Map, Value};

use crate::gdc::{CnvChange, MsiStatus};

/// Server-level guidance sent alongside the tool list.
pub const INSTRUCTIONS: &str = "Use these tools to answer questions about genomic variant statistics \
from data in the GDC. Cases can be queried by project, simple somatic mutation (SSM), copy number \
variant (CNV), and microsatellite instability (MSI). 'Mutation' is ambiguous: both SSMs and CNVs \
can be called mutations, so if a user asks about 'mutations' without saying which, stop and ask. \
Queried case sets are cached server side and referenced by short handles; pass handles between \
tools exactly as returned. Intersection, union, size, and frequency are computed server side from \
handles.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
  Text,
  /// A handle returned by another tool
  Handle,
  CnvChange,
  MsiStatus,
}

impl ParamKind {
  fn choices(self) -> Option<Vec<&'static str>> {
    match self {
      Self::CnvChange => Some(CnvChange::ALL.iter().map(|c| c.as_str()).collect()),
      Self::MsiStatus => Some(MsiStatus::ALL.iter().map(|s| s.as_str()).collect()),
      Self::Text | Self::Handle => None,
    }
  }

  fn default_value(self) -> Option<&'static str> {
    match self {
      Self::MsiStatus => Some(MsiStatus::default().as_str()),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
  pub name: &'static str,
  pub kind: ParamKind,
  pub required: bool,
  pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
  pub name: &'static str,
  pub description: &'static str,
  pub params: &'static [ParamSpec],
}

const fn handle_param(name: &'static str, description: &'static str) -> ParamSpec {
  ParamSpec {
    name,
    kind: ParamKind::Handle,
    required: true,
    description,
  }
}

/// All tools, in the order they are presented.
pub const TOOLS: &[ToolSpec] = &[
  ToolSpec {
    name: "get_cases_by_project",
    description: "Query the GDC for all cases of a project, for example 'TCGA-BRCA'. \
      The case set is cached server side; this tool returns only a handle to it and whether it is empty.",
    params: &[ParamSpec {
      name: "project",
      kind: ParamKind::Text,
      required: true,
      description: "GDC project id, for example 'TCGA-BRCA'.",
    }],
  },
  ToolSpec {
    name: "get_simple_somatic_mutation_occurrences",
    description: "Query the GDC for cases carrying simple somatic mutations (SSMs) in a gene, \
      optionally restricted to one amino acid change. All SSMs producing that change are included. \
      Returns a handle to the cached case set and whether it is empty.",
    params: &[
      ParamSpec {
        name: "gene",
        kind: ParamKind::Text,
        required: true,
        description: "Gene symbol, for example 'BRAF'.",
      },
      ParamSpec {
        name: "aa_change",
        kind: ParamKind::Text,
        required: false,
        description: "Amino acid change in HGVS protein notation without the 'p.' prefix, for example 'V600E'. \
          Omit to match any SSM in the gene.",
      },
    ],
  },
  ToolSpec {
    name: "get_copy_number_variant_occurrences",
    description: "Query the GDC for cases with a copy number variant (CNV) in a gene, optionally \
      restricted to one change type. Returns a handle to the cached case set and whether it is empty.",
    params: &[
      ParamSpec {
        name: "gene",
        kind: ParamKind::Text,
        required: true,
        description: "Gene symbol, for example 'CDKN2A'.",
      },
      ParamSpec {
        name: "cnv_change",
        kind: ParamKind::CnvChange,
        required: false,
        description: "Copy number change type. Omit to match any change in the gene.",
      },
    ],
  },
  ToolSpec {
    name: "get_microsatellite_instability_occurrences",
    description: "Query the GDC for cases by microsatellite status: 'msi' for microsatellite \
      instable, 'mss' for microsatellite stable. Returns a handle to the cached case set and whether it is empty.",
    params: &[ParamSpec {
      name: "msi_status",
      kind: ParamKind::MsiStatus,
      required: false,
      description: "Microsatellite instability status.",
    }],
  },
  ToolSpec {
    name: "compute_case_intersection",
    description: "Intersect two cached case sets (cases in both). The result is cached and returned \
      as a new handle. Chain calls to combine more than two conditions. If a handle is reported \
      invalid, re-run the tool that produced it instead of retrying this call.",
    params: &[
      handle_param("case_set_a", "Handle of the first case set."),
      handle_param("case_set_b", "Handle of the second case set."),
    ],
  },
  ToolSpec {
    name: "compute_case_union",
    description: "Union of two cached case sets (cases in either). The result is cached and returned \
      as a new handle. If a handle is reported invalid, re-run the tool that produced it.",
    params: &[
      handle_param("case_set_a", "Handle of the first case set."),
      handle_param("case_set_b", "Handle of the second case set."),
    ],
  },
  ToolSpec {
    name: "get_case_set_size",
    description: "Number of cases in a cached case set.",
    params: &[handle_param("case_set", "Handle of the case set to count.")],
  },
  ToolSpec {
    name: "compute_frequency",
    description: "Frequency of a condition within a reference population: count = |numerator ∩ denominator|, \
      total = |denominator|, ratio = count / total. Report count and total alongside the percentage. \
      For co-occurrence within a project, intersect the condition handles first and pass the project \
      handle as the denominator. Fails if the denominator is empty.",
    params: &[
      handle_param("numerator", "Handle of the cases satisfying the condition of interest."),
      handle_param("denominator", "Handle of the reference cases, for example a project."),
    ],
  },
];

impl ToolSpec {
  /// Render as a JSON-schema style tool definition.
  pub fn to_json(&self) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in self.params {
      let mut property = json!({
        "type": "string",
        "description": param.description,
      });
      if let Some(choices) = param.kind.choices() {
        property["enum"] = json!(choices);
      }
      if let Some(default) = param.kind.default_value() {
        property["default"] = json!(default);
      }
      properties.insert(param.name.to_string(), property);
      if param.required {
        required.push(param.name);
      }
    }

    json!({
      "name": self.name,
      "description": self.description,
      "input_schema": {
        "type": "object",
        "properties": properties,
        "required": required,
      },
    })
  }
}

/// The full catalog: instructions plus every tool definition.
pub fn catalog_json() -> Value {
  json!({
    "instructions": INSTRUCTIONS,
    "tools": TOOLS.iter().map(ToolSpec::to_json).collect::<Vec<_>>(),
  })
}
