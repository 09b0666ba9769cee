//! GDC data source: predicate translation, paged search, and case extraction.

mod api_types;
mod client;
mod queries;
mod source;
mod types;

pub use client::GdcClient;
pub use source::{CaseSource, SourceError};
pub use types::{CnvChange, MsiStatus, Predicate};
