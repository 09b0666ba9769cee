//! Agent-facing case-set tools.
//!
//! Retrieval tools turn a biological predicate into a cached case set and
//! return its handle. Combinators work on handles only. Nothing here ever
//! returns case identifiers to the caller.

mod catalog;
mod contract;
mod error;
mod toolbox;

pub use catalog::catalog_json;
pub use contract::{ToolRequest, ToolResponse};
pub use error::ToolError;
pub use toolbox::Toolbox;
