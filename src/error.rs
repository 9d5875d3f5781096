use serde::Serialize;
use thiserror::Error;

use crate::parser::Field;

/// Why a single extraction attempt did not yield a table.
///
/// These never abort a batch; the resolver turns them into fallback steps or a
/// recorded job failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExtractError {
    #[error("source unavailable: {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("incomplete table: {0}")]
    IncompleteTable(String),

    #[error("malformed cell in {field}: {value:?}")]
    MalformedCell { field: Field, value: String },
}

impl ExtractError {
    /// Short stable label, used in progress lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "SourceUnavailable",
            Self::MalformedDocument(_) => "MalformedDocument",
            Self::TableNotFound(_) => "TableNotFound",
            Self::IncompleteTable(_) => "IncompleteTable",
            Self::MalformedCell { .. } => "MalformedCell",
        }
    }
}
