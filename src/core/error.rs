use thiserror::Error;

use crate::core::query::ReportKind;

/// Errors raised while building, fetching and normalizing a cost report.
#[derive(Error, Debug)]
pub enum CostError {
    /// Report parameters failed validation; nothing was sent.
    #[error("invalid report parameters: {0}")]
    Parameter(String),

    /// No bearer token or subscription id could be resolved.
    #[error("credential error: {0}")]
    Credential(String),

    /// The request never produced a response.
    #[error("cost API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("cost API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A response did not match the row layout of its report kind.
    #[error("{kind} response, row {row}: {reason}")]
    Normalization {
        kind: ReportKind,
        row: usize,
        reason: String,
    },

    /// Endpoint or other setting unusable.
    #[error("config error: {0}")]
    Config(String),
}

impl CostError {
    pub fn normalization(kind: ReportKind, row: usize, reason: impl Into<String>) -> Self {
        Self::Normalization {
            kind,
            row,
            reason: reason.into(),
        }
    }
}
