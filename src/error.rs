use thiserror::Error;

use crate::query::Projection;
use crate::views::ViewId;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid JSON file: {0}")]
    MalformedJson(String),

    #[error(
        "Could not detect data type. File must contain {}.",
        .attempted.join(", ")
    )]
    UnrecognizedSchema { attempted: Vec<&'static str> },

    #[error("Please load at least one JSON file")]
    NoDataSubmitted,

    #[error("{projection} is not available on the {view} view")]
    ProjectionMismatch { projection: Projection, view: ViewId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::MalformedJson(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
