//! Error kinds surfaced by pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that halt a batch stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("missing expected column `{column}`; available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl PipelineError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of a single model call. Callers decide whether to skip or abort.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("inference server unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("generation request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("inference server returned status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("failed to decode generation response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid inference server URL: {0}")]
    Url(String),
}
