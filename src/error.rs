//! Error types for the redaction pipeline and its boundary.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while building the pattern registry at startup
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid matching rule for detector '{id}': {source}")]
    InvalidPattern {
        id: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("detector '{0}' is registered more than once")]
    DuplicateDetector(&'static str),

    #[error("detector '{later}' must run before '{earlier}'")]
    OutOfOrder {
        earlier: &'static str,
        later: &'static str,
    },

    #[error("placeholder {placeholder:?} is not allowed: {reason}")]
    InvalidPlaceholder { placeholder: String, reason: String },

    #[error("no detectors enabled")]
    Empty,

    #[error("invalid request schema: {0}")]
    InvalidRequestSchema(String),
}

/// Request rejected before the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("input too large: received {received_length} characters, maximum is {max_length}")]
    InputTooLarge {
        max_length: usize,
        received_length: usize,
    },
}

impl BoundaryError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            BoundaryError::InvalidBody(_) => "INVALID_BODY",
            BoundaryError::InvalidInput(_) => "INVALID_INPUT",
            BoundaryError::InputTooLarge { .. } => "INPUT_TOO_LARGE",
        }
    }

    /// Render into the payload handed back to the caller
    pub fn to_response(&self) -> ErrorResponse {
        let (max_length, received_length) = match self {
            BoundaryError::InputTooLarge {
                max_length,
                received_length,
            } => (Some(*max_length), Some(*received_length)),
            _ => (None, None),
        };

        ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            max_length,
            received_length,
        }
    }
}

/// Serialized form of a [`BoundaryError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_length: Option<usize>,
}

/// Errors loading or converting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown PII type: {0}")]
    UnknownType(String),

    #[error("max input length must be greater than zero")]
    ZeroMaxLength,
}

/// Per-file failures in batch mode
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rejected(#[from] BoundaryError),

    #[error("output {path} is already written for {first}")]
    OutputConflict { path: PathBuf, first: PathBuf },

    #[error("redaction task failed: {0}")]
    Task(String),
}
