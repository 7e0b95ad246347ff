//! Structured error types for decompose and compose runs.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Configuration errors (abort the run)
    DescriptorNotFound,
    InvalidDescriptor,

    // Per-document errors (skip and continue)
    ParseFailure,
    UnkeyableRecord,

    // Filesystem errors
    ReadFailure,
    WriteFailure,
}

/// Errors raised by the decompose/compose engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown metadata type '{type_id}' (known types: {known})")]
    DescriptorNotFound { type_id: String, known: String },

    #[error("Invalid descriptor '{type_id}': {reason}")]
    InvalidDescriptor { type_id: String, reason: String },

    #[error("Unable to parse XML file {}: {source}", path.display())]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Skipping {tag} element without any of the key fields [{fields}]")]
    UnkeyableRecord { tag: String, fields: String },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn descriptor_not_found<'a>(
        type_id: &str,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::DescriptorNotFound {
            type_id: type_id.to_string(),
            known: known.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    pub fn invalid_descriptor(type_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            type_id: type_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unkeyable(tag: &str, fields: &[String]) -> Self {
        Self::UnkeyableRecord {
            tag: tag.to_string(),
            fields: fields.join(", "),
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailure {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Error::DescriptorNotFound { .. } => ErrorCode::DescriptorNotFound,
            Error::InvalidDescriptor { .. } => ErrorCode::InvalidDescriptor,
            Error::ParseFailure { .. } => ErrorCode::ParseFailure,
            Error::UnkeyableRecord { .. } => ErrorCode::UnkeyableRecord,
            Error::ReadFailure { .. } => ErrorCode::ReadFailure,
            Error::WriteFailure { .. } => ErrorCode::WriteFailure,
        }
    }

    /// Fatal errors abort the whole run; everything else only skips one unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::DescriptorNotFound | ErrorCode::InvalidDescriptor
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
