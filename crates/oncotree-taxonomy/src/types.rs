// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for taxonomy reconciliation.
*/

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::ValidationReport;

/// Result type for taxonomy operations
pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Error types for taxonomy operations
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("'{file}': missing header row")]
    MissingHeader { file: String },

    #[error("'{file}': header row missing '{column}' column")]
    MissingColumn { file: String, column: String },

    #[error("'{file}': {}", .errors.join("; "))]
    MalformedSource { file: String, errors: Vec<String> },

    #[error("tree has {0} root nodes, expected 1")]
    RootCount(usize),

    #[error("the following codes have multiple nodes: {}", .0.join(", "))]
    DuplicateCodes(Vec<String>),

    #[error("nodes not reachable from the root: {}", .0.join(", "))]
    UnreachableNodes(Vec<String>),

    #[error("release name '{0}' is not of format 'oncotree_YYYY_MM_DD' or a known symbolic release")]
    InvalidReleaseName(String),

    #[error("mapping file has invalid name: '{0}'")]
    InvalidMappingName(String),

    #[error("mapping file '{file}': {reason}")]
    MalformedMapping { file: String, reason: String },

    #[error("no built tree for release '{0}'")]
    TreeNotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Validation(ValidationReport),
}

impl TaxonomyError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaxonomyError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for TaxonomyError {
    fn from(err: serde_json::Error) -> Self {
        TaxonomyError::Json(err.to_string())
    }
}
