// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `oncotree_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the sub-directory holding source tables when `tsv_dir` is unset
pub const DEFAULT_TSV_SUBDIR: &str = "tsv";

/// Name of the sub-directory holding mapping files when `mapping_dir` is unset
pub const DEFAULT_MAPPING_SUBDIR: &str = "mappings";

/// Mapping file extensions the tools know how to read
pub const SUPPORTED_MAPPING_EXTENSIONS: &[&str] = &["tsv", "txt"];

/// Log levels accepted by `logging.level`
pub const SUPPORTED_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OncotreeConfig {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub generation: GenerationConfig,
}

/// Filesystem layout of the release data
///
/// Built trees live directly in `tree_dir`; source tables and mapping files
/// default to sub-directories of it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub tree_dir: PathBuf,
    pub tsv_dir: Option<PathBuf>,
    pub mapping_dir: Option<PathBuf>,
}

impl PathsConfig {
    /// Directory holding one tab-separated source table per release
    pub fn tsv_dir(&self) -> PathBuf {
        self.tsv_dir
            .clone()
            .unwrap_or_else(|| self.tree_dir.join(DEFAULT_TSV_SUBDIR))
    }

    /// Directory holding `<old>_to_<new>` mapping files
    pub fn mapping_dir(&self) -> PathBuf {
        self.mapping_dir
            .clone()
            .unwrap_or_else(|| self.tree_dir.join(DEFAULT_MAPPING_SUBDIR))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tree_dir: PathBuf::from("trees"),
            tsv_dir: None,
            mapping_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines on the console instead of human-readable output
    pub json: bool,
    /// When set, a per-run log folder is created underneath
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

/// Output options for generated files
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Extension used for newly generated mapping files (`tsv`, or legacy `txt`)
    pub mapping_extension: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mapping_extension: "tsv".to_string(),
        }
    }
}
