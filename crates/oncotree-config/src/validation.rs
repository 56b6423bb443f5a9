// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are usable before any batch run touches the
//! release directories.

use crate::types::{SUPPORTED_LOG_LEVELS, SUPPORTED_MAPPING_EXTENSIONS};
use crate::{ConfigError, ConfigResult, OncotreeConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
    DirectoryConflict { dir1: String, dir2: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::DirectoryConflict { dir1, dir2 } => {
                write!(f, "{} and {} resolve to the same directory", dir1, dir2)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &OncotreeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_paths(config, &mut errors);
    validate_logging(config, &mut errors);
    validate_generation(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_paths(config: &OncotreeConfig, errors: &mut Vec<ConfigValidationError>) {
    let paths = &config.paths;

    if paths.tree_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "paths.tree_dir".to_string(),
        });
    }
    if matches!(&paths.tsv_dir, Some(dir) if dir.as_os_str().is_empty()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "paths.tsv_dir".to_string(),
            reason: "must not be empty when set".to_string(),
        });
    }
    if matches!(&paths.mapping_dir, Some(dir) if dir.as_os_str().is_empty()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "paths.mapping_dir".to_string(),
            reason: "must not be empty when set".to_string(),
        });
    }

    // Legacy mapping files and source tables both use `.txt`
    if paths.mapping_dir() == paths.tsv_dir() {
        errors.push(ConfigValidationError::DirectoryConflict {
            dir1: "paths.tsv_dir".to_string(),
            dir2: "paths.mapping_dir".to_string(),
        });
    }
}

fn validate_logging(config: &OncotreeConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !SUPPORTED_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.level,
                SUPPORTED_LOG_LEVELS.join(", ")
            ),
        });
    }
}

fn validate_generation(config: &OncotreeConfig, errors: &mut Vec<ConfigValidationError>) {
    let extension = config.generation.mapping_extension.as_str();
    if !SUPPORTED_MAPPING_EXTENSIONS.contains(&extension) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "generation.mapping_extension".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                extension,
                SUPPORTED_MAPPING_EXTENSIONS.join(", ")
            ),
        });
    }
}
