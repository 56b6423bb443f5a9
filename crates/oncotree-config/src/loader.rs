// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, OncotreeConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "oncotree_configuration.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ONCOTREE_CONFIG_PATH";

/// Find the OncoTree configuration file
///
/// Search order:
/// 1. `ONCOTREE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./oncotree_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by {} not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "OncoTree configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OncotreeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: OncotreeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Load configuration, falling back to built-in defaults when no file exists
///
/// An explicit `config_path` that cannot be read is still an error; only a
/// failed search is tolerated. Environment and CLI overrides apply either way.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OncotreeConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }

    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) => {
            let mut config = OncotreeConfig::default();
            apply_environment_overrides(&mut config);
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut config, cli);
            }
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ONCOTREE_TREE_DIR` -> `paths.tree_dir`
/// - `ONCOTREE_TSV_DIR` -> `paths.tsv_dir`
/// - `ONCOTREE_MAPPING_DIR` -> `paths.mapping_dir`
/// - `ONCOTREE_LOG_LEVEL` -> `logging.level`
/// - `ONCOTREE_LOG_JSON` -> `logging.json`
/// - `ONCOTREE_LOG_DIR` -> `logging.log_dir`
/// - `ONCOTREE_MAPPING_EXTENSION` -> `generation.mapping_extension`
pub fn apply_environment_overrides(config: &mut OncotreeConfig) {
    if let Ok(value) = env::var("ONCOTREE_TREE_DIR") {
        config.paths.tree_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("ONCOTREE_TSV_DIR") {
        config.paths.tsv_dir = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("ONCOTREE_MAPPING_DIR") {
        config.paths.mapping_dir = Some(PathBuf::from(value));
    }

    if let Ok(value) = env::var("ONCOTREE_LOG_LEVEL") {
        config.logging.level = value.to_lowercase();
    }
    if let Ok(value) = env::var("ONCOTREE_LOG_JSON") {
        config.logging.json = parse_flag(&value);
    }
    if let Ok(value) = env::var("ONCOTREE_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }

    if let Ok(value) = env::var("ONCOTREE_MAPPING_EXTENSION") {
        config.generation.mapping_extension = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"tree_dir": "/data/trees", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut OncotreeConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("tree_dir") {
        config.paths.tree_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("tsv_dir") {
        config.paths.tsv_dir = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("mapping_dir") {
        config.paths.mapping_dir = Some(PathBuf::from(value));
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.to_lowercase();
    }
    if let Some(value) = cli_args.get("log_json") {
        config.logging.json = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }

    if let Some(value) = cli_args.get("mapping_extension") {
        config.generation.mapping_extension = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("ONCOTREE_TREE_DIR");
        env::remove_var("ONCOTREE_LOG_LEVEL");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[paths]").unwrap();
        writeln!(file, "tree_dir = \"/srv/oncotree/trees\"").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.paths.tree_dir, PathBuf::from("/srv/oncotree/trees"));
        assert_eq!(
            config.paths.mapping_dir(),
            PathBuf::from("/srv/oncotree/trees/mappings")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "[paths\ntree_dir = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = OncotreeConfig::default();

        env::set_var("ONCOTREE_MAPPING_DIR", "/tmp/mappings");
        env::set_var("ONCOTREE_LOG_JSON", "yes");

        apply_environment_overrides(&mut config);

        env::remove_var("ONCOTREE_MAPPING_DIR");
        env::remove_var("ONCOTREE_LOG_JSON");

        assert_eq!(config.paths.mapping_dir(), PathBuf::from("/tmp/mappings"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = OncotreeConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("tree_dir".to_string(), "/data/trees".to_string());
        cli_args.insert("log_level".to_string(), "WARN".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.paths.tree_dir, PathBuf::from("/data/trees"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[paths]").unwrap();
        writeln!(file, "tree_dir = \"file-trees\"").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"info\"").unwrap();

        env::set_var("ONCOTREE_TREE_DIR", "env-trees");
        env::set_var("ONCOTREE_LOG_LEVEL", "debug");

        let mut cli_args = HashMap::new();
        cli_args.insert("tree_dir".to_string(), "cli-trees".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("ONCOTREE_TREE_DIR");
        env::remove_var("ONCOTREE_LOG_LEVEL");

        // CLI wins for tree_dir, env wins for level (no CLI override)
        assert_eq!(config.paths.tree_dir, PathBuf::from("cli-trees"));
        assert_eq!(config.logging.level, "debug");
    }
}
