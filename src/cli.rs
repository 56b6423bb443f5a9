// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Argument handling shared by the batch tools.
//!
//! `--debug-<crate>` flags are consumed by the logging setup before clap sees
//! the remaining arguments.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, FromArgMatches, Parser};
use std::collections::HashMap;
use std::path::PathBuf;

use oncotree_config::{load_config_or_default, validate_config, OncotreeConfig};
use oncotree_observability::{init_logging, parse_debug_flags, LoggingGuard, LoggingSettings};

/// Options accepted by every tool
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Configuration file (default: search for oncotree_configuration.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding built trees
    #[arg(long)]
    pub tree_dir: Option<PathBuf>,

    /// Directory holding source tables (default: <tree-dir>/tsv)
    #[arg(long)]
    pub tsv_dir: Option<PathBuf>,

    /// Directory holding mapping files (default: <tree-dir>/mappings)
    #[arg(long)]
    pub mapping_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON log lines on the console
    #[arg(long)]
    pub log_json: bool,
}

impl CommonArgs {
    /// Overrides in the form understood by `oncotree_config::apply_cli_overrides`
    pub fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        let paths = [
            ("tree_dir", &self.tree_dir),
            ("tsv_dir", &self.tsv_dir),
            ("mapping_dir", &self.mapping_dir),
        ];
        for (key, value) in paths {
            if let Some(path) = value {
                overrides.insert(key.to_string(), path.display().to_string());
            }
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if self.log_json {
            overrides.insert("log_json".to_string(), "true".to_string());
        }
        overrides
    }

    /// Load and validate the configuration
    pub fn load_config(&self) -> Result<OncotreeConfig> {
        let config = load_config_or_default(self.config.as_deref(), Some(&self.overrides()))
            .context("Failed to load configuration")?;
        validate_config(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

/// Command line of a tool that takes only the common options
#[derive(Parser, Debug)]
pub struct ToolCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parse arguments, load configuration and install logging
///
/// The returned guard must stay alive for the rest of the run.
pub fn start(name: &'static str, about: &'static str) -> Result<(OncotreeConfig, LoggingGuard)> {
    let debug_flags = parse_debug_flags();
    let args = std::env::args().filter(|arg| !arg.starts_with("--debug-"));
    let matches = ToolCli::command()
        .name(name)
        .about(about)
        .get_matches_from(args);
    let cli = ToolCli::from_arg_matches(&matches).context("Failed to parse arguments")?;

    let config = cli.common.load_config()?;
    let settings = LoggingSettings::from(&config.logging);
    let guard = init_logging(&debug_flags, &settings)?;
    Ok((config, guard))
}
