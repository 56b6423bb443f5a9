// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! # oncotree-observability
//!
//! Logging setup shared by the OncoTree batch tools.
//!
//! Provides consistent console and file logging across all workspace crates
//! with per-crate debug flag support.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Workspace crate names accepted by `--debug-<crate>`
pub const KNOWN_CRATES: &[&str] = &[
    "oncotree",
    "oncotree-config",
    "oncotree-observability",
    "oncotree-taxonomy",
];

/// Convert a crate name into the target name `tracing` records for it
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
