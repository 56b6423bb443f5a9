// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! # OncoTree
//!
//! Release preparation for the OncoTree tumor type taxonomy. Each release is a
//! dated tree of codes built from a tab-separated source table; adjacent
//! releases are connected by mapping files so that every code can be traced
//! back to the codes it replaced.
//!
//! ## Crates
//!
//! - [`config`]: TOML configuration with environment and CLI overrides
//! - [`observability`]: logging initialisation and per-crate debug flags
//! - [`taxonomy`]: tree building, mapping generation, precursor resolution
//!   and validation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oncotree::prelude::*;
//!
//! let config = load_config_or_default(None, None)?;
//! let store = ReleaseStore::from_config(&config);
//!
//! for release in store.discover_releases()? {
//!     let tree = store.load_tree(&release)?;
//!     println!("{}: {} nodes", release, tree.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Tools
//!
//! The `generate-trees`, `generate-mappings`, `validate-trees` and
//! `validate-mappings` binaries wrap the [`taxonomy::pipeline`] entry points.

pub mod cli;

pub use oncotree_config as config;
pub use oncotree_observability as observability;
pub use oncotree_taxonomy as taxonomy;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use oncotree_config::{load_config, load_config_or_default, validate_config, OncotreeConfig};
    pub use oncotree_taxonomy::pipeline;
    pub use oncotree_taxonomy::query::{search, SearchField, SearchQuery};
    pub use oncotree_taxonomy::{
        MappingFile, MappingGenerator, MappingName, MappingValidator, Node, PrecursorResolver,
        ReleaseId, ReleaseStore, TaxonomyError, TaxonomyResult, Tree, TreeBuilder,
        ValidationReport,
    };
}
