// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Tree Generation Tool

Builds `<tree_dir>/<release>.json` for every source table in the source
table directory that has no built tree yet. Existing trees are left alone.

Usage:
  cargo run --bin generate-trees -- --tree-dir trees [--debug-oncotree-taxonomy]
*/

use anyhow::Result;
use tracing::info;

use oncotree::cli;
use oncotree::taxonomy::pipeline;

fn main() -> Result<()> {
    let (config, _guard) = cli::start(
        "generate-trees",
        "Build missing release trees from their source tables",
    )?;

    let report = pipeline::generate_trees(&config)?;
    info!(
        "Built {} trees, {} already existed",
        report.built.len(),
        report.skipped.len()
    );
    Ok(())
}
