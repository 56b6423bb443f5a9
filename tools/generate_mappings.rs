// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Mapping Generation Tool

Writes `<old>_to_<new>.tsv` for every pair of adjacent dated releases with
built trees that has no mapping file yet. Trees that cannot be indexed are
reported and no mapping touching them is written. Generated files only record codes surviving by identity;
renames are curated by hand afterwards.

Usage:
  cargo run --bin generate-mappings -- --tree-dir trees
*/

use anyhow::Result;
use tracing::info;

use oncotree::cli;
use oncotree::taxonomy::pipeline;

fn main() -> Result<()> {
    let (config, _guard) = cli::start(
        "generate-mappings",
        "Write missing mapping files between adjacent releases",
    )?;

    let report = pipeline::generate_mappings(&config)?;
    for name in &report.written {
        info!("Generated {}", name.file_name(&config.generation.mapping_extension));
    }
    Ok(())
}
