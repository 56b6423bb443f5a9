// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Tree Validation Tool

Checks every file in the tree directory: release naming, JSON structure,
single root, unique codes and consistent parent references. Prints the
consolidated report and exits non-zero when anything is wrong.

Usage:
  cargo run --bin validate-trees -- --tree-dir trees
*/

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use oncotree::cli;
use oncotree::taxonomy::{pipeline, TaxonomyError};

fn main() -> Result<ExitCode> {
    let (config, _guard) = cli::start("validate-trees", "Validate built release trees")?;

    match pipeline::validate_trees(&config) {
        Ok(()) => {
            info!("All trees are valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(TaxonomyError::Validation(report)) => {
            error!("Tree validation failed with {} findings", report.error_count());
            eprintln!("{}", report);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
