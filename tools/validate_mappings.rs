// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Mapping Validation Tool

Checks the mapping files against the chronological release sequence:
coverage of every adjacent pair, file naming, headers, row references and
completeness. Prints the consolidated report and exits non-zero when
anything is wrong.

Usage:
  cargo run --bin validate-mappings -- --tree-dir trees
*/

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use oncotree::cli;
use oncotree::taxonomy::{pipeline, TaxonomyError};

fn main() -> Result<ExitCode> {
    let (config, _guard) = cli::start(
        "validate-mappings",
        "Validate mapping files against the release sequence",
    )?;

    match pipeline::validate_mappings(&config) {
        Ok(()) => {
            info!("All mapping files are valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(TaxonomyError::Validation(report)) => {
            error!("Mapping validation failed with {} findings", report.error_count());
            eprintln!("{}", report);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
