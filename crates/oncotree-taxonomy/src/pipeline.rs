// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Batch entry points.

Each run reads the directories named by the configuration, computes from that
snapshot and only writes files that do not exist yet. I/O failures abort the
run; problems with individual inputs are collected and reported together at
the end.
*/

use oncotree_config::OncotreeConfig;
use tracing::{info, warn};

use crate::builder::TreeBuilder;
use crate::mapping::generator::{GenerationReport, MappingGenerator};
use crate::release::ReleaseId;
use crate::storage::{ReleaseStore, WriteOutcome};
use crate::validator::{self, ValidationReport};
use crate::{TaxonomyError, TaxonomyResult};

/// Releases whose trees were written or skipped by [`generate_trees`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeGenerationReport {
    pub built: Vec<ReleaseId>,
    pub skipped: Vec<ReleaseId>,
}

/// Build and persist the tree of every source table that has none yet
///
/// Dated releases are built oldest first so that the oldest tree exists
/// before later builds need it to seed precursor resolution; symbolic
/// releases follow.
pub fn generate_trees(config: &OncotreeConfig) -> TaxonomyResult<TreeGenerationReport> {
    let store = ReleaseStore::from_config(config);
    let listing = store.source_tables()?;

    let mut failures = ValidationReport::new();
    for file in &listing.rejected {
        failures.add_file_error(
            file,
            TaxonomyError::InvalidReleaseName(file.clone()).to_string(),
        );
    }

    let mut tables = listing.releases;
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    tables.dedup_by(|later, earlier| {
        let duplicate = later.0 == earlier.0;
        if duplicate {
            warn!(
                target: "oncotree_taxonomy",
                "Ignoring '{}', release {} already has source table '{}'",
                later.1.display(),
                later.0,
                earlier.1.display()
            );
        }
        duplicate
    });

    let builder = TreeBuilder::new(&store);
    let mut report = TreeGenerationReport::default();
    for (release, path) in tables {
        if store.tree_path(&release).exists() {
            info!(
                target: "oncotree_taxonomy",
                "Tree for {} already exists, skipping",
                release
            );
            report.skipped.push(release);
            continue;
        }

        let tree = match builder.build_from_file(&release, &path) {
            Ok(tree) => tree,
            Err(err @ TaxonomyError::Io { .. }) => return Err(err),
            Err(err) => {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| release.name().to_string());
                failures.add_file_error(&file, err.to_string());
                continue;
            }
        };

        match store.write_tree_if_absent(&release, &tree)? {
            WriteOutcome::Written => report.built.push(release),
            WriteOutcome::Skipped => report.skipped.push(release),
        }
    }

    info!(
        target: "oncotree_taxonomy",
        "Tree generation finished: {} built, {} skipped, {} failed",
        report.built.len(),
        report.skipped.len(),
        failures.files.len()
    );
    failures.into_result()?;
    Ok(report)
}

/// Write a mapping file for every adjacent release pair that lacks one
pub fn generate_mappings(config: &OncotreeConfig) -> TaxonomyResult<GenerationReport> {
    let store = ReleaseStore::from_config(config);
    MappingGenerator::new(&store).generate_missing()
}

/// Validate the mapping chain, failing with the consolidated report
pub fn validate_mappings(config: &OncotreeConfig) -> TaxonomyResult<()> {
    let store = ReleaseStore::from_config(config);
    validator::validate_mappings(&store)?.into_result()
}

/// Validate every built tree, failing with the consolidated report
pub fn validate_trees(config: &OncotreeConfig) -> TaxonomyResult<()> {
    let store = ReleaseStore::from_config(config);
    validator::validate_trees(&store)?.into_result()
}
