// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Mapping generation between adjacent releases.
//!
//! A generated mapping only records survival by identity: a code present in
//! both releases maps to itself, any other code maps to nothing. Renames are
//! curated by hand afterwards, which is why existing files are never
//! regenerated.
//!
//! Code sets come from built trees only. A release whose tree is missing or
//! has more than one root is reported and no mapping touching it is written.

use ahash::AHashSet;
use tracing::{info, warn};

use super::{MappingFile, MappingName};
use crate::release::ReleaseId;
use crate::storage::{ReleaseStore, WriteOutcome};
use crate::TaxonomyResult;

/// Mapping from `prev` to `next` derived from their code sets
pub fn diff_code_sets(
    prev: &ReleaseId,
    next: &ReleaseId,
    prev_codes: &AHashSet<String>,
    next_codes: &AHashSet<String>,
) -> MappingFile {
    let mut mapping = MappingFile::new(MappingName::new(prev.name(), next.name()));
    for code in prev_codes {
        let new_code = next_codes.contains(code).then(|| code.clone());
        mapping.push(code.clone(), new_code);
    }
    mapping
}

/// Files written and skipped by one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<MappingName>,
    pub skipped: Vec<MappingName>,
}

pub struct MappingGenerator<'a> {
    store: &'a ReleaseStore,
}

impl<'a> MappingGenerator<'a> {
    pub fn new(store: &'a ReleaseStore) -> Self {
        Self { store }
    }

    /// Write a mapping for every adjacent release pair that has none yet
    ///
    /// # Errors
    ///
    /// `Validation` naming every tree file that could not be indexed, after
    /// all other pairs have been handled. I/O errors abort immediately.
    pub fn generate_missing(&self) -> TaxonomyResult<GenerationReport> {
        let releases = self.store.discover_releases()?;
        let (codes, failures) = self.store.code_sets(&releases)?;
        let mut report = GenerationReport::default();

        for pair in releases.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let name = MappingName::new(prev.name(), next.name());
            if self.store.find_mapping(&name).is_some() {
                info!(
                    target: "oncotree_taxonomy",
                    "Mapping {}_to_{} already exists, skipping",
                    prev,
                    next
                );
                report.skipped.push(name);
                continue;
            }

            let (Some(prev_codes), Some(next_codes)) =
                (codes.get(prev.name()), codes.get(next.name()))
            else {
                warn!(
                    target: "oncotree_taxonomy",
                    "Not generating {}_to_{}: a release tree is unusable",
                    prev,
                    next
                );
                continue;
            };
            let mapping = diff_code_sets(prev, next, prev_codes, next_codes);
            match self.store.write_mapping_if_absent(&mapping)? {
                WriteOutcome::Written => report.written.push(name),
                WriteOutcome::Skipped => report.skipped.push(name),
            }
        }

        info!(
            target: "oncotree_taxonomy",
            "Mapping generation finished: {} written, {} skipped, {} unusable trees",
            report.written.len(),
            report.skipped.len(),
            failures.files.len()
        );
        failures.into_result()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_marks_survivors_and_retirements() {
        let prev = ReleaseId::parse("oncotree_2020_01_01").unwrap();
        let next = ReleaseId::parse("oncotree_2021_01_01").unwrap();
        let prev_codes: AHashSet<String> = ["MEL", "OLD"].iter().map(|c| c.to_string()).collect();
        let next_codes: AHashSet<String> = ["MEL", "NEW"].iter().map(|c| c.to_string()).collect();

        let mapping = diff_code_sets(&prev, &next, &prev_codes, &next_codes);
        assert_eq!(
            mapping.to_tsv(),
            "oncotree_2020_01_01\toncotree_2021_01_01\nMEL\tMEL\nOLD\t\n"
        );
    }
}
