// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Precursor lineage across the release history.

The resolver keeps one accumulator entry per code, holding every older code
known to have become it. It is seeded from the oldest release's curated
aliases and then fed the mapping files in chronological order; each rename
row `old -> new` merges `{old}` and everything accumulated under `old` into
the entry for `new`, so chains of renames compose.
*/

use ahash::AHashMap;
use std::collections::BTreeSet;
use tracing::debug;

use crate::mapping::{MappingFile, MappingName};
use crate::release::ReleaseId;
use crate::tree::Tree;
use crate::TaxonomyResult;

/// Code → sorted precursor codes
pub type PrecursorMap = AHashMap<String, Vec<String>>;

/// Running accumulator of renames
#[derive(Debug, Clone, Default)]
pub struct PrecursorResolver {
    accumulator: AHashMap<String, BTreeSet<String>>,
}

impl PrecursorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a release's curated `revocations` and `precursors`
    pub fn seed_from_tree(&mut self, tree: &Tree) {
        for node in tree.nodes() {
            let aliases = node.revocations.iter().chain(node.precursors.iter());
            let mut aliases = aliases.peekable();
            if aliases.peek().is_none() {
                continue;
            }
            self.accumulator
                .entry(node.code.clone())
                .or_default()
                .extend(aliases.cloned());
        }
        debug!(
            target: "oncotree_taxonomy",
            "Seeded precursor accumulator with {} curated entries",
            self.accumulator.len()
        );
    }

    /// Fold one mapping file into the accumulator
    ///
    /// Every row reads the accumulator as it stood before this file, so the
    /// order of rows inside the file does not matter.
    pub fn apply(&mut self, mapping: &MappingFile) {
        let mut additions: AHashMap<&str, BTreeSet<String>> = AHashMap::new();
        for (old_code, new_code) in mapping.renames() {
            let entry = additions.entry(new_code).or_default();
            entry.insert(old_code.to_string());
            if let Some(earlier) = self.accumulator.get(old_code) {
                entry.extend(earlier.iter().cloned());
            }
        }

        debug!(
            target: "oncotree_taxonomy",
            "Applied {} renames from {}_to_{}",
            additions.len(),
            mapping.old_version(),
            mapping.new_version()
        );

        for (new_code, codes) in additions {
            self.accumulator
                .entry(new_code.to_string())
                .or_default()
                .extend(codes);
        }
    }

    /// Accumulated precursors of one code, excluding the code itself
    pub fn precursors_of(&self, code: &str) -> Vec<String> {
        self.accumulator
            .get(code)
            .map(|codes| codes.iter().filter(|c| *c != code).cloned().collect())
            .unwrap_or_default()
    }

    /// Precursors for each of `codes` that has any
    pub fn resolve<'a, I>(&self, codes: I) -> PrecursorMap
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes
            .into_iter()
            .filter_map(|code| {
                let precursors = self.precursors_of(code);
                (!precursors.is_empty()).then(|| (code.to_string(), precursors))
            })
            .collect()
    }
}

/// Supplies a resolver primed with the history that precedes a release
pub trait PrecursorSource {
    fn resolver_for(&self, release: &ReleaseId) -> TaxonomyResult<PrecursorResolver>;
}

/// Whether a mapping belongs to the history of `release`
///
/// For a dated release these are the mappings whose old side is an earlier
/// dated release; a symbolic release sees the whole history.
pub fn precedes(mapping: &MappingName, release: &ReleaseId) -> bool {
    match release.date() {
        None => true,
        Some(date) => ReleaseId::parse(&mapping.old_version)
            .ok()
            .and_then(|old| old.date())
            .map_or(false, |old_date| old_date < date),
    }
}

/// Sort mappings chronologically by their old release
pub fn sort_chronologically(mappings: &mut [MappingFile]) {
    mappings.sort_by_key(|mapping| ReleaseId::parse(mapping.old_version()).ok());
}

/// Fully loaded history: the oldest release's tree plus every mapping file
#[derive(Debug, Clone, Default)]
pub struct MappingHistory {
    pub seed: Option<Tree>,
    pub mappings: Vec<MappingFile>,
}

impl MappingHistory {
    pub fn new(seed: Option<Tree>, mut mappings: Vec<MappingFile>) -> Self {
        sort_chronologically(&mut mappings);
        Self { seed, mappings }
    }
}

impl PrecursorSource for MappingHistory {
    fn resolver_for(&self, release: &ReleaseId) -> TaxonomyResult<PrecursorResolver> {
        let window: Vec<&MappingFile> = self
            .mappings
            .iter()
            .filter(|mapping| precedes(&mapping.name, release))
            .collect();

        let mut resolver = PrecursorResolver::new();
        if window.is_empty() {
            return Ok(resolver);
        }
        if let Some(seed) = &self.seed {
            resolver.seed_from_tree(seed);
        }
        for mapping in window {
            resolver.apply(mapping);
        }
        Ok(resolver)
    }
}

/// Source with no history at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrecursors;

impl PrecursorSource for NoPrecursors {
    fn resolver_for(&self, _release: &ReleaseId) -> TaxonomyResult<PrecursorResolver> {
        Ok(PrecursorResolver::new())
    }
}
