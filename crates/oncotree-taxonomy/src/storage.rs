// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
On-disk release store.

Layout:

- `<tree_dir>/<release>.json`: built trees
- `<tsv_dir>/<release>.txt` (or `.tsv`): source tables
- `<mapping_dir>/<old>_to_<new>.tsv` (or `.txt`): mapping files

Every write is create-only. A target that already exists is skipped, never
overwritten, which makes repeated runs perform no writes.
*/

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use oncotree_config::OncotreeConfig;

use crate::mapping::{MappingFile, MappingName, MAPPING_EXTENSIONS};
use crate::precursor::{precedes, sort_chronologically, MappingHistory, PrecursorResolver, PrecursorSource};
use crate::release::ReleaseId;
use crate::tree::Tree;
use crate::validator::ValidationReport;
use crate::{TaxonomyError, TaxonomyResult};

/// Extensions recognised for source tables
pub const SOURCE_EXTENSIONS: &[&str] = &["txt", "tsv"];

pub const TREE_EXTENSION: &str = "json";

/// Result of a create-only write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The target already existed and was left untouched
    Skipped,
}

/// Release files found in one directory
#[derive(Debug, Clone, Default)]
pub struct ReleaseListing {
    pub releases: Vec<(ReleaseId, PathBuf)>,
    /// File names that are not valid release identifiers
    pub rejected: Vec<String>,
}

/// File-system backed access to trees, source tables and mapping files
#[derive(Debug, Clone)]
pub struct ReleaseStore {
    tree_dir: PathBuf,
    tsv_dir: PathBuf,
    mapping_dir: PathBuf,
    mapping_extension: String,
}

impl ReleaseStore {
    pub fn new(
        tree_dir: impl Into<PathBuf>,
        tsv_dir: impl Into<PathBuf>,
        mapping_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tree_dir: tree_dir.into(),
            tsv_dir: tsv_dir.into(),
            mapping_dir: mapping_dir.into(),
            mapping_extension: MAPPING_EXTENSIONS[0].to_string(),
        }
    }

    pub fn from_config(config: &OncotreeConfig) -> Self {
        Self::new(
            config.paths.tree_dir.clone(),
            config.paths.tsv_dir(),
            config.paths.mapping_dir(),
        )
        .with_mapping_extension(&config.generation.mapping_extension)
    }

    /// Extension used when writing new mapping files
    pub fn with_mapping_extension(mut self, extension: &str) -> Self {
        self.mapping_extension = extension.to_string();
        self
    }

    pub fn tree_dir(&self) -> &Path {
        &self.tree_dir
    }

    pub fn tsv_dir(&self) -> &Path {
        &self.tsv_dir
    }

    pub fn mapping_dir(&self) -> &Path {
        &self.mapping_dir
    }

    pub fn tree_file_name(release: &ReleaseId) -> String {
        format!("{}.{}", release.name(), TREE_EXTENSION)
    }

    pub fn tree_path(&self, release: &ReleaseId) -> PathBuf {
        self.tree_dir.join(Self::tree_file_name(release))
    }

    /// Regular, non-hidden files of `dir` sorted by name
    pub(crate) fn list_files(dir: &Path) -> TaxonomyResult<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(dir).map_err(|e| TaxonomyError::io(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TaxonomyError::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| TaxonomyError::io(entry.path(), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !file_type.is_file() || name.starts_with('.') {
                continue;
            }
            files.push((name, entry.path()));
        }
        files.sort();
        Ok(files)
    }

    fn list_releases(dir: &Path, extensions: &[&str]) -> TaxonomyResult<ReleaseListing> {
        let mut listing = ReleaseListing::default();
        for (name, path) in Self::list_files(dir)? {
            let stem = extensions
                .iter()
                .find_map(|ext| name.strip_suffix(&format!(".{}", ext)));
            let Some(stem) = stem else {
                debug!(target: "oncotree_taxonomy", "Ignoring '{}'", path.display());
                continue;
            };
            match ReleaseId::parse(stem) {
                Ok(release) => listing.releases.push((release, path)),
                Err(_) => listing.rejected.push(name),
            }
        }
        Ok(listing)
    }

    /// Source tables in the source-table directory
    pub fn source_tables(&self) -> TaxonomyResult<ReleaseListing> {
        Self::list_releases(&self.tsv_dir, SOURCE_EXTENSIONS)
    }

    /// Built tree documents in the tree directory
    pub fn tree_files(&self) -> TaxonomyResult<ReleaseListing> {
        Self::list_releases(&self.tree_dir, &[TREE_EXTENSION])
    }

    /// Source table path of a release, if one exists
    pub fn source_table(&self, release: &ReleaseId) -> Option<PathBuf> {
        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| self.tsv_dir.join(format!("{}.{}", release.name(), ext)))
            .find(|path| path.is_file())
    }

    /// Dated releases with a built tree, oldest first
    ///
    /// Symbolic releases never take part in the chronological chain, and a
    /// source table without a tree is not a release yet.
    pub fn discover_releases(&self) -> TaxonomyResult<Vec<ReleaseId>> {
        let by_date: BTreeMap<_, _> = self
            .tree_files()?
            .releases
            .into_iter()
            .filter_map(|(release, _)| release.date().map(|date| (date, release)))
            .collect();
        Ok(by_date.into_values().collect())
    }

    /// Load and parse a built tree
    pub fn load_tree(&self, release: &ReleaseId) -> TaxonomyResult<Tree> {
        let path = self.tree_path(release);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TaxonomyError::TreeNotFound(release.name().to_string()))
            }
            Err(e) => return Err(TaxonomyError::io(&path, e)),
        };
        Tree::from_json_str(&json)
    }

    /// Every code of a release's built tree
    ///
    /// Fails with `RootCount` unless the tree has exactly one root.
    pub fn release_codes(&self, release: &ReleaseId) -> TaxonomyResult<AHashSet<String>> {
        self.load_tree(release)?.code_set()
    }

    /// Code sets of `releases`, keyed by release name
    ///
    /// A release whose tree is missing or invalid is recorded against its
    /// tree file in the returned report and left out of the map. I/O errors
    /// abort.
    pub fn code_sets(
        &self,
        releases: &[ReleaseId],
    ) -> TaxonomyResult<(AHashMap<String, AHashSet<String>>, ValidationReport)> {
        let mut codes = AHashMap::with_capacity(releases.len());
        let mut failures = ValidationReport::new();
        for release in releases {
            match self.release_codes(release) {
                Ok(set) => {
                    debug!(
                        target: "oncotree_taxonomy",
                        "Loaded {} codes for {}",
                        set.len(),
                        release
                    );
                    codes.insert(release.name().to_string(), set);
                }
                Err(err @ TaxonomyError::Io { .. }) => return Err(err),
                Err(err) => {
                    warn!(target: "oncotree_taxonomy", "Cannot index {}: {}", release, err);
                    failures.add_file_error(&Self::tree_file_name(release), err.to_string());
                }
            }
        }
        Ok((codes, failures))
    }

    fn create_new(path: &Path, content: &str) -> TaxonomyResult<WriteOutcome> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(WriteOutcome::Skipped),
            Err(e) => return Err(TaxonomyError::io(path, e)),
        };
        file.write_all(content.as_bytes())
            .map_err(|e| TaxonomyError::io(path, e))?;
        Ok(WriteOutcome::Written)
    }

    /// Persist a tree unless one already exists for the release
    pub fn write_tree_if_absent(
        &self,
        release: &ReleaseId,
        tree: &Tree,
    ) -> TaxonomyResult<WriteOutcome> {
        let path = self.tree_path(release);
        let outcome = Self::create_new(&path, &tree.to_json_string()?)?;
        match outcome {
            WriteOutcome::Written => info!(target: "oncotree_taxonomy", "Wrote tree '{}'", path.display()),
            WriteOutcome::Skipped => info!(
                target: "oncotree_taxonomy",
                "Tree file '{}' already exists, skipping",
                path.display()
            ),
        }
        Ok(outcome)
    }

    /// Existing mapping file for a release pair, under any recognised extension
    pub fn find_mapping(&self, name: &MappingName) -> Option<PathBuf> {
        MAPPING_EXTENSIONS
            .iter()
            .map(|ext| self.mapping_dir.join(name.file_name(ext)))
            .find(|path| path.exists())
    }

    /// Persist a mapping unless one already exists for the release pair
    pub fn write_mapping_if_absent(&self, mapping: &MappingFile) -> TaxonomyResult<WriteOutcome> {
        if let Some(existing) = self.find_mapping(&mapping.name) {
            info!(
                target: "oncotree_taxonomy",
                "Mapping file '{}' already exists, skipping",
                existing.display()
            );
            return Ok(WriteOutcome::Skipped);
        }

        let path = self
            .mapping_dir
            .join(mapping.name.file_name(&self.mapping_extension));
        let outcome = Self::create_new(&path, &mapping.to_tsv())?;
        if outcome == WriteOutcome::Written {
            info!(target: "oncotree_taxonomy", "Wrote mapping '{}'", path.display());
        }
        Ok(outcome)
    }

    /// Every non-hidden file in the mapping directory
    pub fn mapping_files(&self) -> TaxonomyResult<Vec<(String, PathBuf)>> {
        Self::list_files(&self.mapping_dir)
    }

    /// Parse all validly named mapping files, oldest first
    ///
    /// The release pair is taken from the file name; files whose name does
    /// not describe two releases are skipped with a warning.
    pub fn load_mappings(&self) -> TaxonomyResult<Vec<MappingFile>> {
        let mut mappings = Vec::new();
        for (file_name, path) in self.mapping_files()? {
            let name = match MappingName::from_file_name(&file_name) {
                Ok(name)
                    if ReleaseId::parse(&name.old_version).is_ok()
                        && ReleaseId::parse(&name.new_version).is_ok() =>
                {
                    name
                }
                _ => {
                    warn!(target: "oncotree_taxonomy", "Skipping mapping file '{}'", file_name);
                    continue;
                }
            };
            let content = fs::read_to_string(&path).map_err(|e| TaxonomyError::io(&path, e))?;
            let mut mapping = MappingFile::parse(&content, &file_name)?;
            mapping.name = name;
            mappings.push(mapping);
        }
        sort_chronologically(&mut mappings);
        Ok(mappings)
    }
}

impl PrecursorSource for ReleaseStore {
    /// History for `release` read from the mapping directory
    ///
    /// The oldest mapped release's tree must exist whenever the window is
    /// non-empty since its curated aliases seed the accumulator.
    fn resolver_for(&self, release: &ReleaseId) -> TaxonomyResult<PrecursorResolver> {
        let window: Vec<MappingFile> = self
            .load_mappings()?
            .into_iter()
            .filter(|mapping| precedes(&mapping.name, release))
            .collect();

        let Some(first) = window.first() else {
            return Ok(PrecursorResolver::new());
        };
        let oldest = ReleaseId::parse(first.old_version())?;
        let seed = self.load_tree(&oldest)?;
        debug!(
            target: "oncotree_taxonomy",
            "Resolving precursors for {} from {} mapping files seeded by {}",
            release,
            window.len(),
            oldest
        );
        MappingHistory::new(Some(seed), window).resolver_for(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;
    use tempfile::TempDir;

    fn store() -> (TempDir, ReleaseStore) {
        let dir = TempDir::new().unwrap();
        let tree_dir = dir.path().to_path_buf();
        fs::create_dir_all(tree_dir.join("tsv")).unwrap();
        fs::create_dir_all(tree_dir.join("mappings")).unwrap();
        let store = ReleaseStore::new(&tree_dir, tree_dir.join("tsv"), tree_dir.join("mappings"));
        (dir, store)
    }

    fn single_node_tree(code: &str) -> Tree {
        let mut tree = Tree::new();
        tree.insert(Node::new(code, code)).unwrap();
        tree.link();
        tree.assign_levels().unwrap();
        tree
    }

    #[test]
    fn test_discover_releases_lists_built_trees() {
        let (_dir, store) = store();
        fs::write(store.tsv_dir().join("oncotree_2022_05_01.txt"), "Code\n").unwrap();
        fs::write(store.tree_dir().join("oncotree_2021_11_02.json"), "{}").unwrap();
        fs::write(store.tree_dir().join("oncotree_2019_12_01.json"), "{}").unwrap();
        fs::write(store.tree_dir().join("oncotree_development.json"), "{}").unwrap();
        fs::write(store.tree_dir().join("notes.json"), "{}").unwrap();

        let releases: Vec<String> = store
            .discover_releases()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(releases, vec!["oncotree_2019_12_01", "oncotree_2021_11_02"]);
        assert_eq!(store.tree_files().unwrap().rejected, vec!["notes.json".to_string()]);
    }

    #[test]
    fn test_tree_write_is_create_only() {
        let (_dir, store) = store();
        let release = ReleaseId::parse("oncotree_2021_11_02").unwrap();

        let first = store
            .write_tree_if_absent(&release, &single_node_tree("A"))
            .unwrap();
        let second = store
            .write_tree_if_absent(&release, &single_node_tree("B"))
            .unwrap();
        assert_eq!(first, WriteOutcome::Written);
        assert_eq!(second, WriteOutcome::Skipped);
        assert_eq!(store.load_tree(&release).unwrap().root().unwrap().code, "A");
    }

    #[test]
    fn test_existing_legacy_mapping_blocks_write() {
        let (_dir, store) = store();
        fs::write(store.mapping_dir().join("r1_to_r2.txt"), "r1\tr2\n").unwrap();
        let mapping = MappingFile::new(MappingName::new("r1", "r2"));
        assert_eq!(
            store.write_mapping_if_absent(&mapping).unwrap(),
            WriteOutcome::Skipped
        );
        assert!(!store.mapping_dir().join("r1_to_r2.tsv").exists());
    }

    #[test]
    fn test_missing_tree() {
        let (_dir, store) = store();
        let release = ReleaseId::parse("oncotree_2020_01_01").unwrap();
        assert!(matches!(
            store.load_tree(&release),
            Err(TaxonomyError::TreeNotFound(_))
        ));
    }

    #[test]
    fn test_release_codes_come_from_built_tree() {
        let (_dir, store) = store();
        let release = ReleaseId::parse("oncotree_2021_11_02").unwrap();
        fs::write(
            store.tsv_dir().join("oncotree_2021_11_02.txt"),
            "Code\tName\nTISSUE\tTissue\nMEL\tMelanoma\n",
        )
        .unwrap();
        store
            .write_tree_if_absent(&release, &single_node_tree("OTHER"))
            .unwrap();

        let codes = store.release_codes(&release).unwrap();
        assert_eq!(codes.len(), 1);
        assert!(codes.contains("OTHER"));
    }

    #[test]
    fn test_code_sets_record_invalid_trees() {
        let (_dir, store) = store();
        let good = ReleaseId::parse("oncotree_2020_01_01").unwrap();
        let forest = ReleaseId::parse("oncotree_2021_01_01").unwrap();
        let missing = ReleaseId::parse("oncotree_2022_01_01").unwrap();
        store.write_tree_if_absent(&good, &single_node_tree("TISSUE")).unwrap();
        fs::write(
            store.tree_path(&forest),
            r#"{"A": {"code": "A", "name": "A"}, "B": {"code": "B", "name": "B"}}"#,
        )
        .unwrap();

        let (codes, failures) = store
            .code_sets(&[good.clone(), forest, missing])
            .unwrap();
        assert_eq!(codes.len(), 1);
        assert!(codes[good.name()].contains("TISSUE"));
        assert_eq!(
            failures.files["oncotree_2021_01_01.json"],
            vec!["tree has 2 root nodes, expected 1".to_string()]
        );
        assert_eq!(
            failures.files["oncotree_2022_01_01.json"],
            vec!["no built tree for release 'oncotree_2022_01_01'".to_string()]
        );
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = ReleaseStore::new(dir.path().join("nope"), dir.path(), dir.path());
        assert!(matches!(store.tree_files(), Err(TaxonomyError::Io { .. })));
    }
}
