// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Validation of the mapping chain against the release sequence.

use ahash::{AHashMap, AHashSet};
use std::fs;
use tracing::{debug, info};

use super::ValidationReport;
use crate::mapping::{split_row, MappingName};
use crate::release::ReleaseId;
use crate::storage::ReleaseStore;
use crate::{TaxonomyError, TaxonomyResult};

/// Checks mapping files against a chronologically sorted release sequence
#[derive(Debug, Clone, Default)]
pub struct MappingValidator {
    releases: Vec<ReleaseId>,
    codes: AHashMap<String, AHashSet<String>>,
    /// Releases whose code sets could not be loaded, keyed by tree file
    load_failures: ValidationReport,
}

impl MappingValidator {
    /// `releases` must be sorted oldest first
    pub fn new(releases: Vec<ReleaseId>) -> Self {
        Self {
            releases,
            codes: AHashMap::new(),
            load_failures: ValidationReport::new(),
        }
    }

    /// Register the code set of a release
    pub fn insert_codes(&mut self, release: &ReleaseId, codes: AHashSet<String>) {
        self.codes.insert(release.name().to_string(), codes);
    }

    /// Validator over every release in `store`, with all code sets loaded
    ///
    /// A release whose tree cannot be indexed becomes a finding for its tree
    /// file. Mapping files touching that release are still checked for
    /// naming and coverage, but not for content.
    pub fn from_store(store: &ReleaseStore) -> TaxonomyResult<Self> {
        let releases = store.discover_releases()?;
        let (codes, load_failures) = store.code_sets(&releases)?;
        Ok(Self {
            releases,
            codes,
            load_failures,
        })
    }

    pub fn releases(&self) -> &[ReleaseId] {
        &self.releases
    }

    /// Check that a file name connects a release to its immediate successor
    fn check_name(&self, file_name: &str) -> Result<MappingName, String> {
        let name = MappingName::from_file_name(file_name).map_err(|e| e.to_string())?;

        let position = self
            .releases
            .iter()
            .position(|release| release.name() == name.old_version)
            .ok_or_else(|| format!("mapping for unknown release '{}' exists", name.old_version))?;

        match self.releases.get(position + 1) {
            None => Err(format!(
                "'{}' is mapped to '{}', no mapping expected",
                name.old_version, name.new_version
            )),
            Some(expected) if expected.name() != name.new_version => Err(format!(
                "'{}' is mapped to '{}', expected '{}'",
                name.old_version,
                name.new_version,
                expected.name()
            )),
            Some(_) => Ok(name),
        }
    }

    /// Check header, rows and completeness of one correctly named file
    fn check_content(
        name: &MappingName,
        content: &str,
        old_codes: &AHashSet<String>,
        new_codes: &AHashSet<String>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        let mut lines = content.lines();
        let Some(header) = lines.next() else {
            errors.push("mapping file is empty".to_string());
            return errors;
        };
        match split_row(header) {
            None => errors.push("invalid header row".to_string()),
            Some((first, second)) => {
                if first != name.old_version {
                    errors.push(format!(
                        "header in column 1 is expected to be '{}' based on mapping file name, got '{}'",
                        name.old_version, first
                    ));
                }
                if second != name.new_version {
                    errors.push(format!(
                        "header in column 2 is expected to be '{}' based on mapping file name, got '{}'",
                        name.new_version, second
                    ));
                }
            }
        }

        let mut mapped_on: AHashMap<&str, usize> = AHashMap::with_capacity(old_codes.len());
        for (index, line) in lines.enumerate() {
            let line_number = index + 2;
            let Some((old_code, new_code)) = split_row(line) else {
                errors.push(format!("invalid row on line {}", line_number));
                continue;
            };

            if !old_codes.contains(old_code) {
                errors.push(format!(
                    "code in column 1 on line {} not found in '{}', got '{}'",
                    line_number, name.old_version, old_code
                ));
            } else if let Some(first_line) = mapped_on.insert(old_code, line_number) {
                errors.push(format!(
                    "code '{}' on line {} is already mapped on line {}",
                    old_code, line_number, first_line
                ));
                mapped_on.insert(old_code, first_line);
            }

            if !new_code.is_empty() && !new_codes.contains(new_code) {
                errors.push(format!(
                    "code in column 2 on line {} not found in '{}', got '{}'",
                    line_number, name.new_version, new_code
                ));
            }
        }

        let mut unmapped: Vec<&str> = old_codes
            .iter()
            .map(String::as_str)
            .filter(|code| !mapped_on.contains_key(code))
            .collect();
        if !unmapped.is_empty() {
            unmapped.sort_unstable();
            errors.push(format!(
                "codes not mapped from '{}': {}",
                name.old_version,
                unmapped.join(", ")
            ));
        }

        errors
    }

    /// Validate `(file name, content)` pairs
    ///
    /// Content is only checked for files whose name is correct and whose
    /// releases both have a code set.
    pub fn validate<'a, I>(&self, files: I) -> ValidationReport
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut report = self.load_failures.clone();
        let mut covered: AHashMap<String, Vec<String>> = AHashMap::new();

        for (file_name, content) in files {
            let name = match self.check_name(file_name) {
                Ok(name) => name,
                Err(error) => {
                    report.add_file_error(file_name, error);
                    continue;
                }
            };
            covered
                .entry(name.old_version.clone())
                .or_default()
                .push(file_name.to_string());
            match (
                self.codes.get(&name.old_version),
                self.codes.get(&name.new_version),
            ) {
                (Some(old_codes), Some(new_codes)) => report.add_file_errors(
                    file_name,
                    Self::check_content(&name, content, old_codes, new_codes),
                ),
                _ => debug!(
                    target: "oncotree_taxonomy",
                    "Skipping content of '{}', a release tree is unusable",
                    file_name
                ),
            }
        }

        let chained = self.releases.len().saturating_sub(1);
        for release in &self.releases[..chained] {
            match covered.get(release.name()).map(Vec::as_slice) {
                None | Some([]) => {
                    report.add_general(format!("Missing mapping for '{}'", release.name()))
                }
                Some([_]) => {}
                Some(files) => report.add_general(format!(
                    "Multiple mappings for '{}': {}",
                    release.name(),
                    files.join(", ")
                )),
            }
        }

        report
    }
}

/// Validate every file in the mapping directory against the store's releases
///
/// I/O failures abort; every other finding, including unusable release
/// trees, goes into the report.
pub fn validate_mappings(store: &ReleaseStore) -> TaxonomyResult<ValidationReport> {
    let validator = MappingValidator::from_store(store)?;

    let mut files = Vec::new();
    for (file_name, path) in store.mapping_files()? {
        let content = fs::read_to_string(&path).map_err(|e| TaxonomyError::io(&path, e))?;
        files.push((file_name, content));
    }

    let report = validator.validate(
        files
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str())),
    );
    info!(
        target: "oncotree_taxonomy",
        "Validated {} mapping files across {} releases: {} findings",
        files.len(),
        validator.releases().len(),
        report.error_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str) -> ReleaseId {
        ReleaseId::parse(name).unwrap()
    }

    fn codes(codes: &[&str]) -> AHashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    const A: &str = "oncotree_2020_01_01";
    const B: &str = "oncotree_2021_01_01";
    const C: &str = "oncotree_2022_01_01";

    fn validator() -> MappingValidator {
        let mut validator = MappingValidator::new(vec![release(A), release(B), release(C)]);
        validator.insert_codes(&release(A), codes(&["TISSUE", "BRCA", "OLD"]));
        validator.insert_codes(&release(B), codes(&["TISSUE", "BRCA_NEW"]));
        validator.insert_codes(&release(C), codes(&["TISSUE", "BRCA_NEW"]));
        validator
    }

    fn file_name(old: &str, new: &str) -> String {
        MappingName::new(old, new).file_name("tsv")
    }

    #[test]
    fn test_valid_chain() {
        let ab = format!("{}\t{}\nTISSUE\tTISSUE\nBRCA\tBRCA_NEW\nOLD\t\n", A, B);
        let bc = format!("{}\t{}\nTISSUE\tTISSUE\nBRCA_NEW\tBRCA_NEW\n", B, C);
        let (ab_name, bc_name) = (file_name(A, B), file_name(B, C));
        let report = validator()
            .validate([(ab_name.as_str(), ab.as_str()), (bc_name.as_str(), bc.as_str())]);
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_wrong_successor_names_both_releases() {
        let ac_name = file_name(A, C);
        let report = validator().validate([(ac_name.as_str(), "")]);
        assert_eq!(
            report.files[&ac_name],
            vec![format!("'{}' is mapped to '{}', expected '{}'", A, C, B)]
        );
        assert!(report.general.contains(&format!("Missing mapping for '{}'", A)));
        assert!(report.general.contains(&format!("Missing mapping for '{}'", B)));
    }

    #[test]
    fn test_mapping_from_last_release() {
        let name = file_name(C, "oncotree_2023_01_01");
        let report = validator().validate([(name.as_str(), "")]);
        assert_eq!(
            report.files[&name],
            vec![format!("'{}' is mapped to 'oncotree_2023_01_01', no mapping expected", C)]
        );
    }

    #[test]
    fn test_unknown_and_invalid_names() {
        let report = validator()
            .validate([("oncotree_2019_01_01_to_x.tsv", ""), ("garbage.tsv", "")]);
        assert_eq!(
            report.files["oncotree_2019_01_01_to_x.tsv"],
            vec!["mapping for unknown release 'oncotree_2019_01_01' exists".to_string()]
        );
        assert_eq!(
            report.files["garbage.tsv"],
            vec!["mapping file has invalid name: 'garbage.tsv'".to_string()]
        );
    }

    #[test]
    fn test_row_findings() {
        let content = format!(
            "{}\twrong\nTISSUE\tTISSUE\nGHOST\tBRCA_NEW\nTISSUE\t\nBRCA\tNOPE\nbad row\n",
            A
        );
        let name = file_name(A, B);
        let report = validator().validate([(name.as_str(), content.as_str())]);
        assert_eq!(
            report.files[&name],
            vec![
                format!("header in column 2 is expected to be '{}' based on mapping file name, got 'wrong'", B),
                format!("code in column 1 on line 3 not found in '{}', got 'GHOST'", A),
                "code 'TISSUE' on line 4 is already mapped on line 2".to_string(),
                format!("code in column 2 on line 5 not found in '{}', got 'NOPE'", B),
                "invalid row on line 6".to_string(),
                format!("codes not mapped from '{}': OLD", A),
            ]
        );
    }

    #[test]
    fn test_retirement_rows_need_no_target() {
        let content = format!("{}\t{}\nTISSUE\t\nBRCA\t\nOLD\t\n", A, B);
        let name = file_name(A, B);
        let report = validator().validate([(name.as_str(), content.as_str())]);
        assert!(!report.files.contains_key(&name));
    }

    #[test]
    fn test_duplicate_mapping_files() {
        let content = format!("{}\t{}\nTISSUE\tTISSUE\nBRCA\tBRCA_NEW\nOLD\t\n", A, B);
        let tsv = file_name(A, B);
        let txt = MappingName::new(A, B).file_name("txt");
        let report = validator()
            .validate([(tsv.as_str(), content.as_str()), (txt.as_str(), content.as_str())]);
        assert!(report
            .general
            .contains(&format!("Multiple mappings for '{}': {}, {}", A, tsv, txt)));
    }

    #[test]
    fn test_release_without_codes_skips_only_its_content() {
        let mut validator = MappingValidator::new(vec![release(A), release(B), release(C)]);
        validator.insert_codes(&release(A), codes(&["TISSUE"]));
        validator.insert_codes(&release(B), codes(&["TISSUE"]));

        let ab = format!("{}\t{}\nTISSUE\tTISSUE\nGHOST\t\n", A, B);
        let bc = format!("{}\t{}\nNOPE\tNOPE\n", B, C);
        let (ab_name, bc_name) = (file_name(A, B), file_name(B, C));
        let report =
            validator.validate([(ab_name.as_str(), ab.as_str()), (bc_name.as_str(), bc.as_str())]);

        assert_eq!(
            report.files[&ab_name],
            vec![format!("code in column 1 on line 3 not found in '{}', got 'GHOST'", A)]
        );
        assert!(!report.files.contains_key(&bc_name));
        assert!(report.general.is_empty());
    }
}
