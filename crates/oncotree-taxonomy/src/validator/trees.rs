// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Validation of built tree documents.

use std::fs;
use tracing::info;

use super::ValidationReport;
use crate::release::ReleaseId;
use crate::storage::{ReleaseStore, TREE_EXTENSION};
use crate::tree::document::{document_findings, TreeDocument};
use crate::{TaxonomyError, TaxonomyResult};

/// Findings for one tree document
pub fn validate_tree_json(json: &str) -> Vec<String> {
    match serde_json::from_str::<TreeDocument>(json) {
        Ok(document) => document_findings(&document),
        Err(e) => vec![format!("invalid tree document: {}", e)],
    }
}

fn check_file_name(file_name: &str) -> Option<String> {
    let valid = file_name
        .strip_suffix(&format!(".{}", TREE_EXTENSION))
        .and_then(|stem| ReleaseId::parse(stem).ok())
        .map_or(false, |release| !release.is_alias());
    (!valid).then(|| {
        format!(
            "Invalid filename: '{}' is not of format 'oncotree_YYYY_MM_DD.json' or a known symbolic release",
            file_name
        )
    })
}

/// Validate every file in the tree directory
///
/// Checks the file name, that the document parses, that it has exactly one
/// root, that no code appears twice and that stored parents match the
/// nesting.
pub fn validate_trees(store: &ReleaseStore) -> TaxonomyResult<ValidationReport> {
    let mut report = ValidationReport::new();
    let files = ReleaseStore::list_files(store.tree_dir())?;

    for (file_name, path) in &files {
        let mut errors: Vec<String> = check_file_name(file_name).into_iter().collect();
        let json = fs::read_to_string(path).map_err(|e| TaxonomyError::io(path, e))?;
        errors.extend(validate_tree_json(&json));
        report.add_file_errors(file_name, errors);
    }

    info!(
        target: "oncotree_taxonomy",
        "Validated {} tree files: {} findings",
        files.len(),
        report.error_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(check_file_name("oncotree_2021_11_02.json"), None);
        assert_eq!(check_file_name("oncotree_candidate_release.json"), None);
        assert!(check_file_name("oncotree_legacy_1.1.json").is_none());
        assert!(check_file_name("oncotree_latest_stable.json").is_some());
        assert!(check_file_name("oncotree_2021_11_02.txt").is_some());
        assert!(check_file_name("oncotree_2021_13_02.json").is_some());
    }

    #[test]
    fn test_invalid_json() {
        let findings = validate_tree_json("{not json");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].starts_with("invalid tree document"));
    }

    #[test]
    fn test_duplicate_codes_reported() {
        let json = r#"{"A": {"code": "A", "name": "A", "children": {
            "B": {"code": "B", "name": "B", "parent": "A", "children": {
                "C": {"code": "C", "name": "C", "parent": "B"}
            }},
            "C": {"code": "C", "name": "C", "parent": "A"}
        }}}"#;
        assert_eq!(
            validate_tree_json(json),
            vec!["the following codes have multiple nodes: C".to_string()]
        );
    }
}
