// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Consistency checks over the persisted release data.

Validation never repairs anything. Every finding is collected into one
[`ValidationReport`], split into general findings and findings per file, so
a single run shows everything that needs fixing.
*/

pub mod mappings;
pub mod trees;

use std::collections::BTreeMap;
use std::fmt;

use crate::{TaxonomyError, TaxonomyResult};

pub use mappings::{validate_mappings, MappingValidator};
pub use trees::{validate_tree_json, validate_trees};

/// Aggregated validation findings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Findings not tied to one file
    pub general: Vec<String>,
    /// File name → findings for that file
    pub files: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_general(&mut self, error: String) {
        self.general.push(error);
    }

    pub fn add_file_error(&mut self, file: &str, error: String) {
        self.files.entry(file.to_string()).or_default().push(error);
    }

    /// Record findings for a file; an empty list records nothing
    pub fn add_file_errors(&mut self, file: &str, errors: Vec<String>) {
        if !errors.is_empty() {
            self.files.entry(file.to_string()).or_default().extend(errors);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.general.is_empty() && self.files.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.general.len() + self.files.values().map(Vec::len).sum::<usize>()
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.general.extend(other.general);
        for (file, errors) in other.files {
            self.add_file_errors(&file, errors);
        }
    }

    /// `Ok(())` for a clean report, the report as an error otherwise
    pub fn into_result(self) -> TaxonomyResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TaxonomyError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.general.is_empty() {
            write!(f, "General Errors:")?;
            for error in &self.general {
                write!(f, "\n\t* {}", error)?;
            }
            writeln!(f)?;
        }
        for (file, errors) in &self.files {
            write!(f, "\nErrors for {}:", file)?;
            for error in errors {
                write!(f, "\n\t* {}", error)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_layout() {
        let mut report = ValidationReport::new();
        report.add_general("Missing mapping for 'r1'".to_string());
        report.add_file_error("r2_to_r4.tsv", "'r2' is mapped to 'r4', expected 'r3'".to_string());

        assert_eq!(
            report.to_string(),
            "General Errors:\n\t* Missing mapping for 'r1'\n\
             \nErrors for r2_to_r4.tsv:\n\t* 'r2' is mapped to 'r4', expected 'r3'\n"
        );
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationReport::new().into_result().is_ok());

        let mut report = ValidationReport::new();
        report.add_file_errors("a", vec![]);
        assert!(report.is_valid());

        report.add_file_errors("a", vec!["bad".to_string()]);
        assert!(matches!(
            report.into_result(),
            Err(TaxonomyError::Validation(r)) if r.error_count() == 1
        ));
    }

    #[test]
    fn test_merge() {
        let mut first = ValidationReport::new();
        first.add_file_error("a", "one".to_string());
        let mut second = ValidationReport::new();
        second.add_file_error("a", "two".to_string());
        second.add_general("three".to_string());

        first.merge(second);
        assert_eq!(first.files["a"], vec!["one".to_string(), "two".to_string()]);
        assert_eq!(first.general, vec!["three".to_string()]);
    }
}
