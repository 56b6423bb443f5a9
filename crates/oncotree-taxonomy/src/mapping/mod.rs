// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Code-continuity mapping files.

A mapping file connects two chronologically adjacent releases. It is named
`<old>_to_<new>.tsv` (or legacy `.txt`), starts with the header line
`<old>\t<new>` and then holds one `<oldCode>\t<newCodeOrEmpty>` row per code
of the old release:

- empty right column: the code was retired
- same code on both sides: identity continuation
- different code: a rename
*/

pub mod generator;

use std::fmt::Write as _;

use crate::{TaxonomyError, TaxonomyResult};

/// Separator between the two release identifiers in a mapping file name
pub const MAPPING_SEPARATOR: &str = "_to_";

/// File extensions recognised for mapping files
pub const MAPPING_EXTENSIONS: &[&str] = &["tsv", "txt"];

/// Release pair declared by a mapping file's name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingName {
    pub old_version: String,
    pub new_version: String,
}

impl MappingName {
    pub fn new(old_version: impl Into<String>, new_version: impl Into<String>) -> Self {
        Self {
            old_version: old_version.into(),
            new_version: new_version.into(),
        }
    }

    /// Parse `<old>_to_<new>.<ext>`
    ///
    /// # Errors
    ///
    /// `InvalidMappingName` when the extension is not recognised or the stem
    /// does not split into exactly two non-empty identifiers.
    pub fn from_file_name(file_name: &str) -> TaxonomyResult<Self> {
        let invalid = || TaxonomyError::InvalidMappingName(file_name.to_string());

        let stem = MAPPING_EXTENSIONS
            .iter()
            .find_map(|ext| file_name.strip_suffix(&format!(".{}", ext)))
            .ok_or_else(invalid)?;

        let parts: Vec<&str> = stem.split(MAPPING_SEPARATOR).collect();
        match parts.as_slice() {
            [old, new] if !old.is_empty() && !new.is_empty() => Ok(Self::new(*old, *new)),
            _ => Err(invalid()),
        }
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{}{}{}.{}",
            self.old_version, MAPPING_SEPARATOR, self.new_version, extension
        )
    }

    /// Expected header line for this pair
    pub fn header(&self) -> String {
        format!("{}\t{}", self.old_version, self.new_version)
    }
}

/// One data row of a mapping file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MappingRow {
    pub old_code: String,
    /// `None` when the code was retired
    pub new_code: Option<String>,
}

impl MappingRow {
    pub fn new(old_code: impl Into<String>, new_code: Option<String>) -> Self {
        Self {
            old_code: old_code.into(),
            new_code: new_code.filter(|code| !code.is_empty()),
        }
    }

    /// New code when the row records a true rename
    pub fn renamed_to(&self) -> Option<&str> {
        self.new_code
            .as_deref()
            .filter(|new_code| *new_code != self.old_code)
    }
}

/// Split a tab-separated line into exactly two columns
pub fn split_row(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut columns = line.split('\t');
    match (columns.next(), columns.next(), columns.next()) {
        (Some(first), Some(second), None) => Some((first, second)),
        _ => None,
    }
}

/// Parsed mapping between two releases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFile {
    pub name: MappingName,
    pub rows: Vec<MappingRow>,
}

impl MappingFile {
    pub fn new(name: MappingName) -> Self {
        Self {
            name,
            rows: Vec::new(),
        }
    }

    pub fn old_version(&self) -> &str {
        &self.name.old_version
    }

    pub fn new_version(&self) -> &str {
        &self.name.new_version
    }

    pub fn push(&mut self, old_code: impl Into<String>, new_code: Option<String>) {
        self.rows.push(MappingRow::new(old_code, new_code));
    }

    /// `(old, new)` pairs of every row that records a rename
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .iter()
            .filter_map(|row| row.renamed_to().map(|new| (row.old_code.as_str(), new)))
    }

    /// Parse file content, rejecting anything malformed
    ///
    /// The release pair comes from the header line. Use the validator for a
    /// report of every problem in a file instead of the first one.
    pub fn parse(content: &str, file: &str) -> TaxonomyResult<Self> {
        let malformed = |reason: String| TaxonomyError::MalformedMapping {
            file: file.to_string(),
            reason,
        };

        let mut lines = content.lines();
        let header = lines
            .next()
            .ok_or_else(|| malformed("file is empty".to_string()))?;
        let (old_version, new_version) =
            split_row(header).ok_or_else(|| malformed("invalid header row".to_string()))?;

        let mut mapping = MappingFile::new(MappingName::new(old_version, new_version));
        for (index, line) in lines.enumerate() {
            let (old_code, new_code) = split_row(line)
                .ok_or_else(|| malformed(format!("invalid row on line {}", index + 2)))?;
            mapping.push(old_code, Some(new_code.to_string()));
        }
        Ok(mapping)
    }

    /// Serialized form: header, rows sorted by old code, trailing newline
    pub fn to_tsv(&self) -> String {
        let mut rows: Vec<&MappingRow> = self.rows.iter().collect();
        rows.sort();

        let mut out = self.name.header();
        out.push('\n');
        for row in rows {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{}\t{}",
                row.old_code,
                row.new_code.as_deref().unwrap_or("")
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_name() {
        let name = MappingName::from_file_name("oncotree_2021_11_02_to_oncotree_2025_10_03.txt")
            .unwrap();
        assert_eq!(name.old_version, "oncotree_2021_11_02");
        assert_eq!(name.new_version, "oncotree_2025_10_03");
        assert_eq!(
            name.file_name("tsv"),
            "oncotree_2021_11_02_to_oncotree_2025_10_03.tsv"
        );
    }

    #[test]
    fn test_invalid_mapping_names() {
        for file_name in ["a_to_b_to_c.tsv", "oncotree_2021_11_02.tsv", "a_to_b.csv", "_to_b.tsv"] {
            assert!(
                matches!(
                    MappingName::from_file_name(file_name),
                    Err(TaxonomyError::InvalidMappingName(_))
                ),
                "{} should be rejected",
                file_name
            );
        }
    }

    #[test]
    fn test_row_kinds() {
        assert_eq!(MappingRow::new("A", Some("B".into())).renamed_to(), Some("B"));
        assert_eq!(MappingRow::new("A", Some("A".into())).renamed_to(), None);
        let retired = MappingRow::new("A", Some(String::new()));
        assert_eq!(retired.new_code, None);
        assert_eq!(retired.renamed_to(), None);
    }

    #[test]
    fn test_parse_mapping() {
        let content = "r1\tr2\nBRCA\tBRCA_NEW\nMEL\tMEL\nOLD\t\n";
        let mapping = MappingFile::parse(content, "r1_to_r2.tsv").unwrap();
        assert_eq!(mapping.old_version(), "r1");
        assert_eq!(mapping.new_version(), "r2");
        assert_eq!(mapping.rows.len(), 3);
        assert_eq!(mapping.renames().collect::<Vec<_>>(), vec![("BRCA", "BRCA_NEW")]);
    }

    #[test]
    fn test_parse_rejects_bad_row() {
        let content = "r1\tr2\nBRCA\tBRCA\textra\n";
        match MappingFile::parse(content, "r1_to_r2.tsv") {
            Err(TaxonomyError::MalformedMapping { reason, .. }) => {
                assert_eq!(reason, "invalid row on line 2")
            }
            other => panic!("expected malformed mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_to_tsv_sorted() {
        let mut mapping = MappingFile::new(MappingName::new("r1", "r2"));
        mapping.push("MEL", Some("MEL".into()));
        mapping.push("BRCA", None);
        assert_eq!(mapping.to_tsv(), "r1\tr2\nBRCA\t\nMEL\tMEL\n");
    }

    #[test]
    fn test_split_row_handles_crlf() {
        assert_eq!(split_row("A\tB\r"), Some(("A", "B")));
        assert_eq!(split_row("A\t"), Some(("A", "")));
        assert_eq!(split_row("A"), None);
    }
}
