// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Tree construction from a release's tab-separated source table.

The header row names the required columns in any order. Every data row
becomes one node; rows may reference parents that appear later in the file.
Problems with individual rows are collected so that one pass reports all of
them.
*/

use ahash::AHashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::precursor::PrecursorSource;
use crate::release::ReleaseId;
use crate::tree::{ExternalReferences, Node, Tree};
use crate::{TaxonomyError, TaxonomyResult};

pub const CODE_COLUMN: &str = "Code";
pub const COLOR_COLUMN: &str = "Color";
pub const NAME_COLUMN: &str = "Name";
pub const MAIN_TYPE_COLUMN: &str = "MainType";
pub const UMLS_COLUMN: &str = "UMLS";
pub const NCI_COLUMN: &str = "NCI";
pub const TISSUE_COLUMN: &str = "Tissue";
pub const PARENT_COLUMN: &str = "Parent";

/// Columns every source table must provide
pub const REQUIRED_COLUMNS: &[&str] = &[
    CODE_COLUMN,
    COLOR_COLUMN,
    NAME_COLUMN,
    MAIN_TYPE_COLUMN,
    UMLS_COLUMN,
    NCI_COLUMN,
    TISSUE_COLUMN,
    PARENT_COLUMN,
];

/// Positions of the required columns within a row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    code: usize,
    color: usize,
    name: usize,
    main_type: usize,
    umls: usize,
    nci: usize,
    tissue: usize,
    parent: usize,
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &[&str], file: &str) -> TaxonomyResult<Self> {
        let find = |column: &str| {
            header
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| TaxonomyError::MissingColumn {
                    file: file.to_string(),
                    column: column.to_string(),
                })
        };

        Ok(Self {
            code: find(CODE_COLUMN)?,
            color: find(COLOR_COLUMN)?,
            name: find(NAME_COLUMN)?,
            main_type: find(MAIN_TYPE_COLUMN)?,
            umls: find(UMLS_COLUMN)?,
            nci: find(NCI_COLUMN)?,
            tissue: find(TISSUE_COLUMN)?,
            parent: find(PARENT_COLUMN)?,
            width: header.len(),
        })
    }

    fn node(&self, cells: &[&str]) -> Node {
        Node {
            code: cells[self.code].to_string(),
            name: cells[self.name].to_string(),
            color: optional(cells[self.color]),
            main_type: optional(cells[self.main_type]),
            external_references: ExternalReferences {
                umls: list(cells[self.umls]),
                nci: list(cells[self.nci]),
            },
            tissue: optional(cells[self.tissue]),
            parent: optional(cells[self.parent]),
            ..Default::default()
        }
    }
}

fn optional(cell: &str) -> Option<String> {
    (!cell.is_empty()).then(|| cell.to_string())
}

fn list(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        Vec::new()
    } else {
        cell.split(',').map(str::to_string).collect()
    }
}

fn cells(line: &str) -> Vec<&str> {
    line.strip_suffix('\r').unwrap_or(line).split('\t').collect()
}

/// Data lines with their 1-based row numbers (header excluded, blank lines skipped)
fn data_rows<'a>(lines: impl Iterator<Item = &'a str>) -> impl Iterator<Item = (usize, &'a str)> {
    lines
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// A parsed row remembers where it came from for error reporting
struct SourceRow {
    row: usize,
    node: Node,
}

fn parse_rows(content: &str, file: &str) -> TaxonomyResult<(Vec<SourceRow>, Vec<String>)> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| TaxonomyError::MissingHeader {
            file: file.to_string(),
        })?;
    let columns = ColumnIndex::from_header(&cells(header), file)?;

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (row, line) in data_rows(lines) {
        let cells = cells(line);
        if cells.len() != columns.width {
            errors.push(format!(
                "row {}: expected {} columns, got {}",
                row,
                columns.width,
                cells.len()
            ));
            continue;
        }
        let node = columns.node(&cells);
        if node.code.is_empty() {
            errors.push(format!("row {}: empty code", row));
            continue;
        }
        rows.push(SourceRow { row, node });
    }
    Ok((rows, errors))
}

/// Parse a source table into unlinked nodes
///
/// # Errors
///
/// `MissingHeader`/`MissingColumn` for an unusable header, otherwise
/// `MalformedSource` listing every row with the wrong column count.
pub fn parse_source_table(content: &str, file: &str) -> TaxonomyResult<Vec<Node>> {
    let (rows, errors) = parse_rows(content, file)?;
    if !errors.is_empty() {
        return Err(TaxonomyError::MalformedSource {
            file: file.to_string(),
            errors,
        });
    }
    Ok(rows.into_iter().map(|row| row.node).collect())
}

/// Builds release trees, filling in precursors from the release history
pub struct TreeBuilder<'a> {
    history: &'a dyn PrecursorSource,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(history: &'a dyn PrecursorSource) -> Self {
        Self { history }
    }

    /// Build the tree for `release` from source table content
    ///
    /// Duplicate codes and parents that name no row are reported alongside
    /// malformed rows. A structure without exactly one root, or with nodes
    /// the root cannot reach, is rejected after all rows were placed.
    pub fn build_from_str(
        &self,
        release: &ReleaseId,
        content: &str,
        file: &str,
    ) -> TaxonomyResult<Tree> {
        let (rows, mut errors) = parse_rows(content, file)?;

        let mut tree = Tree::new();
        let mut row_of: AHashMap<String, usize> = AHashMap::with_capacity(rows.len());
        for SourceRow { row, node } in rows {
            let code = node.code.clone();
            match tree.insert(node) {
                Ok(()) => {
                    row_of.insert(code, row);
                }
                Err(duplicate) => errors.push(format!(
                    "row {}: duplicate code '{}' (first seen on row {})",
                    row,
                    duplicate.code,
                    row_of.get(&duplicate.code).copied().unwrap_or_default()
                )),
            }
        }

        for (code, parent) in tree.link() {
            errors.push(format!(
                "row {}: parent '{}' of '{}' does not exist",
                row_of.get(&code).copied().unwrap_or_default(),
                parent,
                code
            ));
        }

        if !errors.is_empty() {
            return Err(TaxonomyError::MalformedSource {
                file: file.to_string(),
                errors,
            });
        }

        tree.assign_levels()?;

        let resolver = self.history.resolver_for(release)?;
        let precursors = resolver.resolve(tree.nodes().map(|node| node.code.as_str()));
        debug!(
            target: "oncotree_taxonomy",
            "{}: {} codes have precursors",
            release,
            precursors.len()
        );
        tree.assign_precursors(&precursors);

        info!(
            target: "oncotree_taxonomy",
            "Built tree for {} with {} nodes",
            release,
            tree.len()
        );
        Ok(tree)
    }

    /// Build the tree for `release` from a source table on disk
    pub fn build_from_file(&self, release: &ReleaseId, path: &Path) -> TaxonomyResult<Tree> {
        let content = std::fs::read_to_string(path).map_err(|e| TaxonomyError::io(path, e))?;
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.build_from_str(release, &content, &file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precursor::NoPrecursors;

    const HEADER: &str = "Code\tColor\tName\tMainType\tUMLS\tNCI\tTissue\tParent";

    fn release() -> ReleaseId {
        ReleaseId::parse("oncotree_2021_11_02").unwrap()
    }

    fn table(rows: &[&str]) -> String {
        let mut content = HEADER.to_string();
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        content
    }

    #[test]
    fn test_build_assigns_fields_and_levels() {
        let content = table(&[
            "SKCM\tBlack\tCutaneous Melanoma\tMelanoma\tC0151779\tC3510,C4224\tSkin\tMEL",
            "TISSUE\t\tTissue\t\t\t\t\t",
            "MEL\tBlack\tMelanoma\tMelanoma\t\t\tSkin\tTISSUE",
        ]);
        let tree = TreeBuilder::new(&NoPrecursors)
            .build_from_str(&release(), &content, "oncotree_2021_11_02.txt")
            .unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root().unwrap().code, "TISSUE");

        let skcm = tree.get("SKCM").unwrap();
        assert_eq!(skcm.level, 2);
        assert_eq!(skcm.color.as_deref(), Some("Black"));
        assert_eq!(skcm.external_references.umls, vec!["C0151779".to_string()]);
        assert_eq!(
            skcm.external_references.nci,
            vec!["C3510".to_string(), "C4224".to_string()]
        );
        assert!(skcm.precursors.is_empty());

        let root = tree.get("TISSUE").unwrap();
        assert_eq!(root.color, None);
        assert_eq!(root.main_type, None);
        assert!(root.external_references.umls.is_empty());
    }

    #[test]
    fn test_header_columns_matched_by_name() {
        let content = "Parent\tCode\tName\tColor\tMainType\tNCI\tUMLS\tTissue\n\
                       \tTISSUE\tTissue\t\t\t\t\t\n\
                       TISSUE\tMEL\tMelanoma\tBlack\tMelanoma\tC3224\t\tSkin\n";
        let tree = TreeBuilder::new(&NoPrecursors)
            .build_from_str(&release(), content, "t.txt")
            .unwrap();
        let mel = tree.get("MEL").unwrap();
        assert_eq!(mel.parent.as_deref(), Some("TISSUE"));
        assert_eq!(mel.external_references.nci, vec!["C3224".to_string()]);
    }

    #[test]
    fn test_missing_header_and_column() {
        let builder = TreeBuilder::new(&NoPrecursors);
        assert!(matches!(
            builder.build_from_str(&release(), "", "empty.txt"),
            Err(TaxonomyError::MissingHeader { .. })
        ));
        match builder.build_from_str(&release(), "Code\tName\n", "short.txt") {
            Err(TaxonomyError::MissingColumn { column, .. }) => assert_eq!(column, "Color"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_row_errors_are_collected() {
        let content = table(&[
            "TISSUE\t\tTissue\t\t\t\t\t",
            "BAD\tonly three\tcolumns",
            "MEL\t\tMelanoma\t\t\t\t\tTISSUE",
            "MEL\t\tMelanoma again\t\t\t\t\tTISSUE",
            "UVM\t\tUveal\t\t\t\t\tMISSING",
        ]);
        match TreeBuilder::new(&NoPrecursors).build_from_str(&release(), &content, "t.txt") {
            Err(TaxonomyError::MalformedSource { errors, .. }) => {
                assert_eq!(
                    errors,
                    vec![
                        "row 2: expected 8 columns, got 3".to_string(),
                        "row 4: duplicate code 'MEL' (first seen on row 3)".to_string(),
                        "row 5: parent 'MISSING' of 'UVM' does not exist".to_string(),
                    ]
                );
            }
            other => panic!("expected malformed source, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let content = table(&["A\t\tA\t\t\t\t\t", "B\t\tB\t\t\t\t\t"]);
        assert!(matches!(
            TreeBuilder::new(&NoPrecursors).build_from_str(&release(), &content, "t.txt"),
            Err(TaxonomyError::RootCount(2))
        ));
    }
}
