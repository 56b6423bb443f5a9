// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Legacy tab-delimited tumor type export.
//!
//! One column per level below the root (`level_1..level_N`) followed by the
//! metadata columns. Rows are written depth first with siblings ordered by
//! name; each row fills the cells of its ancestors and itself as
//! `Name (CODE)` and leaves deeper level cells empty.

use std::fmt::Write as _;

use crate::tree::{Node, Tree};
use crate::TaxonomyResult;

const METADATA_COLUMNS: &str = "metamaintype\tmetacolor\tmetanci\tmetaumls\thistory";

fn sorted_children<'a>(tree: &'a Tree, node: &'a Node) -> Vec<&'a Node> {
    let mut children: Vec<&Node> = tree.children(node).collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));
    children
}

fn write_rows(tree: &Tree, node: &Node, path: &mut Vec<String>, depth: usize, out: &mut String) {
    path.push(format!("{} ({})", node.name, node.code));

    let mut cells = path.clone();
    cells.resize(depth, String::new());
    let _ = writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}",
        cells.join("\t"),
        node.main_type.as_deref().unwrap_or(""),
        node.color.as_deref().unwrap_or(""),
        node.external_references.nci.join(","),
        node.external_references.umls.join(","),
        node.history.join(",")
    );

    for child in sorted_children(tree, node) {
        write_rows(tree, child, path, depth, out);
    }
    path.pop();
}

/// Render the export for a tree
pub fn export_tumor_types_tsv(tree: &Tree) -> TaxonomyResult<String> {
    let root = tree.root()?;
    let mut depth = 0u32;
    tree.bfs(|_, level| depth = depth.max(level))?;
    let depth = depth as usize;

    let mut out = String::new();
    for level in 1..=depth {
        let _ = write!(out, "level_{}\t", level);
    }
    out.push_str(METADATA_COLUMNS);
    out.push('\n');

    let mut path = Vec::with_capacity(depth);
    for child in sorted_children(tree, root) {
        write_rows(tree, child, &mut path, depth, &mut out);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_layout() {
        let mut tree = Tree::new();
        tree.insert(Node::new("TISSUE", "Tissue")).unwrap();
        let mut skin = Node::new("SKIN", "Skin").with_parent("TISSUE");
        skin.color = Some("Black".to_string());
        tree.insert(skin).unwrap();
        let mut mel = Node::new("MEL", "Melanoma").with_parent("SKIN");
        mel.main_type = Some("Melanoma".to_string());
        mel.external_references.nci = vec!["C3224".to_string(), "C9999".to_string()];
        tree.insert(mel).unwrap();
        tree.insert(Node::new("BONE", "Bone").with_parent("TISSUE"))
            .unwrap();
        tree.link();
        tree.assign_levels().unwrap();

        let export = export_tumor_types_tsv(&tree).unwrap();
        let lines: Vec<&str> = export.lines().collect();
        assert_eq!(
            lines,
            vec![
                "level_1\tlevel_2\tmetamaintype\tmetacolor\tmetanci\tmetaumls\thistory",
                "Bone (BONE)\t\t\t\t\t\t",
                "Skin (SKIN)\t\t\tBlack\t\t\t",
                "Skin (SKIN)\tMelanoma (MEL)\tMelanoma\t\tC3224,C9999\t\t",
            ]
        );
    }
}
