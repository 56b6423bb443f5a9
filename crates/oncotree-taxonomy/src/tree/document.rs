// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Persisted tree documents.

A built tree is stored as a JSON object keyed by code at every level: the top
level holds exactly one key (the root) and each node nests its children the
same way. Empty lists may have been written as `null` by older tooling, so
they are read leniently.
*/

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::{ExternalReferences, Node, Tree};
use crate::{TaxonomyError, TaxonomyResult};

/// Nested code → node document
pub type TreeDocument = BTreeMap<String, DocumentNode>;

/// One node of a persisted tree, children nested by code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub code: String,
    pub color: Option<String>,
    pub name: String,
    pub main_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_references: ExternalReferences,
    pub tissue: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: BTreeMap<String, DocumentNode>,
    pub parent: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revocations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub precursors: Vec<String>,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DocumentNode {
    fn from_node(tree: &Tree, node: &Node) -> Self {
        let children = tree
            .children(node)
            .map(|child| (child.code.clone(), DocumentNode::from_node(tree, child)))
            .collect();

        Self {
            code: node.code.clone(),
            color: node.color.clone(),
            name: node.name.clone(),
            main_type: node.main_type.clone(),
            external_references: node.external_references.clone(),
            tissue: node.tissue.clone(),
            children,
            parent: node.parent.clone(),
            history: node.history.clone(),
            level: node.level,
            revocations: node.revocations.clone(),
            precursors: node.precursors.clone(),
        }
    }

    /// Detach the node's own attributes, returning it with its children
    fn into_parts(self, parent: Option<String>, level: u32) -> (Node, BTreeMap<String, DocumentNode>) {
        let node = Node {
            code: self.code,
            name: self.name,
            color: self.color,
            main_type: self.main_type,
            external_references: self.external_references,
            tissue: self.tissue,
            parent,
            children: self.children.values().map(|child| child.code.clone()).collect(),
            history: self.history,
            level,
            revocations: self.revocations,
            precursors: self.precursors,
        };
        (node, self.children)
    }
}

impl Tree {
    /// Build the arena from a nested document
    ///
    /// Parent references and levels are taken from the nesting, not from the
    /// stored `parent`/`level` attributes.
    ///
    /// # Errors
    ///
    /// `DuplicateCodes` when a code appears on more than one node
    pub fn from_document(document: TreeDocument) -> TaxonomyResult<Tree> {
        let mut tree = Tree::new();
        let mut duplicates = Vec::new();
        let mut stack: Vec<(Option<String>, u32, DocumentNode)> = Vec::new();

        for root in document.values() {
            tree.push_top_level(root.code.clone());
        }
        for (_, root) in document.into_iter().rev() {
            stack.push((None, 0, root));
        }

        while let Some((parent, level, doc_node)) = stack.pop() {
            let (node, children) = doc_node.into_parts(parent, level);
            let code = node.code.clone();
            if let Err(rejected) = tree.insert(node) {
                if !duplicates.contains(&rejected.code) {
                    duplicates.push(rejected.code);
                }
                continue;
            }
            for (_, child) in children.into_iter().rev() {
                stack.push((Some(code.clone()), level + 1, child));
            }
        }

        if !duplicates.is_empty() {
            duplicates.sort();
            return Err(TaxonomyError::DuplicateCodes(duplicates));
        }
        Ok(tree)
    }

    /// Nested document form of the tree
    pub fn to_document(&self) -> TreeDocument {
        self.top_level
            .iter()
            .filter_map(|code| self.get(code))
            .map(|node| (node.code.clone(), DocumentNode::from_node(self, node)))
            .collect()
    }

    pub fn from_json_str(json: &str) -> TaxonomyResult<Tree> {
        let document: TreeDocument = serde_json::from_str(json)?;
        Tree::from_document(document)
    }

    pub fn to_json_string(&self) -> TaxonomyResult<String> {
        Ok(serde_json::to_string(&self.to_document())?)
    }
}

/// Structural problems in a document that the arena would silently absorb
///
/// Reports top-level count, duplicate codes, keys that differ from their
/// node's code and `parent` attributes that disagree with the nesting.
pub fn document_findings(document: &TreeDocument) -> Vec<String> {
    let mut findings = Vec::new();

    if document.len() != 1 {
        findings.push(format!("tree has {} root nodes, expected 1", document.len()));
    }

    let mut seen = ahash::AHashSet::new();
    let mut duplicates = Vec::new();
    let mut stack: Vec<(Option<&str>, &str, &DocumentNode)> = document
        .iter()
        .map(|(key, node)| (None, key.as_str(), node))
        .collect();

    while let Some((parent, key, node)) = stack.pop() {
        if key != node.code {
            findings.push(format!("node '{}' is keyed as '{}'", node.code, key));
        }
        if node.parent.as_deref() != parent {
            findings.push(format!(
                "node '{}' declares parent '{}', actual parent is '{}'",
                node.code,
                node.parent.as_deref().unwrap_or(""),
                parent.unwrap_or("")
            ));
        }
        if !seen.insert(node.code.as_str()) && !duplicates.contains(&node.code) {
            duplicates.push(node.code.clone());
        }
        for (child_key, child) in &node.children {
            stack.push((Some(node.code.as_str()), child_key.as_str(), child));
        }
    }

    if !duplicates.is_empty() {
        duplicates.sort();
        findings.push(format!(
            "the following codes have multiple nodes: {}",
            duplicates.join(", ")
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "TISSUE": {
            "code": "TISSUE", "color": null, "name": "Tissue", "mainType": null,
            "externalReferences": {"UMLS": null, "NCI": null},
            "tissue": null, "parent": null, "history": null, "level": 7,
            "revocations": [], "precursors": [],
            "children": {
                "MEL": {
                    "code": "MEL", "color": "Black", "name": "Melanoma", "mainType": "Melanoma",
                    "externalReferences": {"UMLS": ["C0025202"], "NCI": ["C3224"]},
                    "tissue": "Skin", "parent": "TISSUE", "history": [], "level": 1,
                    "revocations": ["MELA"], "precursors": [], "children": {}
                }
            }
        }
    }"#;

    #[test]
    fn test_load_nested_document() {
        let tree = Tree::from_json_str(SAMPLE).unwrap();
        assert_eq!(tree.len(), 2);
        let root = tree.root().unwrap();
        assert_eq!(root.code, "TISSUE");
        // Stored level is ignored
        assert_eq!(root.level, 0);

        let mel = tree.get("MEL").unwrap();
        assert_eq!(mel.parent.as_deref(), Some("TISSUE"));
        assert_eq!(mel.external_references.nci, vec!["C3224".to_string()]);
        assert_eq!(mel.revocations, vec!["MELA".to_string()]);
        assert_eq!(mel.level, 1);
    }

    #[test]
    fn test_document_survives_serialization() {
        let tree = Tree::from_json_str(SAMPLE).unwrap();
        let json = tree.to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let mel = &value["TISSUE"]["children"]["MEL"];
        assert_eq!(mel["mainType"], "Melanoma");
        assert_eq!(mel["parent"], "TISSUE");
        assert_eq!(mel["externalReferences"]["UMLS"][0], "C0025202");
        assert_eq!(value["TISSUE"]["history"], serde_json::json!([]));
        assert!(value["TISSUE"]["color"].is_null());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let json = r#"{"A": {"code": "A", "name": "A", "children": {
            "B": {"code": "B", "name": "B", "parent": "A", "children": {
                "C": {"code": "C", "name": "C", "parent": "B"}
            }},
            "C": {"code": "C", "name": "C", "parent": "A"}
        }}}"#;
        match Tree::from_json_str(json) {
            Err(TaxonomyError::DuplicateCodes(codes)) => assert_eq!(codes, vec!["C".to_string()]),
            other => panic!("expected duplicate codes, got {:?}", other),
        }
    }

    #[test]
    fn test_document_findings() {
        let json = r#"{
            "A": {"code": "A", "name": "A", "children": {
                "X": {"code": "B", "name": "B", "parent": "Z"}
            }},
            "D": {"code": "D", "name": "D"}
        }"#;
        let document: TreeDocument = serde_json::from_str(json).unwrap();
        let findings = document_findings(&document);
        assert!(findings.contains(&"tree has 2 root nodes, expected 1".to_string()));
        assert!(findings.contains(&"node 'B' is keyed as 'X'".to_string()));
        assert!(findings
            .contains(&"node 'B' declares parent 'Z', actual parent is 'A'".to_string()));
    }
}
