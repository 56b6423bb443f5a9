// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
In-memory taxonomy tree.

Nodes live in a single arena keyed by code. Each node keeps the ordered codes
of its children and a non-owning back-reference to its parent code; the tree
records which codes sit at the top level. A valid tree has exactly one
top-level entry, but the arena can hold any forest so that invalid inputs can
be loaded and reported on.
*/

pub mod document;
pub mod indexer;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::precursor::PrecursorMap;
use crate::{TaxonomyError, TaxonomyResult};

pub use document::{DocumentNode, TreeDocument};

/// Identifiers of the same concept in external terminologies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReferences {
    #[serde(rename = "UMLS", default, deserialize_with = "document::null_as_default")]
    pub umls: Vec<String>,
    #[serde(rename = "NCI", default, deserialize_with = "document::null_as_default")]
    pub nci: Vec<String>,
}

/// One taxonomy node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub code: String,
    pub name: String,
    pub color: Option<String>,
    pub main_type: Option<String>,
    pub external_references: ExternalReferences,
    pub tissue: Option<String>,
    /// Code of the parent node, `None` only for the root
    pub parent: Option<String>,
    /// Child codes in insertion order
    #[serde(skip)]
    pub children: Vec<String>,
    pub history: Vec<String>,
    /// Hop distance from the root, always recomputed after construction
    pub level: u32,
    /// Curated legacy/alias codes
    pub revocations: Vec<String>,
    /// Codes from earlier releases that were renamed into this one
    pub precursors: Vec<String>,
}

impl Node {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Arena of nodes indexed by code
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: AHashMap<String, Node>,
    /// Codes in insertion order
    order: Vec<String>,
    top_level: Vec<String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Node> {
        self.nodes.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.nodes.contains_key(code)
    }

    /// Codes registered at the top level
    pub fn top_level(&self) -> &[String] {
        &self.top_level
    }

    /// The single root node
    ///
    /// # Errors
    ///
    /// `RootCount` unless exactly one top-level entry exists
    pub fn root(&self) -> TaxonomyResult<&Node> {
        match self.top_level.as_slice() {
            [code] => self
                .nodes
                .get(code)
                .ok_or_else(|| TaxonomyError::RootCount(0)),
            other => Err(TaxonomyError::RootCount(other.len())),
        }
    }

    /// Children of `node`, in insertion order
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(|code| self.nodes.get(code))
    }

    /// All nodes in insertion order (not level order, see [`Tree::bfs`])
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|code| self.nodes.get(code))
    }

    /// Add a node to the arena without linking it
    ///
    /// Returns the node back if its code is already taken.
    pub(crate) fn insert(&mut self, node: Node) -> Result<(), Node> {
        if self.nodes.contains_key(&node.code) {
            return Err(node);
        }
        self.order.push(node.code.clone());
        self.nodes.insert(node.code.clone(), node);
        Ok(())
    }

    /// Register every node under its parent (or at the top level)
    ///
    /// Returns `(code, parent)` pairs whose parent is not in the arena; those
    /// nodes stay unlinked.
    pub(crate) fn link(&mut self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();
        for code in &self.order {
            let parent = self.nodes.get(code).and_then(|node| node.parent.clone());
            match parent {
                None => self.top_level.push(code.clone()),
                Some(parent) => match self.nodes.get_mut(&parent) {
                    Some(parent_node) => parent_node.children.push(code.clone()),
                    None => dangling.push((code.clone(), parent)),
                },
            }
        }
        dangling
    }

    pub(crate) fn push_top_level(&mut self, code: String) {
        self.top_level.push(code);
    }

    /// Recompute every `level` by breadth-first traversal from the root
    ///
    /// # Errors
    ///
    /// `RootCount` for a forest, `UnreachableNodes` when some nodes cannot be
    /// reached from the root (parent cycles).
    pub fn assign_levels(&mut self) -> TaxonomyResult<()> {
        let mut levels = Vec::with_capacity(self.len());
        self.bfs(|node, depth| levels.push((node.code.clone(), depth)))?;

        if levels.len() != self.len() {
            let visited: ahash::AHashSet<&str> =
                levels.iter().map(|(code, _)| code.as_str()).collect();
            let mut unreachable: Vec<String> = self
                .order
                .iter()
                .filter(|code| !visited.contains(code.as_str()))
                .cloned()
                .collect();
            unreachable.sort();
            return Err(TaxonomyError::UnreachableNodes(unreachable));
        }

        for (code, depth) in levels {
            if let Some(node) = self.nodes.get_mut(&code) {
                node.level = depth;
            }
        }
        Ok(())
    }

    /// Set every node's precursors from `precursors` (empty when absent)
    pub fn assign_precursors(&mut self, precursors: &PrecursorMap) {
        for node in self.nodes.values_mut() {
            node.precursors = precursors.get(&node.code).cloned().unwrap_or_default();
        }
    }
}
