// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Breadth-first traversal and the views built on it.

use ahash::AHashSet;
use std::collections::{BTreeSet, VecDeque};

use super::{Node, Tree};
use crate::TaxonomyResult;

impl Tree {
    /// Visit every node reachable from the root in level order
    ///
    /// The visitor receives each node with its hop distance from the root;
    /// all nodes at depth `d` are visited before any node at depth `d + 1`.
    ///
    /// # Errors
    ///
    /// `RootCount` unless the tree has exactly one top-level entry
    pub fn bfs<F>(&self, mut visit: F) -> TaxonomyResult<()>
    where
        F: FnMut(&Node, u32),
    {
        let root = self.root()?;
        let mut queue = VecDeque::from([(root, 0u32)]);
        while let Some((node, depth)) = queue.pop_front() {
            visit(node, depth);
            for child in self.children(node) {
                queue.push_back((child, depth + 1));
            }
        }
        Ok(())
    }

    /// Every code in the tree
    pub fn code_set(&self) -> TaxonomyResult<AHashSet<String>> {
        let mut codes = AHashSet::with_capacity(self.len());
        self.bfs(|node, _| {
            codes.insert(node.code.clone());
        })?;
        Ok(codes)
    }

    /// Distinct non-empty main types, sorted
    pub fn main_types(&self) -> TaxonomyResult<Vec<String>> {
        let mut main_types = BTreeSet::new();
        self.bfs(|node, _| {
            if let Some(main_type) = node.main_type.as_deref().filter(|m| !m.is_empty()) {
                main_types.insert(main_type.to_string());
            }
        })?;
        Ok(main_types.into_iter().collect())
    }

    /// All nodes except the root, in level order
    pub fn flatten(&self) -> TaxonomyResult<Vec<&Node>> {
        let mut codes = Vec::with_capacity(self.len());
        self.bfs(|node, depth| {
            if depth > 0 {
                codes.push(node.code.clone());
            }
        })?;
        Ok(codes.iter().filter_map(|code| self.get(code)).collect())
    }
}
