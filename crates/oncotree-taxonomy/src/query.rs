// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

//! Read-only filtering of flattened trees.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::tree::Node;
use crate::TaxonomyError;

/// Levels searched when the caller does not restrict them
pub const DEFAULT_LEVELS: &str = "1,2,3,4,5,6,7";

/// Node attribute a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Code,
    Name,
    MainType,
    Color,
    Level,
    /// First NCI identifier
    Nci,
    /// First UMLS identifier
    Umls,
}

impl SearchField {
    fn value<'a>(&self, node: &'a Node) -> Option<Cow<'a, str>> {
        let value = match self {
            SearchField::Code => Some(Cow::Borrowed(node.code.as_str())),
            SearchField::Name => Some(Cow::Borrowed(node.name.as_str())),
            SearchField::MainType => node.main_type.as_deref().map(Cow::Borrowed),
            SearchField::Color => node.color.as_deref().map(Cow::Borrowed),
            SearchField::Level => Some(Cow::Owned(node.level.to_string())),
            SearchField::Nci => node.external_references.nci.first().map(|s| Cow::Borrowed(s.as_str())),
            SearchField::Umls => node.external_references.umls.first().map(|s| Cow::Borrowed(s.as_str())),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl FromStr for SearchField {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code" => Ok(SearchField::Code),
            "name" => Ok(SearchField::Name),
            "maintype" => Ok(SearchField::MainType),
            "color" => Ok(SearchField::Color),
            "level" => Ok(SearchField::Level),
            "nci" => Ok(SearchField::Nci),
            "umls" => Ok(SearchField::Umls),
            _ => Err(TaxonomyError::InvalidQuery(format!(
                "unknown search field '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchField::Code => "code",
            SearchField::Name => "name",
            SearchField::MainType => "mainType",
            SearchField::Color => "color",
            SearchField::Level => "level",
            SearchField::Nci => "nci",
            SearchField::Umls => "umls",
        };
        write!(f, "{}", name)
    }
}

/// Parse a comma-separated level list; level 0 and unparseable entries are dropped
pub fn parse_levels(levels: &str) -> BTreeSet<u32> {
    levels
        .split(',')
        .filter_map(|level| level.trim().parse::<u32>().ok())
        .filter(|level| *level != 0)
        .collect()
}

/// Case-insensitive node filter
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub field: SearchField,
    query: String,
    pub exact: bool,
    pub levels: BTreeSet<u32>,
}

impl SearchQuery {
    pub fn new(field: SearchField, query: &str, exact: bool, levels: &str) -> Self {
        Self {
            field,
            query: query.to_lowercase(),
            exact,
            levels: parse_levels(levels),
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        if !self.levels.contains(&node.level) {
            return false;
        }
        let Some(value) = self.field.value(node) else {
            return false;
        };
        let value = value.to_lowercase();
        if self.exact {
            value == self.query
        } else {
            value.contains(&self.query)
        }
    }
}

/// Nodes that match `query`, in their original order
pub fn search<'a>(nodes: &[&'a Node], query: &SearchQuery) -> Vec<&'a Node> {
    nodes
        .iter()
        .copied()
        .filter(|node| query.matches(node))
        .collect()
}
