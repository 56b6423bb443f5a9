// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
Release identifiers.

A release is either dated (`oncotree_YYYY_MM_DD`) or one of a few fixed
symbolic names. Only dated releases take part in the chronological chain that
mapping files connect.
*/

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;

use crate::{TaxonomyError, TaxonomyResult};

/// Prefix shared by every release identifier
pub const RELEASE_PREFIX: &str = "oncotree_";

pub const DEVELOPMENT_RELEASE: &str = "oncotree_development";
pub const CANDIDATE_RELEASE: &str = "oncotree_candidate_release";
pub const LEGACY_RELEASE: &str = "oncotree_legacy_1.1";
pub const LATEST_STABLE_RELEASE: &str = "oncotree_latest_stable";

/// Symbolic releases that are valid without an embedded date
pub const SYMBOLIC_RELEASES: &[&str] = &[
    DEVELOPMENT_RELEASE,
    CANDIDATE_RELEASE,
    LEGACY_RELEASE,
    LATEST_STABLE_RELEASE,
];

/// Identifier of one taxonomy release
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReleaseId {
    Dated { name: String, date: NaiveDate },
    Symbolic(String),
}

impl ReleaseId {
    /// Parse a release identifier (no file extension)
    pub fn parse(name: &str) -> TaxonomyResult<Self> {
        if let Some(date) = parse_release_date(name) {
            return Ok(ReleaseId::Dated {
                name: name.to_string(),
                date,
            });
        }
        if SYMBOLIC_RELEASES.contains(&name) {
            return Ok(ReleaseId::Symbolic(name.to_string()));
        }
        Err(TaxonomyError::InvalidReleaseName(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            ReleaseId::Dated { name, .. } => name,
            ReleaseId::Symbolic(name) => name,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ReleaseId::Dated { date, .. } => Some(*date),
            ReleaseId::Symbolic(_) => None,
        }
    }

    /// `true` for a name that only points at another release and is never
    /// stored as a tree file of its own
    pub fn is_alias(&self) -> bool {
        matches!(self, ReleaseId::Symbolic(name) if name == LATEST_STABLE_RELEASE)
    }
}

/// Extract the date from `oncotree_YYYY_MM_DD`
fn parse_release_date(name: &str) -> Option<NaiveDate> {
    let rest = name.strip_prefix(RELEASE_PREFIX)?;
    // chrono accepts unpadded fields, the file naming does not
    if rest.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(rest, "%Y_%m_%d").ok()
}

impl Ord for ReleaseId {
    /// Dated releases first in chronological order, then symbolic ones by name
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                ReleaseId::Dated { date: a, name: na },
                ReleaseId::Dated { date: b, name: nb },
            ) => a.cmp(b).then_with(|| na.cmp(nb)),
            (ReleaseId::Dated { .. }, ReleaseId::Symbolic(_)) => Ordering::Less,
            (ReleaseId::Symbolic(_), ReleaseId::Dated { .. }) => Ordering::Greater,
            (ReleaseId::Symbolic(a), ReleaseId::Symbolic(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ReleaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dated_release() {
        let release = ReleaseId::parse("oncotree_2021_11_02").unwrap();
        assert_eq!(release.date(), NaiveDate::from_ymd_opt(2021, 11, 2));
        assert_eq!(release.name(), "oncotree_2021_11_02");
        assert!(!release.is_alias());
    }

    #[test]
    fn test_parse_symbolic_release() {
        let release = ReleaseId::parse("oncotree_development").unwrap();
        assert_eq!(release.date(), None);
        assert!(!release.is_alias());
        assert!(ReleaseId::parse("oncotree_latest_stable").unwrap().is_alias());
        assert_eq!(release.to_string(), "oncotree_development");
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in [
            "oncotree_2021_1_02",
            "oncotree_2021_1_002",
            "oncotree_2021_13_02",
            "oncotree_2021-11-02",
            "oncotree_2021_11_02.json",
            "tree_2021_11_02",
            "oncotree_latest",
        ] {
            assert!(
                matches!(ReleaseId::parse(name), Err(TaxonomyError::InvalidReleaseName(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_ordering() {
        let mut releases = vec![
            ReleaseId::parse("oncotree_development").unwrap(),
            ReleaseId::parse("oncotree_2021_11_02").unwrap(),
            ReleaseId::parse("oncotree_2019_03_01").unwrap(),
        ];
        releases.sort();
        let names: Vec<&str> = releases.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["oncotree_2019_03_01", "oncotree_2021_11_02", "oncotree_development"]
        );
    }
}
