// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection criteria: which candidate tests actually run.

use crate::test_list::{Priority, TestId, TestList, TestMeta, TestStatus};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use tracing::debug;

/// The set-based filters a test's metadata is matched against.
///
/// Each populated field constrains the match; an empty field is no
/// constraint. Excluded tags are always subtractive, even when the same
/// tag is also included.
#[derive(Clone, Debug, Default)]
pub struct SelectionCriteria {
    /// Statuses to include.
    pub statuses: BTreeSet<TestStatus>,
    /// Priorities to include.
    pub priorities: BTreeSet<Priority>,
    /// Tags to include (a test needs at least one).
    pub included_tags: BTreeSet<String>,
    /// Tags to exclude (a test with any of these never runs).
    pub excluded_tags: BTreeSet<String>,
    /// Owners to include (a test needs at least one).
    pub owners: BTreeSet<String>,
}

impl SelectionCriteria {
    /// Matches a single test's metadata against these criteria.
    pub fn matches(&self, meta: &TestMeta) -> FilterMatch {
        if !self.statuses.is_empty() && !self.statuses.contains(&meta.status) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::Status,
            };
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&meta.priority) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::Priority,
            };
        }
        if !self.included_tags.is_empty() && self.included_tags.is_disjoint(&meta.tags) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::Tag,
            };
        }
        if !self.excluded_tags.is_disjoint(&meta.tags) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::ExcludedTag,
            };
        }
        if !self.owners.is_empty() && self.owners.is_disjoint(&meta.owners) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::Owner,
            };
        }
        FilterMatch::Matches
    }

    /// Filters a candidate list down to the tests that will run,
    /// preserving the list's order.
    ///
    /// This is a pure function of the criteria and the list: no side
    /// effects, and selecting a selection returns it unchanged.
    pub fn select(&self, list: &TestList) -> Vec<TestId> {
        list.iter()
            .filter(|(test_id, meta)| match self.matches(meta) {
                FilterMatch::Matches => true,
                FilterMatch::Mismatch { reason } => {
                    debug!("skipping {test_id}: {reason}");
                    false
                }
            })
            .map(|(test_id, _)| test_id.clone())
            .collect()
    }
}

/// Whether a test matches the selection criteria.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum FilterMatch {
    /// This test matches all criteria.
    Matches,
    /// This test does not match.
    Mismatch {
        /// The first criterion it fell out on.
        reason: MismatchReason,
    },
}

impl FilterMatch {
    /// Returns true if the test matches.
    pub fn is_match(&self) -> bool {
        matches!(self, FilterMatch::Matches)
    }
}

/// The reason a test was filtered out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchReason {
    /// The test's status is not among the requested statuses.
    Status,
    /// The test's priority is not among the requested priorities.
    Priority,
    /// The test carries none of the requested tags.
    Tag,
    /// The test carries an excluded tag.
    ExcludedTag,
    /// The test has none of the requested owners.
    Owner,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::Status => write!(f, "status not requested"),
            MismatchReason::Priority => write!(f, "priority not requested"),
            MismatchReason::Tag => write!(f, "no requested tag"),
            MismatchReason::ExcludedTag => write!(f, "tag is excluded"),
            MismatchReason::Owner => write!(f, "owner not requested"),
        }
    }
}
