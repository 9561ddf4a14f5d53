// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test identifiers, per-test metadata and the ordered test list.

use crate::errors::SelectionError;
use camino::Utf8PathBuf;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt,
    fs,
};

/// An opaque identifier naming a single test case, e.g.
/// `sampletest.hellotest.PassedCase`.
///
/// Identifiers are dotted paths; a prefix of an identifier names the module
/// or class containing it.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Creates a new test identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The lifecycle status of a test case.
///
/// The variant names are the exact strings accepted by `--status`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, ValueEnum)]
pub enum TestStatus {
    /// The test is being designed.
    #[value(name = "Design")]
    Design,
    /// The test is being implemented.
    #[value(name = "Implement")]
    Implement,
    /// The test is ready to run.
    #[value(name = "Ready")]
    Ready,
    /// The test is under review.
    #[value(name = "Review")]
    Review,
    /// The test is suspended and should not normally run.
    #[value(name = "Suspended")]
    Suspended,
}

impl TestStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TestStatus::Design => "Design",
            TestStatus::Implement => "Implement",
            TestStatus::Ready => "Ready",
            TestStatus::Review => "Review",
            TestStatus::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The priority of a test case.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, ValueEnum)]
pub enum Priority {
    /// Build verification test: run on every build.
    #[value(name = "BVT")]
    Bvt,
    /// High priority.
    #[value(name = "High")]
    High,
    /// Normal priority.
    #[value(name = "Normal")]
    Normal,
    /// Low priority.
    #[value(name = "Low")]
    Low,
}

impl Priority {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Priority::Bvt => "BVT",
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a test case, matched against
/// [`SelectionCriteria`](crate::selection::SelectionCriteria).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestMeta {
    /// The lifecycle status.
    pub status: TestStatus,
    /// The priority.
    pub priority: Priority,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// The owners of this test.
    pub owners: BTreeSet<String>,
}

/// An ordered list of test cases with their metadata.
///
/// Order is significant: selection preserves it, and the serial strategy
/// executes in it.
#[derive(Clone, Debug, Default)]
pub struct TestList {
    entries: Vec<(TestId, TestMeta)>,
}

impl TestList {
    /// Creates a test list from ordered entries.
    pub fn new(entries: Vec<(TestId, TestMeta)>) -> Self {
        Self { entries }
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &(TestId, TestMeta)> + '_ {
        self.entries.iter()
    }

    /// The number of tests in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the subset of this list matched by the given patterns,
    /// preserving this list's order.
    ///
    /// A pattern matches a test if it equals the test's identifier, or if
    /// it is a dotted-path prefix of it (so `sampletest.hellotest` matches
    /// every test in that module). A pattern that matches nothing is an
    /// error: the original arguments named a test that does not exist.
    pub fn candidate_subset(&self, patterns: &[String]) -> Result<TestList, SelectionError> {
        // A single ordered pass so that list order wins even when patterns
        // interleave or overlap.
        let entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(test_id, _)| patterns.iter().any(|pat| pattern_matches(pat, test_id)))
            .cloned()
            .collect();
        for pattern in patterns {
            if !self
                .entries
                .iter()
                .any(|(test_id, _)| pattern_matches(pattern, test_id))
            {
                return Err(SelectionError::UnknownTest {
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(TestList::new(entries))
    }
}

fn pattern_matches(pattern: &str, test_id: &TestId) -> bool {
    let id = test_id.as_str();
    id == pattern
        || (id.len() > pattern.len()
            && id.starts_with(pattern)
            && id.as_bytes()[pattern.len()] == b'.')
}

/// Expands command-line test arguments, replacing `@file` references with
/// the identifiers listed in that file (one per line, `#` comments and
/// blank lines ignored).
pub fn expand_test_args(args: &[String]) -> Result<Vec<String>, SelectionError> {
    let mut patterns = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(path) = arg.strip_prefix('@') {
            let path = Utf8PathBuf::from(path);
            let contents =
                fs::read_to_string(&path).map_err(|error| SelectionError::TestFileRead {
                    path: path.clone(),
                    error,
                })?;
            patterns.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        } else {
            patterns.push(arg.clone());
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::sample_test_list;
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn ids(list: &TestList) -> Vec<&str> {
        list.iter().map(|(id, _)| id.as_str()).collect()
    }

    #[test]
    fn candidate_subset_exact_and_prefix() {
        let list = sample_test_list();
        let subset = list
            .candidate_subset(&["sampletest.hellotest".to_owned()])
            .unwrap();
        assert_eq!(
            ids(&subset),
            vec![
                "sampletest.hellotest.PassedCase",
                "sampletest.hellotest.FailedCase",
                "sampletest.hellotest.CrashCase",
            ],
        );

        let subset = list
            .candidate_subset(&["sampletest.hellotest.PassedCase".to_owned()])
            .unwrap();
        assert_eq!(ids(&subset), vec!["sampletest.hellotest.PassedCase"]);
    }

    #[test]
    fn candidate_subset_dedupes_and_keeps_list_order() {
        let list = sample_test_list();
        let subset = list
            .candidate_subset(&[
                "sampletest.hellotest.FailedCase".to_owned(),
                "sampletest.hellotest".to_owned(),
            ])
            .unwrap();
        // FailedCase appears once, in list order, not argument order.
        assert_eq!(
            ids(&subset),
            vec![
                "sampletest.hellotest.PassedCase",
                "sampletest.hellotest.FailedCase",
                "sampletest.hellotest.CrashCase",
            ],
        );
    }

    #[test]
    fn candidate_subset_unknown_pattern() {
        let list = sample_test_list();
        let err = list
            .candidate_subset(&["sampletest.nope".to_owned()])
            .unwrap_err();
        assert!(matches!(
            err,
            SelectionError::UnknownTest { pattern } if pattern == "sampletest.nope"
        ));
    }

    #[test]
    fn prefix_must_end_at_a_dot() {
        let list = sample_test_list();
        // "sampletest.hello" is not a dotted prefix of "sampletest.hellotest.*".
        list.candidate_subset(&["sampletest.hello".to_owned()])
            .unwrap_err();
    }

    #[test]
    fn expand_test_args_reads_files() {
        let dir = Utf8TempDir::new().unwrap();
        let path = dir.path().join("tests.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "a.b.First").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  a.b.Second  ").unwrap();
        drop(file);

        let args = vec![format!("@{path}"), "c.d.Third".to_owned()];
        let patterns = expand_test_args(&args).unwrap();
        assert_eq!(patterns, vec!["a.b.First", "a.b.Second", "c.d.Third"]);
    }

    #[test]
    fn expand_test_args_missing_file() {
        let err = expand_test_args(&["@does-not-exist.txt".to_owned()]).unwrap_err();
        assert!(matches!(err, SelectionError::TestFileRead { .. }));
    }
}
