use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::mutants::MutantStatus;

/// How one covering test changed between the previous run and this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageChange {
    Same,
    Added,
    Removed,
}

/// Classify every test key that covers a mutant now or covered it before.
///
/// A static mutant is covered by the whole suite, so a previous covering test
/// that still exists counts as unchanged even when it is not listed now.
pub fn diff_test_coverage(
    current_covering: Option<&[String]>,
    previous_covering: Option<&BTreeSet<String>>,
    is_static: bool,
    current_test_keys: &HashSet<String>,
) -> BTreeMap<String, CoverageChange> {
    let mut changes = BTreeMap::new();

    for key in current_covering.into_iter().flatten() {
        let change = if previous_covering.is_some_and(|prev| prev.contains(key)) {
            CoverageChange::Same
        } else {
            CoverageChange::Added
        };
        changes.insert(key.clone(), change);
    }

    for key in previous_covering.into_iter().flatten() {
        if changes.contains_key(key) {
            continue;
        }
        let change = if is_static && current_test_keys.contains(key) {
            CoverageChange::Same
        } else {
            CoverageChange::Removed
        };
        changes.insert(key.clone(), change);
    }

    changes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunReason {
    Forced,
    PreviouslyIgnored,
    /// Killed before, but the report names no killing test we can still resolve.
    KillingTestsUnknown,
    KillingTestChanged,
    CoveringTestAdded,
}

impl fmt::Display for RerunReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Forced => "forced",
            Self::PreviouslyIgnored => "previously ignored",
            Self::KillingTestsUnknown => "killing tests unknown",
            Self::KillingTestChanged => "killing test changed or removed",
            Self::CoveringTestAdded => "new covering test",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseDecision {
    Reuse,
    Rerun(RerunReason),
}

impl ReuseDecision {
    pub fn is_reuse(&self) -> bool {
        matches!(self, Self::Reuse)
    }
}

/// Everything known about one current mutant that matched a previous result.
#[derive(Debug, Clone, Copy)]
pub struct ReuseCandidate<'a> {
    pub previous_status: MutantStatus,
    /// Keys of the tests covering the mutant in this run.
    pub current_covering: Option<&'a [String]>,
    pub previous_covering: Option<&'a BTreeSet<String>>,
    pub previous_killing: Option<&'a BTreeSet<String>>,
    pub is_static: bool,
}

/// Run-wide inputs of the reuse decision.
#[derive(Debug, Clone, Copy)]
pub struct ReusePolicy<'a> {
    pub force: bool,
    pub has_coverage: bool,
    /// Keys of every test in this run's suite.
    pub current_test_keys: &'a HashSet<String>,
}

impl ReusePolicy<'_> {
    pub fn decide(&self, candidate: &ReuseCandidate<'_>) -> ReuseDecision {
        if self.force {
            return ReuseDecision::Rerun(RerunReason::Forced);
        }
        // Without coverage a changed test cannot be detected; assume nothing relevant changed.
        if !self.has_coverage {
            return ReuseDecision::Reuse;
        }
        if candidate.previous_status == MutantStatus::Ignored {
            return ReuseDecision::Rerun(RerunReason::PreviouslyIgnored);
        }

        let changes = diff_test_coverage(
            candidate.current_covering,
            candidate.previous_covering,
            candidate.is_static,
            self.current_test_keys,
        );

        if candidate.previous_status == MutantStatus::Killed {
            let killing = match candidate.previous_killing {
                Some(killing) if !killing.is_empty() => killing,
                _ => return ReuseDecision::Rerun(RerunReason::KillingTestsUnknown),
            };
            let still_kills = killing
                .iter()
                .any(|key| changes.get(key) == Some(&CoverageChange::Same));
            return if still_kills {
                ReuseDecision::Reuse
            } else {
                ReuseDecision::Rerun(RerunReason::KillingTestChanged)
            };
        }

        if changes.values().any(|c| *c == CoverageChange::Added) {
            ReuseDecision::Rerun(RerunReason::CoveringTestAdded)
        } else {
            ReuseDecision::Reuse
        }
    }
}
