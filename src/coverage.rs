use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::mutants::{Mutant, Test};

/// What the current run's test runner reported about coverage.
pub trait TestCoverage {
    /// False when the runner collected no coverage at all.
    fn has_coverage(&self) -> bool;

    /// Tests that ran while the mutant was active. `None` if nothing was recorded for it.
    fn covering_tests(&self, mutant_id: &str) -> Option<Vec<&Test>>;

    /// True for mutants in code that runs while test files load, covered by the whole suite.
    fn has_static_coverage(&self, mutant_id: &str) -> bool;

    /// Every test the runner knows about.
    fn tests(&self) -> Vec<&Test>;

    /// Register a test that did not run this time but still exists.
    fn add_test(&mut self, test: Test);
}

/// Coverage held in memory, as read from a runner's coverage dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryCoverage {
    #[serde(default)]
    pub has_coverage: bool,
    /// Registry of tests by id.
    #[serde(default)]
    pub tests_by_id: BTreeMap<String, Test>,
    /// Ids of the tests that covered each mutant id.
    #[serde(default)]
    pub per_mutant: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub static_mutants: BTreeSet<String>,
}

impl InMemoryCoverage {
    /// A runner that reported tests but no coverage.
    pub fn without_coverage(tests: impl IntoIterator<Item = Test>) -> Self {
        Self {
            has_coverage: false,
            tests_by_id: tests.into_iter().map(|t| (t.id.clone(), t)).collect(),
            per_mutant: BTreeMap::new(),
            static_mutants: BTreeSet::new(),
        }
    }

    pub fn with_tests(tests: impl IntoIterator<Item = Test>) -> Self {
        Self {
            has_coverage: true,
            ..Self::without_coverage(tests)
        }
    }

    pub fn cover(mut self, mutant_id: impl Into<String>, test_ids: &[&str]) -> Self {
        self.per_mutant.insert(
            mutant_id.into(),
            test_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn cover_statically(mut self, mutant_id: impl Into<String>) -> Self {
        self.static_mutants.insert(mutant_id.into());
        self
    }

    pub fn test(&self, id: &str) -> Option<&Test> {
        self.tests_by_id.get(id)
    }
}

impl TestCoverage for InMemoryCoverage {
    fn has_coverage(&self) -> bool {
        self.has_coverage
    }

    fn covering_tests(&self, mutant_id: &str) -> Option<Vec<&Test>> {
        if self.static_mutants.contains(mutant_id) {
            return Some(self.tests_by_id.values().collect());
        }
        let ids = self.per_mutant.get(mutant_id)?;
        Some(ids.iter().filter_map(|id| self.tests_by_id.get(id)).collect())
    }

    fn has_static_coverage(&self, mutant_id: &str) -> bool {
        self.static_mutants.contains(mutant_id)
    }

    fn tests(&self) -> Vec<&Test> {
        self.tests_by_id.values().collect()
    }

    fn add_test(&mut self, test: Test) {
        self.tests_by_id.insert(test.id.clone(), test);
    }
}

/// Per previous mutant key: which test keys covered it and which killed it.
///
/// Killing tests are always part of the covering set, even when the report
/// that fed the matrix did not list them there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageMatrix {
    covered: HashMap<String, BTreeSet<String>>,
    killed: HashMap<String, BTreeSet<String>>,
}

impl CoverageMatrix {
    /// `test_keys_by_id` resolves the previous run's test ids; unknown ids are skipped.
    pub fn build<'a>(
        mutants: impl IntoIterator<Item = (&'a str, &'a Mutant)>,
        test_keys_by_id: &HashMap<String, String>,
    ) -> Self {
        let mut matrix = Self::default();
        for (mutant_key, mutant) in mutants {
            let resolve = |ids: &Option<Vec<String>>| -> BTreeSet<String> {
                ids.iter()
                    .flatten()
                    .filter_map(|id| test_keys_by_id.get(id).cloned())
                    .collect()
            };
            let killed = resolve(&mutant.killed_by);
            let mut covered = resolve(&mutant.covered_by);
            covered.extend(killed.iter().cloned());

            matrix.covered.insert(mutant_key.to_string(), covered);
            matrix.killed.insert(mutant_key.to_string(), killed);
        }
        matrix
    }

    pub fn covered_by(&self, mutant_key: &str) -> Option<&BTreeSet<String>> {
        self.covered.get(mutant_key)
    }

    pub fn killed_by(&self, mutant_key: &str) -> Option<&BTreeSet<String>> {
        self.killed.get(mutant_key)
    }
}
