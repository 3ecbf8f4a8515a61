//! Decides which results of a previous run can be carried into the current one.
//!
//! Previous mutants and tests are moved to their new locations with a text diff
//! of each file, matched to the current run by content-derived keys, and reused
//! when the tests that covered or killed them did not change in a way that
//! could change the outcome.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, info, trace, warn};

use crate::coverage::{CoverageMatrix, TestCoverage};
use crate::keys::{mutant_key, relative_file_name, test_key};
use crate::mutants::{Mutant, Test};
use crate::options::DiffOptions;
use crate::position_diff::diff_texts;
use crate::remap::{Remapped, remap_locations};
use crate::report::IncrementalReport;
use crate::reuse::{RerunReason, ReuseCandidate, ReuseDecision, ReusePolicy};
use crate::stats::{Change, DiffStatistics};
use crate::test_spans::{LocatedTest, close_locations};

/// Current contents of the project's files, by project-relative, `/`-separated name.
pub trait SourceLookup {
    fn source(&self, relative_file_name: &str) -> Option<&str>;
}

impl SourceLookup for HashMap<String, String> {
    fn source(&self, relative_file_name: &str) -> Option<&str> {
        self.get(relative_file_name).map(String::as_str)
    }
}

impl SourceLookup for BTreeMap<String, String> {
    fn source(&self, relative_file_name: &str) -> Option<&str> {
        self.get(relative_file_name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Current mutants, reused ones carrying their previous result, followed by
    /// carried-over results from code outside this run's mutation scope.
    pub mutants: Vec<Mutant>,
    pub mutant_stats: DiffStatistics,
    pub test_stats: DiffStatistics,
    pub reused: usize,
    pub carried_over: usize,
}

pub struct IncrementalDiffer {
    options: DiffOptions,
}

impl IncrementalDiffer {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Correct `current_mutants` with the reusable results of `previous`.
    ///
    /// Tests known to `previous` that did not run this time are registered with
    /// `coverage`, so killed-by and covered-by references to them stay resolvable.
    pub fn diff<C, S>(
        &self,
        current_mutants: Vec<Mutant>,
        coverage: &mut C,
        previous: &IncrementalReport,
        sources: &S,
    ) -> DiffOutcome
    where
        C: TestCoverage + ?Sized,
        S: SourceLookup + ?Sized,
    {
        let mut ctx = DiffContext::new(&self.options);

        let previous_mutants = ctx.collect_previous_mutants(previous, sources);
        let previous_tests = ctx.collect_previous_tests(previous, sources);
        let matrix = CoverageMatrix::build(
            previous_mutants
                .entries
                .iter()
                .map(|entry| (entry.key.as_str(), &entry.mutant)),
            &previous_tests.keys_by_id,
        );

        let mut test_ids_by_key = ctx.collect_current_tests(&*coverage, &previous_tests);
        let suite_keys: HashSet<String> = test_ids_by_key.keys().cloned().collect();
        ctx.restore_missing_tests(&previous_tests, &mut test_ids_by_key, coverage);

        let policy = ReusePolicy {
            force: self.options.force,
            has_coverage: coverage.has_coverage(),
            current_test_keys: &suite_keys,
        };
        let ids_for = |keys: Option<&BTreeSet<String>>| -> Vec<String> {
            keys.into_iter()
                .flatten()
                .filter_map(|key| test_ids_by_key.get(key).cloned())
                .collect()
        };

        let total = current_mutants.len();
        let mut seen_keys = HashSet::with_capacity(total);
        let mut reused = 0;
        let mut results = Vec::with_capacity(total);

        for mutant in current_mutants {
            let relative = ctx.relative(&mutant.file_name);
            let key = mutant_key(&mutant, &relative);
            seen_keys.insert(key.clone());

            let Some(previous_mutant) = previous_mutants.get(&key) else {
                if !relative.is_empty() {
                    ctx.record_mutants(&relative, Change::Added, 1);
                }
                results.push(mutant);
                continue;
            };
            let Some(previous_status) = previous_mutant.status else {
                results.push(mutant);
                continue;
            };

            let covering = coverage.covering_tests(&mutant.id);
            let covering_keys: Option<Vec<String>> = covering
                .as_ref()
                .map(|tests| tests.iter().map(|t| ctx.test_key(t)).collect());
            let candidate = ReuseCandidate {
                previous_status,
                current_covering: covering_keys.as_deref(),
                previous_covering: matrix.covered_by(&key),
                previous_killing: matrix.killed_by(&key),
                is_static: coverage.has_static_coverage(&mutant.id),
            };

            match policy.decide(&candidate) {
                ReuseDecision::Reuse => {
                    reused += 1;
                    let covered_by = covering
                        .iter()
                        .flatten()
                        .map(|t| t.id.clone())
                        .collect();
                    results.push(Mutant {
                        status: Some(previous_status),
                        status_reason: previous_mutant.status_reason.clone(),
                        tests_completed: previous_mutant.tests_completed,
                        covered_by: Some(covered_by),
                        killed_by: Some(ids_for(matrix.killed_by(&key))),
                        ..mutant
                    });
                }
                ReuseDecision::Rerun(reason) => {
                    if reason == RerunReason::KillingTestsUnknown {
                        warn!(
                            "Mutant {} was killed before, but by no test that can be resolved; \
                             does the test runner report killedBy?",
                            key.replace('\n', " ")
                        );
                    }
                    trace!("Re-running {} ({})", key.replace('\n', " "), reason);
                    results.push(mutant);
                }
            }
        }

        let mut carried_over = 0;
        for entry in &previous_mutants.entries {
            if seen_keys.contains(&entry.key) {
                continue;
            }
            if self
                .options
                .scope
                .targets(&entry.relative_file_name, &entry.mutant.location)
            {
                // Still mutated this run, yet no longer generated.
                ctx.record_mutants(&entry.relative_file_name, Change::Removed, 1);
                continue;
            }
            if !entry.mutant.has_result() {
                // Nothing to carry; it was never run.
                continue;
            }
            carried_over += 1;
            results.push(Mutant {
                id: entry.key.clone(),
                file_name: ctx.absolute(&entry.relative_file_name),
                covered_by: Some(ids_for(matrix.covered_by(&entry.key))),
                killed_by: Some(ids_for(matrix.killed_by(&entry.key))),
                ..entry.mutant.clone()
            });
        }

        let outcome = ctx.finish(results, reused, carried_over);
        outcome.log_summary(total);
        outcome
    }
}

impl DiffOutcome {
    fn log_summary(&self, current_total: usize) {
        info!(
            "Incremental report:\n\tMutants:\t{}\n\tTests:\t\t{}\n\tResult:\t\t{} of {} mutant result(s) are reused.",
            self.mutant_stats.totals_report(),
            self.test_stats.totals_report(),
            self.reused,
            current_total
        );
        if self.carried_over > 0 {
            info!(
                "{} mutant result(s) outside the mutation scope carried over",
                self.carried_over
            );
        }
        for line in self.mutant_stats.detailed_report() {
            debug!("Mutants: {}", line);
        }
        for line in self.test_stats.detailed_report() {
            debug!("Tests: {}", line);
        }
    }
}

struct PreviousMutant {
    key: String,
    relative_file_name: String,
    mutant: Mutant,
}

/// Previous mutants that survived remapping, in report order. A later duplicate key
/// replaces the earlier entry.
#[derive(Default)]
struct PreviousMutants {
    entries: Vec<PreviousMutant>,
    by_key: HashMap<String, usize>,
}

impl PreviousMutants {
    fn insert(&mut self, entry: PreviousMutant) {
        match self.by_key.get(&entry.key) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.by_key.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn get(&self, key: &str) -> Option<&Mutant> {
        self.by_key.get(key).map(|&idx| &self.entries[idx].mutant)
    }
}

struct PreviousTest {
    key: String,
    relative_file_name: String,
    test: Test,
}

#[derive(Default)]
struct PreviousTests {
    entries: Vec<PreviousTest>,
    by_key: HashMap<String, usize>,
    keys_by_id: HashMap<String, String>,
}

impl PreviousTests {
    fn insert(&mut self, entry: PreviousTest) {
        self.keys_by_id
            .insert(entry.test.id.clone(), entry.key.clone());
        match self.by_key.get(&entry.key) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.by_key.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }
}

/// Working state of one `diff` call.
struct DiffContext<'o> {
    options: &'o DiffOptions,
    mutant_stats: DiffStatistics,
    test_stats: DiffStatistics,
}

impl<'o> DiffContext<'o> {
    fn new(options: &'o DiffOptions) -> Self {
        Self {
            options,
            mutant_stats: DiffStatistics::new(),
            test_stats: DiffStatistics::new(),
        }
    }

    fn relative(&self, file_name: &str) -> String {
        relative_file_name(&self.options.project_root, file_name)
    }

    fn absolute(&self, relative_file_name: &str) -> String {
        self.options.project_root.join(relative_file_name).into_string()
    }

    fn test_key(&self, test: &Test) -> String {
        let relative = self.relative(test.file_name.as_deref().unwrap_or_default());
        test_key(test, &relative)
    }

    fn record_mutants(&mut self, relative_file_name: &str, change: Change, amount: usize) {
        self.mutant_stats.count(relative_file_name, change, amount);
    }

    fn record_tests(&mut self, relative_file_name: &str, change: Change, amount: usize) {
        self.test_stats.count(relative_file_name, change, amount);
    }

    /// Remap every previous mutant into its file's current text.
    fn collect_previous_mutants<S: SourceLookup + ?Sized>(
        &mut self,
        report: &IncrementalReport,
        sources: &S,
    ) -> PreviousMutants {
        let mut previous = PreviousMutants::default();

        for (file_name, file) in &report.files {
            let relative = self.relative(file_name);
            let Some(current_source) = sources.source(&relative) else {
                // Deleted since; nothing here can be reused.
                self.record_mutants(&relative, Change::Removed, file.mutants.len());
                continue;
            };

            trace!("Diffing {}", relative);
            let chunks = diff_texts(&file.source, current_source, self.options.granularity);
            let mutants = file
                .mutants
                .iter()
                .filter(|m| m.location.start <= m.location.end)
                .cloned()
                .collect();
            let Remapped { retained, removed } = remap_locations(&chunks, mutants);
            self.record_mutants(&relative, Change::Removed, removed);

            for mutant in retained {
                previous.insert(PreviousMutant {
                    key: mutant_key(&mutant, &relative),
                    relative_file_name: relative.clone(),
                    mutant,
                });
            }
        }

        previous
    }

    /// Remap every previous test into its file's current text. Tests of files without
    /// both an old and a current source are taken as they are.
    fn collect_previous_tests<S: SourceLookup + ?Sized>(
        &mut self,
        report: &IncrementalReport,
        sources: &S,
    ) -> PreviousTests {
        let mut previous = PreviousTests::default();

        for (file_name, file) in &report.test_files {
            let relative = self.relative(file_name);
            let tests: Vec<Test> = match (file.source.as_deref(), sources.source(&relative)) {
                (Some(old_source), Some(current_source)) => {
                    trace!("Diffing {}", relative);
                    let chunks = diff_texts(old_source, current_source, self.options.granularity);
                    let located = close_locations(file.tests.clone());
                    let Remapped { retained, removed } = remap_locations(&chunks, located);
                    self.record_tests(&relative, Change::Removed, removed);
                    retained.into_iter().map(LocatedTest::into_test).collect()
                }
                _ => file.tests.clone(),
            };

            for test in tests {
                previous.insert(PreviousTest {
                    key: test_key(&test, &relative),
                    relative_file_name: relative.clone(),
                    test,
                });
            }
        }

        previous
    }

    /// Keys of the current suite, mapped to their test ids. New keys count as added tests.
    fn collect_current_tests<C: TestCoverage + ?Sized>(
        &mut self,
        coverage: &C,
        previous: &PreviousTests,
    ) -> HashMap<String, String> {
        let mut ids_by_key = HashMap::new();
        for test in coverage.tests() {
            let relative = self.relative(test.file_name.as_deref().unwrap_or_default());
            let key = test_key(test, &relative);
            if !ids_by_key.contains_key(&key) && !previous.contains_key(&key) {
                self.record_tests(&relative, Change::Added, 1);
            }
            ids_by_key.insert(key, test.id.clone());
        }
        ids_by_key
    }

    /// Register previous tests that did not run this time, with their key as id.
    fn restore_missing_tests<C: TestCoverage + ?Sized>(
        &self,
        previous: &PreviousTests,
        ids_by_key: &mut HashMap<String, String>,
        coverage: &mut C,
    ) {
        for entry in &previous.entries {
            if ids_by_key.contains_key(&entry.key) {
                continue;
            }
            let test = Test {
                id: entry.key.clone(),
                name: entry.test.name.clone(),
                file_name: Some(self.absolute(&entry.relative_file_name)),
                start_position: Some(entry.test.start()),
                location: entry.test.location,
            };
            ids_by_key.insert(entry.key.clone(), test.id.clone());
            coverage.add_test(test);
        }
    }

    fn finish(self, mutants: Vec<Mutant>, reused: usize, carried_over: usize) -> DiffOutcome {
        DiffOutcome {
            mutants,
            mutant_stats: self.mutant_stats,
            test_stats: self.test_stats,
            reused,
            carried_over,
        }
    }
}
