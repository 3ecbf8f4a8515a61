use std::collections::{BTreeSet, HashMap};

use mutator_diff::coverage::{CoverageMatrix, InMemoryCoverage, TestCoverage};
use mutator_diff::mutants::{Location, Mutant, MutantStatus, Position, Test};

fn tests() -> Vec<Test> {
    vec![
        Test::new("1", "adds").in_file("add.spec.js"),
        Test::new("2", "subtracts").in_file("sub.spec.js"),
    ]
}

fn ids(tests: Option<Vec<&Test>>) -> Option<Vec<&str>> {
    tests.map(|tests| tests.iter().map(|t| t.id.as_str()).collect())
}

#[test]
fn covering_tests_resolve_ids_to_tests() {
    let coverage = InMemoryCoverage::with_tests(tests()).cover("m1", &["2", "unknown"]);
    assert!(coverage.has_coverage());
    assert_eq!(ids(coverage.covering_tests("m1")), Some(vec!["2"]));
    assert_eq!(ids(coverage.covering_tests("m2")), None);
}

#[test]
fn static_mutants_are_covered_by_every_test() {
    let coverage = InMemoryCoverage::with_tests(tests()).cover_statically("m1");
    assert!(coverage.has_static_coverage("m1"));
    assert!(!coverage.has_static_coverage("m2"));
    assert_eq!(ids(coverage.covering_tests("m1")), Some(vec!["1", "2"]));
}

#[test]
fn without_coverage_still_knows_tests() {
    let coverage = InMemoryCoverage::without_coverage(tests());
    assert!(!coverage.has_coverage());
    assert_eq!(coverage.tests().len(), 2);
}

#[test]
fn added_tests_join_the_registry() {
    let mut coverage = InMemoryCoverage::with_tests(tests());
    coverage.add_test(Test::new("add.spec.js@0:0\nadds old", "adds old"));
    assert_eq!(coverage.tests().len(), 3);
    assert!(coverage.test("add.spec.js@0:0\nadds old").is_some());
}

#[test]
fn coverage_reads_from_json() {
    let json = r#"{
        "hasCoverage": true,
        "testsById": {
            "1": { "id": "1", "name": "adds", "fileName": "add.spec.js",
                   "startPosition": { "line": 0, "column": 0 } }
        },
        "perMutant": { "m1": ["1"] },
        "staticMutants": ["m2"]
    }"#;
    let coverage: InMemoryCoverage = serde_json::from_str(json).unwrap();
    assert_eq!(ids(coverage.covering_tests("m1")), Some(vec!["1"]));
    assert!(coverage.has_static_coverage("m2"));
    assert_eq!(
        coverage.test("1").and_then(|t| t.start_position),
        Some(Position::ORIGIN)
    );
}

#[test]
fn missing_coverage_fields_default() {
    let coverage: InMemoryCoverage = serde_json::from_str("{}").unwrap();
    assert!(!coverage.has_coverage());
    assert!(coverage.tests().is_empty());
}

fn previous_mutant(covered: &[&str], killed: Option<&[&str]>) -> Mutant {
    let mut m = Mutant::new(
        "9",
        "add.js",
        Location::new(Position::new(0, 7), Position::new(0, 12)),
        "ArithmeticOperator",
        "-",
    );
    m.status = Some(MutantStatus::Killed);
    m.covered_by = Some(covered.iter().map(|s| s.to_string()).collect());
    m.killed_by = killed.map(|k| k.iter().map(|s| s.to_string()).collect());
    m
}

fn keys_by_id() -> HashMap<String, String> {
    HashMap::from([
        ("1".to_string(), "add.spec.js@0:0\nadds".to_string()),
        ("2".to_string(), "add.spec.js@4:0\nadds zero".to_string()),
    ])
}

fn set(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|s| s.to_string()).collect()
}

#[test]
fn matrix_translates_ids_into_test_keys() {
    let m = previous_mutant(&["1", "2"], Some(&["2"]));
    let matrix = CoverageMatrix::build([("k", &m)], &keys_by_id());
    assert_eq!(
        matrix.covered_by("k"),
        Some(&set(&["add.spec.js@0:0\nadds", "add.spec.js@4:0\nadds zero"]))
    );
    assert_eq!(matrix.killed_by("k"), Some(&set(&["add.spec.js@4:0\nadds zero"])));
    assert_eq!(matrix.covered_by("other"), None);
}

#[test]
fn killing_tests_always_count_as_covering() {
    let m = previous_mutant(&[], Some(&["1"]));
    let matrix = CoverageMatrix::build([("k", &m)], &keys_by_id());
    assert_eq!(matrix.covered_by("k"), Some(&set(&["add.spec.js@0:0\nadds"])));
}

#[test]
fn unknown_test_ids_are_skipped() {
    let m = previous_mutant(&["1", "gone"], Some(&["gone"]));
    let matrix = CoverageMatrix::build([("k", &m)], &keys_by_id());
    assert_eq!(matrix.covered_by("k"), Some(&set(&["add.spec.js@0:0\nadds"])));
    assert_eq!(matrix.killed_by("k"), Some(&set(&[])));
}

#[test]
fn absent_lists_give_empty_sets() {
    let mut m = previous_mutant(&[], None);
    m.covered_by = None;
    let matrix = CoverageMatrix::build([("k", &m)], &keys_by_id());
    assert_eq!(matrix.covered_by("k"), Some(&BTreeSet::new()));
    assert_eq!(matrix.killed_by("k"), Some(&BTreeSet::new()));
}
