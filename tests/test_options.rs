use camino::Utf8PathBuf;
use mutator_diff::mutants::{Location, Position};
use mutator_diff::options::{
    DiffGranularity, DiffOptions, FileScope, MutateSpec, MutationScope, ScopeError,
    parse_mutate_spec,
};

fn loc(start: (usize, usize), end: (usize, usize)) -> Location {
    Location::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
}

#[test]
fn defaults() {
    let options = DiffOptions::default();
    assert!(!options.force);
    assert_eq!(options.scope, MutationScope::Everything);
    assert_eq!(options.granularity, DiffGranularity::Chars);
}

#[test]
fn builder_sets_every_field() {
    let options = DiffOptions::default()
        .with_force(true)
        .with_project_root("/project")
        .with_granularity(DiffGranularity::Lines)
        .with_scope(MutationScope::Files(vec![]));
    assert!(options.force);
    assert_eq!(options.project_root, Utf8PathBuf::from("/project"));
    assert_eq!(options.granularity, DiffGranularity::Lines);
    assert_eq!(options.scope, MutationScope::Files(vec![]));
}

#[test]
fn plain_file_spec() {
    assert_eq!(
        parse_mutate_spec("src/add.js"),
        Ok(MutateSpec {
            file: "src/add.js".into(),
            range: None
        })
    );
}

#[test]
fn line_range_spec_covers_whole_lines() {
    let spec = parse_mutate_spec("src/add.js:2-4").unwrap();
    assert_eq!(spec.file, "src/add.js");
    assert_eq!(spec.range, Some(loc((1, 0), (3, usize::MAX))));
}

#[test]
fn line_and_column_range_spec() {
    let spec = parse_mutate_spec("src/add.js:1:8-1:13").unwrap();
    assert_eq!(spec.range, Some(loc((0, 7), (0, 12))));
}

#[test]
fn windows_paths_keep_their_drive_colon() {
    let spec = parse_mutate_spec("C:\\project\\add.js:3-5").unwrap();
    assert_eq!(spec.file, "C:/project/add.js");
    assert_eq!(spec.range, Some(loc((2, 0), (4, usize::MAX))));
}

#[test]
fn invalid_specs_are_rejected() {
    assert_eq!(
        parse_mutate_spec(":1-2"),
        Err(ScopeError::EmptyFile(":1-2".into()))
    );
    assert_eq!(
        parse_mutate_spec("add.js:0-2"),
        Err(ScopeError::InvalidPosition("0".into()))
    );
    assert_eq!(
        parse_mutate_spec("add.js:5-2"),
        Err(ScopeError::Inverted("5-2".into()))
    );
}

#[test]
fn everything_targets_any_location() {
    assert!(MutationScope::Everything.targets("anything.js", &loc((0, 0), (0, 1))));
}

#[test]
fn file_scope_targets_only_listed_files() {
    let scope = MutationScope::from_specs([parse_mutate_spec("src/add.js").unwrap()]);
    assert!(scope.targets("src/add.js", &loc((10, 0), (10, 4))));
    assert!(!scope.targets("src/sub.js", &loc((10, 0), (10, 4))));
}

#[test]
fn ranges_target_overlapping_locations() {
    let scope = MutationScope::from_specs([
        parse_mutate_spec("add.js:2-3").unwrap(),
        parse_mutate_spec("add.js:10-10").unwrap(),
    ]);
    assert!(scope.targets("add.js", &loc((1, 4), (2, 9))));
    assert!(scope.targets("add.js", &loc((9, 0), (9, 40))));
    assert!(scope.targets("add.js", &loc((2, 0), (3, 1))));
    assert!(scope.targets("add.js", &loc((0, 3), (1, 0))));
    assert!(!scope.targets("add.js", &loc((0, 0), (0, 9))));
    assert!(!scope.targets("add.js", &loc((5, 0), (5, 1))));
}

#[test]
fn whole_file_spec_wins_over_ranges() {
    let scope = MutationScope::from_specs([
        parse_mutate_spec("add.js:2-3").unwrap(),
        parse_mutate_spec("add.js").unwrap(),
        parse_mutate_spec("add.js:7-8").unwrap(),
    ]);
    assert_eq!(
        scope,
        MutationScope::Files(vec![("add.js".to_string(), FileScope::All)])
    );
    assert!(scope.targets("add.js", &loc((20, 0), (20, 1))));
}
