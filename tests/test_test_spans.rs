use mutator_diff::mutants::{Location, OpenLocation, Position, Test};
use mutator_diff::position_diff::{DiffChunk, DiffOp};
use mutator_diff::remap::remap_locations;
use mutator_diff::test_spans::close_locations;

fn open_at(id: &str, line: usize) -> Test {
    Test::new(id, format!("test {}", id)).with_location(OpenLocation {
        start: Position::new(line, 0),
        end: None,
    })
}

fn spans(tests: Vec<Test>) -> Vec<Location> {
    close_locations(tests).into_iter().map(|t| t.location).collect()
}

fn span(start: (usize, usize), end: Position) -> Location {
    Location::new(Position::new(start.0, start.1), end)
}

#[test]
fn open_tests_end_where_the_next_one_starts() {
    let tests = vec![open_at("a", 0), open_at("b", 4), open_at("c", 9)];
    assert_eq!(
        spans(tests),
        vec![
            span((0, 0), Position::new(4, 0)),
            span((4, 0), Position::new(9, 0)),
            span((9, 0), Position::END_OF_FILE),
        ]
    );
}

#[test]
fn input_order_is_kept_while_spans_follow_source_order() {
    let tests = vec![open_at("c", 9), open_at("a", 0), open_at("b", 4)];
    let closed = close_locations(tests);
    let ids: Vec<_> = closed.iter().map(|t| t.test.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(closed[0].location.end, Position::END_OF_FILE);
    assert_eq!(closed[1].location.end, Position::new(4, 0));
}

#[test]
fn tests_sharing_a_start_share_the_next_start_as_end() {
    let tests = vec![open_at("a", 2), open_at("b", 2), open_at("c", 5)];
    let ends: Vec<_> = spans(tests).into_iter().map(|l| l.end).collect();
    assert_eq!(
        ends,
        vec![Position::new(5, 0), Position::new(5, 0), Position::END_OF_FILE]
    );
}

#[test]
fn full_locations_are_kept_and_not_used_as_boundaries() {
    let closed_test = Test::new("full", "full").with_location(OpenLocation {
        start: Position::new(3, 0),
        end: Some(Position::new(5, 2)),
    });
    let tests = vec![open_at("a", 0), closed_test, open_at("b", 8)];
    assert_eq!(
        spans(tests),
        vec![
            span((0, 0), Position::new(8, 0)),
            span((3, 0), Position::new(5, 2)),
            span((8, 0), Position::END_OF_FILE),
        ]
    );
}

#[test]
fn start_position_alone_counts_as_open() {
    let tests = vec![
        Test::new("a", "a").starting_at(Position::new(1, 2)),
        open_at("b", 6),
    ];
    assert_eq!(spans(tests)[0], span((1, 2), Position::new(6, 0)));
}

#[test]
fn tests_without_position_span_the_whole_file() {
    assert_eq!(spans(vec![Test::new("a", "a")]), vec![Location::whole_file()]);
}

#[test]
fn into_test_keeps_open_ends_open() {
    let chunks = vec![
        DiffChunk::new(DiffOp::Insert, "\n\n"),
        DiffChunk::new(DiffOp::Equal, "\nit('adds', () => {});\n"),
    ];
    let located = close_locations(vec![open_at("a", 1)]);
    let remapped = remap_locations(&chunks, located);
    assert_eq!(remapped.removed, 0);

    let test = remapped.retained[0].clone().into_test();
    assert_eq!(
        test.location,
        Some(OpenLocation {
            start: Position::new(3, 0),
            end: None
        })
    );
    assert_eq!(test.start_position, None);
}

#[test]
fn into_test_moves_start_position_and_closed_end() {
    let test = Test::new("a", "a")
        .starting_at(Position::new(1, 0))
        .with_location(OpenLocation {
            start: Position::new(1, 0),
            end: Some(Position::new(1, 5)),
        });
    let chunks = vec![
        DiffChunk::new(DiffOp::Insert, "\n"),
        DiffChunk::new(DiffOp::Equal, "\nit();"),
    ];
    let remapped = remap_locations(&chunks, close_locations(vec![test]));
    let test = remapped.retained[0].clone().into_test();
    assert_eq!(test.start_position, Some(Position::new(2, 0)));
    assert_eq!(
        test.location,
        Some(OpenLocation {
            start: Position::new(2, 0),
            end: Some(Position::new(2, 5)),
        })
    );
}

#[test]
fn test_added_right_before_an_open_test_removes_it() {
    let chunks = vec![
        DiffChunk::new(DiffOp::Insert, "it('adds zero');\n"),
        DiffChunk::new(DiffOp::Equal, "it('adds');\n"),
    ];
    let remapped = remap_locations(&chunks, close_locations(vec![open_at("a", 0)]));
    assert_eq!(remapped.removed, 1);
}
