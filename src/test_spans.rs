use crate::mutants::{Location, OpenLocation, Position, Test};
use crate::remap::Located;

/// A test paired with a closed span, ready for remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTest {
    pub test: Test,
    pub location: Location,
}

impl LocatedTest {
    /// Write the (possibly remapped) span back into the test, keeping open ends open.
    pub fn into_test(self) -> Test {
        let LocatedTest { mut test, location } = self;
        if let Some(open) = test.location.as_mut() {
            open.start = location.start;
            if open.end.is_some() {
                open.end = Some(location.end);
            }
        }
        if test.start_position.is_some() {
            test.start_position = Some(location.start);
        }
        test
    }
}

impl Located for LocatedTest {
    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }
}

/// Give every test of one file a closed span.
///
/// - a test with a full location keeps it
/// - an open-ended test runs until the next distinct start of another open-ended test,
///   or to the end of the file for the last one
/// - a test without any position spans the whole file
///
/// Only open-ended tests act as boundaries: a test with a full location never cuts
/// another test's span short. Tests that share a start share their span too, so each
/// of them ends at the next start that differs from theirs rather than at its
/// neighbour's identical start.
///
/// Output order follows input order.
pub fn close_locations(tests: Vec<Test>) -> Vec<LocatedTest> {
    let mut open_starts: Vec<Position> = tests.iter().filter_map(open_start).collect();
    open_starts.sort();
    open_starts.dedup();

    tests
        .into_iter()
        .map(|test| {
            let location = match test.location {
                Some(OpenLocation {
                    start,
                    end: Some(end),
                }) => Location::new(start, end),
                _ => match open_start(&test) {
                    Some(start) => {
                        let next = open_starts.partition_point(|s| *s <= start);
                        let end = open_starts
                            .get(next)
                            .copied()
                            .unwrap_or(Position::END_OF_FILE);
                        Location::new(start, end)
                    }
                    None => Location::whole_file(),
                },
            };
            LocatedTest { test, location }
        })
        .collect()
}

fn open_start(test: &Test) -> Option<Position> {
    match test.location {
        Some(OpenLocation { end: Some(_), .. }) => None,
        Some(open) => Some(open.start),
        None => test.start_position,
    }
}
