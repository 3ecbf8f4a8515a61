use serde::{Deserialize, Serialize};
use std::fmt;

/// A 0-based (line, column) position. Columns count Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { line: 0, column: 0 };

    /// Sentinel for "until the end of the file", used to close open test spans.
    pub const END_OF_FILE: Position = Position { line: usize::MAX, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn is_end_of_file(&self) -> bool {
        self.line == usize::MAX
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A closed span. `end >= start` in (line, column) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// The span from the start of the file to its end.
    pub fn whole_file() -> Self {
        Self::new(Position::ORIGIN, Position::END_OF_FILE)
    }

    /// True when `other` lies entirely within this span.
    pub fn contains(&self, other: &Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two spans share at least one position.
    pub fn overlaps(&self, other: &Location) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A span whose end may be unknown, as test runners often only report where a test starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLocation {
    pub start: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutantStatus {
    Killed,
    Survived,
    NoCoverage,
    Timeout,
    CompileError,
    RuntimeError,
    Ignored,
    Pending,
}

impl fmt::Display for MutantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Killed => "Killed",
            Self::Survived => "Survived",
            Self::NoCoverage => "NoCoverage",
            Self::Timeout => "Timeout",
            Self::CompileError => "CompileError",
            Self::RuntimeError => "RuntimeError",
            Self::Ignored => "Ignored",
            Self::Pending => "Pending",
        };
        f.write_str(label)
    }
}

/// A single mutant. `status` is `None` while the mutant still awaits execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutant {
    /// Run-local identifier; not stable across runs.
    pub id: String,
    pub file_name: String,
    pub location: Location,
    pub mutator_name: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MutantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_completed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed_by: Option<Vec<String>>,
}

impl Mutant {
    /// A fresh, unexecuted mutant.
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        location: Location,
        mutator_name: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            location,
            mutator_name: mutator_name.into(),
            replacement: replacement.into(),
            status: None,
            status_reason: None,
            tests_completed: None,
            covered_by: None,
            killed_by: None,
        }
    }

    pub fn has_result(&self) -> bool {
        self.status.is_some()
    }
}

/// A test known to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<OpenLocation>,
}

impl Test {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_name: None,
            start_position: None,
            location: None,
        }
    }

    pub fn in_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn starting_at(mut self, start: Position) -> Self {
        self.start_position = Some(start);
        self
    }

    pub fn with_location(mut self, location: OpenLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Where the test starts: the reported start position, then the location's start, then the origin.
    pub fn start(&self) -> Position {
        self.start_position
            .or_else(|| self.location.map(|l| l.start))
            .unwrap_or(Position::ORIGIN)
    }
}
