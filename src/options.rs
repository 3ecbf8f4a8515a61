use camino::Utf8PathBuf;
use thiserror::Error;

use crate::mutants::{Location, Position};
pub use crate::position_diff::DiffGranularity;

/// Configuration of one incremental diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Re-run everything; previous results are never reused.
    pub force: bool,
    /// Root that file names are made relative to when building identity keys.
    pub project_root: Utf8PathBuf,
    /// Code targeted for mutation in this run.
    pub scope: MutationScope,
    pub granularity: DiffGranularity,
}

impl Default for DiffOptions {
    fn default() -> Self {
        let project_root = std::env::current_dir()
            .ok()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        Self {
            force: false,
            project_root,
            scope: MutationScope::Everything,
            granularity: DiffGranularity::default(),
        }
    }
}

impl DiffOptions {
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_project_root(mut self, project_root: impl Into<Utf8PathBuf>) -> Self {
        self.project_root = project_root.into();
        self
    }

    pub fn with_scope(mut self, scope: MutationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_granularity(mut self, granularity: DiffGranularity) -> Self {
        self.granularity = granularity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileScope {
    All,
    Ranges(Vec<Location>),
}

/// Which files (and regions) are mutated this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationScope {
    #[default]
    Everything,
    /// Only the listed files; anything else is out of scope.
    Files(Vec<(String, FileScope)>),
}

impl MutationScope {
    pub fn from_specs(specs: impl IntoIterator<Item = MutateSpec>) -> Self {
        let mut scope = MutationScope::Files(Vec::new());
        for spec in specs {
            scope.add(spec);
        }
        scope
    }

    /// Merge one `--mutate` entry into the scope. A whole-file entry wins over ranges.
    pub fn add(&mut self, spec: MutateSpec) {
        let MutationScope::Files(files) = self else {
            return;
        };
        match files.iter().position(|(file, _)| *file == spec.file) {
            None => {
                let scope = match spec.range {
                    Some(range) => FileScope::Ranges(vec![range]),
                    None => FileScope::All,
                };
                files.push((spec.file, scope));
            }
            Some(idx) => match (&mut files[idx].1, spec.range) {
                (scope, None) => *scope = FileScope::All,
                (FileScope::Ranges(ranges), Some(range)) => ranges.push(range),
                (FileScope::All, Some(_)) => {}
            },
        }
    }

    /// True when any part of `location` in `relative_file_name` is mutated this run.
    ///
    /// Only a location that no targeted range touches lies outside the scope.
    pub fn targets(&self, relative_file_name: &str, location: &Location) -> bool {
        match self {
            MutationScope::Everything => true,
            MutationScope::Files(files) => files
                .iter()
                .filter(|(file, _)| file == relative_file_name)
                .any(|(_, scope)| match scope {
                    FileScope::All => true,
                    FileScope::Ranges(ranges) => ranges.iter().any(|r| r.overlaps(location)),
                }),
        }
    }
}

/// One `--mutate` argument: a file, optionally narrowed to a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutateSpec {
    pub file: String,
    pub range: Option<Location>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("empty file name in mutate spec '{0}'")]
    EmptyFile(String),
    #[error("invalid position '{0}' (expected LINE or LINE:COLUMN, 1-based)")]
    InvalidPosition(String),
    #[error("range '{0}' ends before it starts")]
    Inverted(String),
}

/// Parse `file`, `file:START-END` or `file:LINE:COL-LINE:COL`, with 1-based lines and columns.
///
/// A range without columns covers its lines entirely.
pub fn parse_mutate_spec(spec: &str) -> Result<MutateSpec, ScopeError> {
    let range_at = spec.char_indices().find(|(idx, c)| {
        *c == ':' && {
            let rest = &spec[idx + 1..];
            rest.contains('-')
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == ':' || c == '-')
        }
    });

    let (file, range) = match range_at {
        Some((idx, _)) => (&spec[..idx], Some(parse_range(&spec[idx + 1..])?)),
        None => (spec, None),
    };
    if file.is_empty() {
        return Err(ScopeError::EmptyFile(spec.to_string()));
    }
    Ok(MutateSpec {
        file: file.replace('\\', "/"),
        range,
    })
}

fn parse_range(range: &str) -> Result<Location, ScopeError> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| ScopeError::InvalidPosition(range.to_string()))?;
    let start = parse_position(start, 0)?;
    let end = parse_position(end, usize::MAX)?;
    if end < start {
        return Err(ScopeError::Inverted(range.to_string()));
    }
    Ok(Location::new(start, end))
}

fn parse_position(text: &str, default_column: usize) -> Result<Position, ScopeError> {
    let invalid = || ScopeError::InvalidPosition(text.to_string());
    let one_based = |part: &str| -> Result<usize, ScopeError> {
        match part.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n - 1),
            _ => Err(invalid()),
        }
    };
    match text.split_once(':') {
        Some((line, column)) => Ok(Position::new(one_based(line)?, one_based(column)?)),
        None => Ok(Position::new(one_based(text)?, default_column)),
    }
}
