//! The incremental report: a previous run's mutants and tests together with the
//! sources they were found in.
//!
//! On disk this is the mutation-testing JSON report, whose lines and columns are
//! 1-based. In memory everything is 0-based; conversion only happens here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use camino::Utf8Path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::differ::SourceLookup;
use crate::keys::relative_file_name;
use crate::mutants::{Location, Mutant, MutantStatus, OpenLocation, Position, Test};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncrementalReport {
    pub files: BTreeMap<String, ReportFile>,
    pub test_files: BTreeMap<String, ReportTestFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub source: String,
    pub mutants: Vec<Mutant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTestFile {
    /// Unknown when the runner did not hand over test file contents.
    pub source: Option<String>,
    pub tests: Vec<Test>,
}

impl IncrementalReport {
    /// Build the baseline for the next run from this run's results.
    ///
    /// Files whose source cannot be found are left out: without a source they could never be diffed.
    pub fn from_run<S: SourceLookup + ?Sized>(
        mutants: &[Mutant],
        tests: &[&Test],
        project_root: &Utf8Path,
        sources: &S,
    ) -> Self {
        let mut report = IncrementalReport::default();

        for mutant in mutants {
            let file = relative_file_name(project_root, &mutant.file_name);
            if !report.files.contains_key(&file) {
                let Some(source) = sources.source(&file) else {
                    warn!("No source for {}, its mutants are left out of the report", file);
                    continue;
                };
                report.files.insert(
                    file.clone(),
                    ReportFile {
                        source: source.to_string(),
                        mutants: Vec::new(),
                    },
                );
            }
            if let Some(entry) = report.files.get_mut(&file) {
                entry.mutants.push(Mutant {
                    file_name: file.clone(),
                    ..mutant.clone()
                });
            }
        }

        for test in tests {
            let file = test
                .file_name
                .as_deref()
                .map(|name| relative_file_name(project_root, name))
                .unwrap_or_default();
            let entry = report
                .test_files
                .entry(file.clone())
                .or_insert_with(|| ReportTestFile {
                    source: sources.source(&file).map(str::to_string),
                    tests: Vec::new(),
                });
            entry.tests.push((*test).clone());
        }

        report
    }

    pub fn mutant_count(&self) -> usize {
        self.files.values().map(|f| f.mutants.len()).sum()
    }
}

// --- JSON schema (1-based) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaLocation {
    pub start: SchemaPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<SchemaPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutantResult {
    pub id: String,
    pub mutator_name: String,
    #[serde(default)]
    pub replacement: Option<String>,
    pub location: SchemaLocation,
    pub status: MutantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_completed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed_by: Option<Vec<String>>,
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    #[serde(default)]
    pub language: String,
    pub source: String,
    pub mutants: Vec<MutantResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SchemaLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub tests: Vec<TestDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationTestReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub files: BTreeMap<String, FileResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_files: Option<BTreeMap<String, TestFileDefinition>>,
}

fn default_schema_version() -> String {
    "2".to_string()
}

fn to_position(p: SchemaPosition) -> Option<Position> {
    Some(Position::new(p.line.checked_sub(1)?, p.column.checked_sub(1)?))
}

fn to_schema_position(p: Position) -> SchemaPosition {
    SchemaPosition {
        line: p.line.saturating_add(1),
        column: p.column.saturating_add(1),
    }
}

fn to_mutant(file_name: &str, m: MutantResult) -> Option<Mutant> {
    let start = to_position(m.location.start)?;
    let end = to_position(m.location.end?)?;
    Some(Mutant {
        id: m.id,
        file_name: file_name.to_string(),
        location: Location::new(start, end),
        mutator_name: m.mutator_name,
        replacement: m.replacement.unwrap_or_default(),
        // A saved `Pending` never ran; it has no result to reuse.
        status: Some(m.status).filter(|s| *s != MutantStatus::Pending),
        status_reason: m.status_reason,
        tests_completed: m.tests_completed,
        covered_by: m.covered_by,
        killed_by: m.killed_by,
    })
}

fn to_test(file_name: &str, t: TestDefinition) -> Option<Test> {
    let mut test = Test::new(t.id, t.name).in_file(file_name);
    if let Some(location) = t.location {
        let end = match location.end {
            Some(end) => Some(to_position(end)?),
            None => None,
        };
        test = test.with_location(OpenLocation {
            start: to_position(location.start)?,
            end,
        });
    }
    Some(test)
}

impl From<MutationTestReport> for IncrementalReport {
    fn from(report: MutationTestReport) -> Self {
        let mut files = BTreeMap::new();
        for (name, file) in report.files {
            let total = file.mutants.len();
            let mutants: Vec<Mutant> = file
                .mutants
                .into_iter()
                .filter_map(|m| to_mutant(&name, m))
                .collect();
            if mutants.len() < total {
                warn!(
                    "Dropped {} mutant(s) with an invalid location from {}",
                    total - mutants.len(),
                    name
                );
            }
            files.insert(
                name,
                ReportFile {
                    source: file.source,
                    mutants,
                },
            );
        }

        let mut test_files = BTreeMap::new();
        for (name, file) in report.test_files.unwrap_or_default() {
            let total = file.tests.len();
            let tests: Vec<Test> = file
                .tests
                .into_iter()
                .filter_map(|t| to_test(&name, t))
                .collect();
            if tests.len() < total {
                warn!(
                    "Dropped {} test(s) with an invalid location from {}",
                    total - tests.len(),
                    name
                );
            }
            test_files.insert(
                name,
                ReportTestFile {
                    source: file.source,
                    tests,
                },
            );
        }

        IncrementalReport { files, test_files }
    }
}

impl From<&IncrementalReport> for MutationTestReport {
    fn from(report: &IncrementalReport) -> Self {
        let files = report
            .files
            .iter()
            .map(|(name, file)| {
                let mutants = file
                    .mutants
                    .iter()
                    .map(|m| MutantResult {
                        id: m.id.clone(),
                        mutator_name: m.mutator_name.clone(),
                        replacement: Some(m.replacement.clone()),
                        location: SchemaLocation {
                            start: to_schema_position(m.location.start),
                            end: Some(to_schema_position(m.location.end)),
                        },
                        status: m.status.unwrap_or(MutantStatus::Pending),
                        status_reason: m.status_reason.clone(),
                        tests_completed: m.tests_completed,
                        covered_by: m.covered_by.clone(),
                        killed_by: m.killed_by.clone(),
                        is_static: None,
                    })
                    .collect();
                let result = FileResult {
                    language: language_of(name).to_string(),
                    source: file.source.clone(),
                    mutants,
                };
                (name.clone(), result)
            })
            .collect();

        let test_files = report
            .test_files
            .iter()
            .map(|(name, file)| {
                let tests = file
                    .tests
                    .iter()
                    .map(|t| TestDefinition {
                        id: t.id.clone(),
                        name: t.name.clone(),
                        location: t
                            .location
                            .or_else(|| {
                                t.start_position
                                    .map(|start| OpenLocation { start, end: None })
                            })
                            .map(|l| SchemaLocation {
                                start: to_schema_position(l.start),
                                end: l.end.map(to_schema_position),
                            }),
                    })
                    .collect();
                let definition = TestFileDefinition {
                    source: file.source.clone(),
                    tests,
                };
                (name.clone(), definition)
            })
            .collect();

        MutationTestReport {
            schema_version: default_schema_version(),
            files,
            test_files: Some(test_files),
        }
    }
}

fn language_of(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("ts" | "mts" | "cts" | "tsx") => "typescript",
        Some("js" | "mjs" | "cjs" | "jsx") => "javascript",
        Some("py") => "python",
        Some("rs") => "rust",
        _ => "unknown",
    }
}

// --- File I/O ---

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReportError> {
    let data = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_report(path: &Path) -> Result<IncrementalReport, ReportError> {
    let report: MutationTestReport = read_json(path)?;
    Ok(report.into())
}

pub fn save_report(report: &IncrementalReport, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(&MutationTestReport::from(report)).map_err(|source| {
        ReportError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
