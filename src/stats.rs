use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub added: usize,
    pub removed: usize,
}

impl fmt::Display for FileChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(+{}, -{})", self.added, self.removed)
    }
}

/// Added/removed counters per file, in the order files were first counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStatistics {
    changes_by_file: Vec<(String, FileChanges)>,
    total: FileChanges,
}

impl DiffStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, file: &str, change: Change, amount: usize) {
        if amount == 0 {
            return;
        }
        let idx = match self.changes_by_file.iter().position(|(f, _)| f == file) {
            Some(idx) => idx,
            None => {
                self.changes_by_file
                    .push((file.to_string(), FileChanges::default()));
                self.changes_by_file.len() - 1
            }
        };
        let changes = &mut self.changes_by_file[idx].1;
        match change {
            Change::Added => {
                changes.added += amount;
                self.total.added += amount;
            }
            Change::Removed => {
                changes.removed += amount;
                self.total.removed += amount;
            }
        }
    }

    pub fn changes_by_file(&self) -> &[(String, FileChanges)] {
        &self.changes_by_file
    }

    pub fn for_file(&self, file: &str) -> Option<FileChanges> {
        self.changes_by_file
            .iter()
            .find(|(f, _)| f == file)
            .map(|(_, c)| *c)
    }

    pub fn total(&self) -> FileChanges {
        self.total
    }

    pub fn files_changed(&self) -> usize {
        self.changes_by_file.len()
    }

    /// e.g. `2 files changed (+3, -1)`
    pub fn totals_report(&self) -> String {
        let files = self.files_changed();
        let noun = if files == 1 { "file" } else { "files" };
        format!("{} {} changed {}", files, noun, self.total)
    }

    /// One line per file, e.g. `src/add.js (+1, -0)`
    pub fn detailed_report(&self) -> Vec<String> {
        self.changes_by_file
            .iter()
            .map(|(file, changes)| format!("{} {}", file, changes))
            .collect()
    }
}
