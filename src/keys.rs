//! Content-derived identities for mutants and tests.
//!
//! Ids are only unique within one run, so results from a previous run are matched
//! on these keys instead. Two different constructs that produce the same key are
//! treated as one entity.

use camino::{Utf8Component, Utf8Path};

use crate::mutants::{Mutant, Test};

/// `file_name` relative to `project_root`, with `/` separators.
///
/// Names outside the root are only normalized.
pub fn relative_file_name(project_root: &Utf8Path, file_name: &str) -> String {
    let normalized = file_name.replace('\\', "/");
    let root = project_root.as_str().replace('\\', "/");
    let path = Utf8Path::new(&normalized);
    let relative = path.strip_prefix(Utf8Path::new(&root)).unwrap_or(path);

    relative
        .components()
        .filter_map(|c| match c {
            Utf8Component::CurDir => None,
            Utf8Component::RootDir => Some(""),
            other => Some(other.as_str()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `file@start-end\nmutator: replacement`
pub fn mutant_key(mutant: &Mutant, relative_file_name: &str) -> String {
    format!(
        "{}@{}-{}\n{}: {}",
        relative_file_name,
        mutant.location.start,
        mutant.location.end,
        mutant.mutator_name,
        mutant.replacement
    )
}

/// `file@start\nname`
pub fn test_key(test: &Test, relative_file_name: &str) -> String {
    format!("{}@{}\n{}", relative_file_name, test.start(), test.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_itself_becomes_empty() {
        assert_eq!(relative_file_name(Utf8Path::new("/p"), "/p"), "");
    }

    #[test]
    fn names_outside_the_root_stay_absolute() {
        assert_eq!(
            relative_file_name(Utf8Path::new("/p"), "/elsewhere/a.js"),
            "/elsewhere/a.js"
        );
    }

    #[test]
    fn current_dir_components_are_dropped() {
        assert_eq!(relative_file_name(Utf8Path::new("."), "./src/a.js"), "src/a.js");
    }
}
