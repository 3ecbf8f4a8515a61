pub mod coverage;
pub mod differ;
pub mod keys;
pub mod mutants;
pub mod options;
pub mod output;
pub mod position_diff;
pub mod remap;
pub mod report;
pub mod reuse;
pub mod stats;
pub mod test_spans;

pub use coverage::{CoverageMatrix, InMemoryCoverage, TestCoverage};
pub use differ::{DiffOutcome, IncrementalDiffer, SourceLookup};
pub use mutants::{Location, Mutant, MutantStatus, OpenLocation, Position, Test};
pub use options::{DiffGranularity, DiffOptions, MutationScope};
pub use report::IncrementalReport;
