use mutator_diff::coverage::{InMemoryCoverage, TestCoverage};
use mutator_diff::differ::IncrementalDiffer;
use mutator_diff::keys::relative_file_name;
use mutator_diff::mutants::Mutant;
use mutator_diff::options::{
    DiffGranularity, DiffOptions, MutateSpec, MutationScope, parse_mutate_spec,
};
use mutator_diff::output;
use mutator_diff::report::{self, IncrementalReport};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mutator-diff",
    version,
    about = "Reuse mutation testing results from a previous run"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct this run's mutants with the reusable results of a previous run
    Diff(DiffArgs),
}

#[derive(Args)]
struct DiffArgs {
    /// Incremental report written by the previous run (mutation-testing JSON report)
    #[arg(short, long)]
    report: PathBuf,
    /// Mutants discovered this run: JSON array, 0-based positions
    #[arg(short, long)]
    mutants: PathBuf,
    /// Coverage reported by this run's test runner (omit if none was collected)
    #[arg(short, long)]
    coverage: Option<PathBuf>,
    /// Root that file names are relative to
    #[arg(long, env = "MUTATOR_PROJECT_ROOT", default_value = ".")]
    project_root: Utf8PathBuf,
    /// Reuse nothing; every mutant runs again
    #[arg(long)]
    force: bool,
    /// Only FILE or FILE:START-END (1-based lines) is mutated this run. Repeatable.
    #[arg(long = "mutate", value_name = "SPEC", value_parser = parse_mutate_spec)]
    mutate: Vec<MutateSpec>,
    /// Unit the source diff works in
    #[arg(long, value_enum, default_value_t = Granularity::Chars)]
    granularity: Granularity,
    /// Print the corrected mutant list as JSON instead of a summary
    #[arg(long)]
    json: bool,
    /// Write an incremental report for the next run
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Show per-file statistics and the mutants left to run
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Granularity {
    Chars,
    Lines,
}

impl From<Granularity> for DiffGranularity {
    fn from(g: Granularity) -> Self {
        match g {
            Granularity::Chars => DiffGranularity::Chars,
            Granularity::Lines => DiffGranularity::Lines,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Diff(args) => {
            init_tracing(args.verbose);
            match cmd_diff(args) {
                Ok(code) => code,
                Err(e) => {
                    output::print_error(&format!("{:#}", e));
                    2
                }
            }
        }
    };

    process::exit(exit_code);
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "mutator_diff=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<i32> {
    let previous = report::load_report(&args.report).context("failed to load previous report")?;
    let current_mutants: Vec<Mutant> =
        report::read_json(&args.mutants).context("failed to load current mutants")?;
    let mut coverage = match &args.coverage {
        Some(path) => report::read_json::<InMemoryCoverage>(path)
            .context("failed to load test coverage")?,
        None => InMemoryCoverage::default(),
    };

    let scope = if args.mutate.is_empty() {
        MutationScope::Everything
    } else {
        MutationScope::from_specs(args.mutate)
    };
    let options = DiffOptions::default()
        .with_force(args.force)
        .with_project_root(args.project_root.clone())
        .with_scope(scope)
        .with_granularity(args.granularity.into());

    let sources = read_sources(&args.project_root, &current_mutants, &previous, &coverage);
    let differ = IncrementalDiffer::new(options);
    let outcome = differ.diff(current_mutants, &mut coverage, &previous, &sources);

    if let Some(path) = &args.output {
        let tests = coverage.tests();
        let next = IncrementalReport::from_run(&outcome.mutants, &tests, &args.project_root, &sources);
        report::save_report(&next, path).context("failed to write incremental report")?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.mutants)?);
    } else {
        output::print_diff_summary(&outcome, &args.report, args.verbose);
    }

    Ok(0)
}

/// Current contents of every file either run mentions. Unreadable files count as deleted.
fn read_sources(
    project_root: &Utf8Path,
    mutants: &[Mutant],
    previous: &IncrementalReport,
    coverage: &InMemoryCoverage,
) -> BTreeMap<String, String> {
    let names = mutants
        .iter()
        .map(|m| m.file_name.as_str())
        .chain(previous.files.keys().map(String::as_str))
        .chain(previous.test_files.keys().map(String::as_str))
        .chain(coverage.tests().into_iter().filter_map(|t| t.file_name.as_deref()));

    let mut sources = BTreeMap::new();
    for name in names {
        let relative = relative_file_name(project_root, name);
        if relative.is_empty() || sources.contains_key(&relative) {
            continue;
        }
        if let Ok(source) = std::fs::read_to_string(project_root.join(&relative)) {
            sources.insert(relative, source);
        }
    }
    sources
}
