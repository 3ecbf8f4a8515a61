use console::Style;
use crate::differ::DiffOutcome;
use crate::stats::DiffStatistics;
use std::path::Path;

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_diff_summary(outcome: &DiffOutcome, report: &Path, verbose: bool) {
    let pending: Vec<_> = outcome.mutants.iter().filter(|m| !m.has_result()).collect();
    let current = outcome.mutants.len() - outcome.carried_over;

    if pending.is_empty() {
        print_success(&format!(
            "{}: all {} mutant results reused",
            report.display(),
            current
        ));
    } else {
        let style = Style::new().yellow().bold();
        println!(
            "{} {}: {} of {} mutant results reused, {} to run",
            style.apply_to("!"),
            report.display(),
            outcome.reused,
            current,
            pending.len(),
        );
    }

    print_statistics("Mutants", &outcome.mutant_stats, verbose);
    print_statistics("Tests", &outcome.test_stats, verbose);

    if outcome.carried_over > 0 {
        let dim = Style::new().dim();
        println!(
            "  {} {} results carried over from outside the mutation scope",
            dim.apply_to("·"),
            outcome.carried_over
        );
    }

    if verbose && !pending.is_empty() {
        println!();
        let id_style = Style::new().cyan().bold();
        let loc_style = Style::new().dim();
        let op_style = Style::new().magenta();
        for m in pending {
            println!(
                "  {} {}:{}:{} {} → {}",
                id_style.apply_to(format!("#{}", m.id)),
                m.file_name,
                m.location.start.line + 1,
                m.location.start.column + 1,
                loc_style.apply_to(format!("[{}]", m.mutator_name)),
                op_style.apply_to(&m.replacement),
            );
        }
    }
}

fn print_statistics(label: &str, stats: &DiffStatistics, verbose: bool) {
    let total = stats.total();
    let files = stats.files_changed();
    let added = Style::new().green();
    let removed = Style::new().red();
    println!(
        "  {:<8} {} {} changed ({}, {})",
        format!("{}:", label),
        files,
        if files == 1 { "file" } else { "files" },
        added.apply_to(format!("+{}", total.added)),
        removed.apply_to(format!("-{}", total.removed)),
    );
    if verbose {
        let dim = Style::new().dim();
        for (file, changes) in stats.changes_by_file() {
            println!("    {} {}", dim.apply_to(file), changes);
        }
    }
}
