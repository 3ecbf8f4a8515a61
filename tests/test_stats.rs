use mutator_diff::stats::{Change, DiffStatistics, FileChanges};

#[test]
fn counts_per_file_and_in_total() {
    let mut stats = DiffStatistics::new();
    stats.count("src/add.js", Change::Added, 2);
    stats.count("src/sub.js", Change::Removed, 1);
    stats.count("src/add.js", Change::Removed, 1);

    assert_eq!(
        stats.for_file("src/add.js"),
        Some(FileChanges {
            added: 2,
            removed: 1
        })
    );
    assert_eq!(
        stats.total(),
        FileChanges {
            added: 2,
            removed: 2
        }
    );
    assert_eq!(stats.files_changed(), 2);
}

#[test]
fn zero_amounts_do_not_list_a_file() {
    let mut stats = DiffStatistics::new();
    stats.count("src/add.js", Change::Removed, 0);
    assert_eq!(stats.files_changed(), 0);
    assert_eq!(stats.for_file("src/add.js"), None);
}

#[test]
fn files_are_reported_in_first_counted_order() {
    let mut stats = DiffStatistics::new();
    stats.count("z.js", Change::Added, 1);
    stats.count("a.js", Change::Added, 1);
    stats.count("z.js", Change::Added, 1);
    assert_eq!(
        stats.detailed_report(),
        vec!["z.js (+2, -0)".to_string(), "a.js (+1, -0)".to_string()]
    );
}

#[test]
fn totals_report_reads_naturally() {
    let mut stats = DiffStatistics::new();
    assert_eq!(stats.totals_report(), "0 files changed (+0, -0)");
    stats.count("add.js", Change::Added, 3);
    assert_eq!(stats.totals_report(), "1 file changed (+3, -0)");
    stats.count("sub.js", Change::Removed, 1);
    assert_eq!(stats.totals_report(), "2 files changed (+3, -1)");
}
