use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use journal_tools_core::{
    clean_files, select_files, CleanOptions, FileOutcome, JournalLocator, Selection, ToolError,
};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

const EMPTY_SECTIONS: &str = "- ## Morning\n- ## Tasks\n\t- water plants\n- ## Evening";
const CLEANED: &str = "- ## Tasks\n\t- water plants";

fn journal_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().expect("tempdir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write journal");
    }
    dir
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("date")
}

#[test]
fn cleans_selected_date_in_place() {
    // Given
    let dir = journal_dir(&[("2025_02_14.md", EMPTY_SECTIONS)]);
    let locator = JournalLocator::new(dir.path());

    // When
    let files = select_files(&locator, Selection::Date(date("2025-02-14")), date("2025-06-01"));
    let report = clean_files(&files, CleanOptions::default());

    // Then
    assert_eq!(files, vec![dir.path().join("2025_02_14.md")]);
    assert_eq!(report.cleaned_count(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("2025_02_14.md")).unwrap(),
        CLEANED
    );
}

#[test]
fn unchanged_and_empty_files_are_not_rewritten() {
    let dir = journal_dir(&[("2025-01-01.md", CLEANED), ("2025-01-02.md", "")]);
    let files = vec![dir.path().join("2025-01-01.md"), dir.path().join("2025-01-02.md")];

    let report = clean_files(
        &files,
        CleanOptions {
            dry_run: false,
            backup: true,
        },
    );

    assert_eq!(report.cleaned_count(), 0);
    assert!(report
        .files
        .iter()
        .all(|file| matches!(file.outcome, FileOutcome::Unchanged)));
    assert!(!dir.path().join("2025-01-01.md.bak").exists());
}

#[test]
fn batch_continues_past_failures() {
    // Given a directory where a journal file is expected
    let dir = journal_dir(&[("2025-01-01.md", EMPTY_SECTIONS), ("2025-01-03.md", EMPTY_SECTIONS)]);
    let broken = dir.path().join("2025-01-02.md");
    fs::create_dir(&broken).unwrap();
    let files: Vec<PathBuf> = ["2025-01-01.md", "2025-01-02.md", "2025-01-03.md"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();

    // When
    let report = clean_files(&files, CleanOptions::default());

    // Then
    assert_eq!(report.cleaned_count(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, broken.as_path());
    assert!(matches!(failures[0].1, ToolError::Io { .. }));
    assert_eq!(
        fs::read_to_string(dir.path().join("2025-01-03.md")).unwrap(),
        CLEANED
    );
}

#[test]
fn backup_keeps_original_content() {
    let dir = journal_dir(&[("2025-01-01.md", EMPTY_SECTIONS)]);
    let path = dir.path().join("2025-01-01.md");

    clean_files(
        &[path.clone()],
        CleanOptions {
            dry_run: false,
            backup: true,
        },
    );

    assert_eq!(fs::read_to_string(&path).unwrap(), CLEANED);
    assert_eq!(
        fs::read_to_string(dir.path().join("2025-01-01.md.bak")).unwrap(),
        EMPTY_SECTIONS
    );
}

#[test]
fn recent_selection_uses_lookback_window() {
    let dir = journal_dir(&[
        ("2024-05-31.md", "old"),
        ("2024-06-01.md", "edge"),
        ("journal_2025-03-01.md", "mid"),
        ("2025-06-01.md", "today"),
    ]);
    let locator = JournalLocator::new(dir.path());

    let files = select_files(
        &locator,
        Selection::Recent {
            lookback_days: 365,
            include_today: false,
        },
        date("2025-06-01"),
    );

    assert_eq!(
        files,
        vec![
            dir.path().join("2024-06-01.md"),
            dir.path().join("journal_2025-03-01.md"),
        ]
    );
}

#[test]
fn oversized_lookback_is_clamped_instead_of_overflowing() {
    // Given a lookback far beyond the representable calendar
    let dir = journal_dir(&[("2025-05-01.md", "recent"), ("1800-01-01.md", "ancient")]);
    let locator = JournalLocator::new(dir.path());

    // When
    let files = select_files(
        &locator,
        Selection::Recent {
            lookback_days: 200_000_000,
            include_today: false,
        },
        date("2025-06-01"),
    );

    // Then the window stops at the clamp and nothing panics
    assert_eq!(files, vec![dir.path().join("2025-05-01.md")]);
}
