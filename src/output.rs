//! CLI output formatting for every subcommand.
//!
//! # Entity Display Contract
//!
//! Every document is shown the same way across commands:
//!
//! 1. **Header line**: positional index + title, with the path in parens
//!    (documents without a title show the path alone).
//! 2. **Context lines**: indented `Created:`, `Modified:`, `Authors:`, each
//!    with the source it was resolved from in brackets.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! 001 guide/install.md
//!     Created: 2020-01-05T10:00:00+00:00
//!     Authors: X <x@example.org>, Y
//!
//! History: 1 document
//! ```
//!
//! ## Resolve
//!
//! ```text
//! 001 Install (guide/install.md)
//!     Created: 2020-01-05T10:00:00+00:00 [history]
//!     Modified: 2024-06-02T09:00:00 [filesystem]
//!     Authors: X <x@example.org>, Y [history]
//!     Excluded
//! ```
//!
//! ## Recent
//!
//! ```text
//! 001 2022-03-07T12:00:00 Alpha (a.md) by Z
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::annotate::ResolvedDocument;
use crate::recent::RecentEntry;
use crate::types::{Author, DatesCache};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Document header: titled documents show the path as context.
///
/// ```text
/// 001 Install (guide/install.md)
/// 002 guide/untitled.md
/// ```
fn document_header(index: usize, title: Option<&str>, path: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {} ({})", format_index(index), t, path),
        _ => format!("{} {}", format_index(index), path),
    }
}

/// `Name <email>` when the email is known, else the bare name.
fn author_label(author: &Author) -> String {
    if author.email.is_empty() {
        author.name.clone()
    } else {
        format!("{} <{}>", author.name, author.email)
    }
}

fn author_list(authors: &[Author]) -> String {
    authors
        .iter()
        .map(author_label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(history: &DatesCache) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (path, record)) in history.iter().enumerate() {
        lines.push(document_header(i + 1, None, path));
        if let Some(created) = record.created {
            lines.push(format!("{}Created: {}", indent(1), created));
        }
        if let Some(authors) = record.authors() {
            lines.push(format!("{}Authors: {}", indent(1), author_list(authors)));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("History: {}", plural(history.len(), "document")));
    lines
}

pub fn print_scan_output(history: &DatesCache) {
    for line in format_scan_output(history) {
        println!("{}", line);
    }
}

// ============================================================================
// Resolve
// ============================================================================

pub fn format_resolve_output(documents: &[ResolvedDocument]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, doc) in documents.iter().enumerate() {
        let dates = &doc.dates;
        lines.push(document_header(i + 1, doc.title.as_deref(), &doc.path));
        lines.push(format!(
            "{}Created: {} [{}]",
            indent(1),
            dates.created.value,
            dates.created.source
        ));
        lines.push(format!(
            "{}Modified: {} [{}]",
            indent(1),
            dates.modified.value,
            dates.modified.source
        ));
        if let Some(authors) = &dates.authors {
            lines.push(format!(
                "{}Authors: {} [{}]",
                indent(1),
                author_list(&authors.value),
                authors.source
            ));
        }
        if dates.excluded {
            lines.push(format!("{}Excluded", indent(1)));
        }
    }
    let excluded = documents.iter().filter(|d| d.dates.excluded).count();
    lines.push(String::new());
    lines.push(format!(
        "Resolved {} ({} excluded)",
        plural(documents.len(), "document"),
        excluded
    ));
    lines
}

pub fn print_resolve_output(documents: &[ResolvedDocument]) {
    for line in format_resolve_output(documents) {
        println!("{}", line);
    }
}

// ============================================================================
// Recent
// ============================================================================

pub fn format_recent_output(entries: &[RecentEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No recently updated documents".to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{} {} {} ({}) by {}",
                format_index(i + 1),
                e.modified,
                e.title,
                e.path,
                e.author.name
            )
        })
        .collect()
}

pub fn print_recent_output(entries: &[RecentEntry]) {
    for line in format_recent_output(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Cache / annotate summaries
// ============================================================================

pub fn format_cache_output(path: &Path, written: usize, staged: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Wrote {} to {}",
        plural(written, "record"),
        path.display()
    )];
    if staged {
        lines.push(format!("{}Staged with git add", indent(1)));
    }
    lines
}

pub fn print_cache_output(path: &Path, written: usize, staged: bool) {
    for line in format_cache_output(path, written, staged) {
        println!("{}", line);
    }
}

pub fn format_annotate_output(output_dir: &Path, annotated: usize, total: usize) -> Vec<String> {
    vec![format!(
        "Annotated {} of {} → {}",
        annotated,
        plural(total, "document"),
        output_dir.display()
    )]
}

pub fn print_annotate_output(output_dir: &Path, annotated: usize, total: usize) {
    for line in format_annotate_output(output_dir, annotated, total) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{Resolved, ResolvedDates, Source};
    use crate::timestamp::Timestamp;
    use crate::types::DocumentRecord;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn header_with_and_without_title() {
        assert_eq!(document_header(1, Some("Install"), "a.md"), "001 Install (a.md)");
        assert_eq!(document_header(2, None, "b.md"), "002 b.md");
        assert_eq!(document_header(3, Some(""), "c.md"), "003 c.md");
    }

    #[test]
    fn author_labels() {
        assert_eq!(author_label(&Author::new("X", "x@e.org")), "X <x@e.org>");
        assert_eq!(author_label(&Author::named("Y")), "Y");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "document"), "1 document");
        assert_eq!(plural(0, "document"), "0 documents");
    }

    // =========================================================================
    // Commands
    // =========================================================================

    #[test]
    fn scan_output_lists_records() {
        let mut history = DatesCache::new();
        history.insert(
            "a.md".into(),
            DocumentRecord {
                created: Some(ts("2020-01-05T10:00:00")),
                authors: Some(vec![Author::new("X", "x@e.org"), Author::named("Y")]),
            },
        );
        let lines = format_scan_output(&history);
        assert_eq!(
            lines,
            vec![
                "001 a.md",
                "    Created: 2020-01-05T10:00:00",
                "    Authors: X <x@e.org>, Y",
                "",
                "History: 1 document",
            ]
        );
    }

    #[test]
    fn scan_output_empty() {
        assert_eq!(format_scan_output(&DatesCache::new()), vec!["History: 0 documents"]);
    }

    #[test]
    fn resolve_output_shows_sources() {
        let doc = ResolvedDocument {
            path: "guide/install.md".into(),
            title: Some("Install".into()),
            dates: ResolvedDates {
                created: Resolved {
                    value: ts("2020-01-05T10:00:00"),
                    source: Source::History,
                },
                modified: Resolved {
                    value: ts("2024-01-10"),
                    source: Source::FrontMatter,
                },
                authors: Some(Resolved {
                    value: vec![Author::named("Jane")],
                    source: Source::Fallback,
                }),
                excluded: true,
            },
        };
        let lines = format_resolve_output(&[doc]);
        assert_eq!(lines[0], "001 Install (guide/install.md)");
        assert_eq!(lines[1], "    Created: 2020-01-05T10:00:00 [history]");
        assert_eq!(lines[2], "    Modified: 2024-01-10T00:00:00 [front-matter]");
        assert_eq!(lines[3], "    Authors: Jane [fallback]");
        assert_eq!(lines[4], "    Excluded");
        assert_eq!(lines.last().unwrap(), "Resolved 1 document (1 excluded)");
    }

    #[test]
    fn recent_output() {
        let entries = vec![RecentEntry {
            path: "a.md".into(),
            title: "Alpha".into(),
            modified: ts("2022-03-07T12:00:00"),
            author: Author::named("Z"),
        }];
        assert_eq!(
            format_recent_output(&entries),
            vec!["001 2022-03-07T12:00:00 Alpha (a.md) by Z"]
        );
        assert_eq!(format_recent_output(&[]), vec!["No recently updated documents"]);
    }

    #[test]
    fn cache_output_mentions_staging() {
        let lines = format_cache_output(Path::new("docs/.dates_cache.jsonl"), 3, true);
        assert_eq!(lines[0], "Wrote 3 records to docs/.dates_cache.jsonl");
        assert_eq!(lines[1], "    Staged with git add");
        assert_eq!(format_cache_output(Path::new("c"), 1, false).len(), 1);
    }

    #[test]
    fn annotate_summary() {
        assert_eq!(
            format_annotate_output(Path::new("out"), 2, 3),
            vec!["Annotated 2 of 3 documents → out"]
        );
    }
}
