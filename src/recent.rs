//! "Recently updated" listing.
//!
//! Built from the latest commit touching each document. Only documents the
//! site can link to are listed: a [`DocumentSet`] answers whether a path
//! has a title. Documents without one still get their own date stamps; they
//! are just left out here.

use crate::history::LatestChange;
use crate::timestamp::Timestamp;
use crate::types::Author;
use serde::Serialize;

/// The navigable documents of a site.
pub trait DocumentSet {
    /// Title of the document at `rel_path`, if it is part of the site.
    fn title(&self, rel_path: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry {
    pub path: String,
    pub title: String,
    pub modified: Timestamp,
    pub author: Author,
}

/// Up to `limit` entries, newest first. `changes` must already be sorted
/// newest first, as [`crate::history::HistoryLog::latest_changes`] returns.
pub fn recently_updated(
    changes: &[LatestChange],
    docs: &impl DocumentSet,
    limit: usize,
) -> Vec<RecentEntry> {
    changes
        .iter()
        .filter_map(|change| {
            let title = docs.title(&change.path)?;
            Some(RecentEntry {
                path: change.path.clone(),
                title,
                modified: change.modified,
                author: change.author.clone(),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::parse_log;
    use std::collections::BTreeMap;

    struct Titles(BTreeMap<&'static str, &'static str>);

    impl DocumentSet for Titles {
        fn title(&self, rel_path: &str) -> Option<String> {
            self.0.get(rel_path).map(|t| t.to_string())
        }
    }

    const LOG: &str = "\
X|x@example.org|2020-01-05T10:00:00
a.md
b.md
Y|y@example.org|2021-02-06T11:00:00
untitled.md
Z|z@example.org|2022-03-07T12:00:00
a.md
";

    fn titles() -> Titles {
        Titles(BTreeMap::from([("a.md", "Alpha"), ("b.md", "Beta")]))
    }

    #[test]
    fn newest_first_with_titles() {
        let changes = parse_log(LOG, "").latest_changes();
        let recent = recently_updated(&changes, &titles(), 10);
        let paths: Vec<&str> = recent.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
        assert_eq!(recent[0].title, "Alpha");
        assert_eq!(recent[0].author.name, "Z");
        assert_eq!(recent[0].modified.to_iso(), "2022-03-07T12:00:00");
    }

    #[test]
    fn documents_without_title_are_skipped() {
        let changes = parse_log(LOG, "").latest_changes();
        let recent = recently_updated(&changes, &titles(), 10);
        assert!(recent.iter().all(|e| e.path != "untitled.md"));
    }

    #[test]
    fn limit_applies_after_filtering() {
        let changes = parse_log(LOG, "").latest_changes();
        let recent = recently_updated(&changes, &titles(), 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].path, "a.md");
    }

    #[test]
    fn no_history_no_entries() {
        assert!(recently_updated(&[], &titles(), 5).is_empty());
    }
}
