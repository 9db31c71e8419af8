//! # doc-dates
//!
//! Creation dates, update dates, and authors for documentation pages.
//! Every markdown document under a docs directory gets a `(created,
//! modified, authors)` triple, and optionally an HTML info snippet placed
//! in its body.
//!
//! # Architecture: Build Once, Resolve Per Page
//!
//! ```text
//! 1. Context   git log + .dates_cache.jsonl  →  BuildContext   (once per run)
//! 2. Resolve   document + BuildContext       →  ResolvedDates  (per page, no I/O)
//! 3. Render    ResolvedDates                 →  info snippet in the page body
//! ```
//!
//! The expensive part, reading the full git history, happens exactly once.
//! Everything after that is a pure lookup against the immutable context, so
//! the resolver is tested without a repository or a filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`history`] | One `git log` pass → first commit, distinct authors, latest change per document |
//! | [`cache`] | `.dates_cache.jsonl` read/write, overlay merge, `git add` |
//! | [`context`] | [`context::BuildContext`]: history + persisted cache + fallback author |
//! | [`resolve`] | Per-field priority chains with provenance |
//! | [`metadata`] | Dates and authors declared in front-matter |
//! | [`frontmatter`] | YAML front-matter splitting and page titles |
//! | [`filesystem`] | Birth/change/modification stamps with platform fallbacks |
//! | [`timestamp`] | ISO-8601 timestamps with or without offset |
//! | [`scan`] | Walks the docs directory into a [`scan::DocumentIndex`] |
//! | [`recent`] | "Recently updated" listing over navigable documents |
//! | [`render`] | Maud info snippet and its placement in markdown |
//! | [`annotate`] | Resolve a whole site and write annotated copies |
//! | [`config`] | `doc-dates.toml` loading, merging, and validation |
//! | [`types`] | Shared records: `Author`, `DocumentRecord`, `DatesCache` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Nothing Here Aborts a Build
//!
//! Every failure has a fallback: a missing git binary or a non-repository
//! yields empty history; a malformed cache line is skipped; a file that
//! cannot be stat'd is dated "now"; invalid front-matter is treated as
//! absent. The one error surfaced to the caller is a failed `git add` of
//! the cache file, and even then the written file stays.
//!
//! ## `modified` Ignores Git
//!
//! The modified date is front-matter or the file's last-write time, never
//! the last commit. Preview builds run on uncommitted edits, and a date
//! that lags the page the author is looking at is wrong.
//!
//! ## Authors In First-Seen Order
//!
//! History is walked oldest commit first and each `(name, email)` pair is
//! appended the first time it appears. The list reads as "who touched this
//! page, in order", and it is stable across runs.
//!
//! ## Line-Per-Record Cache
//!
//! The cache is JSON Lines with one `{path: record}` object per line,
//! ordered by git's index order. A one-page change is a one-line diff, and
//! a hand-appended line overrides scanner data for that page only.

pub mod annotate;
pub mod cache;
pub mod config;
pub mod context;
pub mod filesystem;
pub mod frontmatter;
pub mod history;
pub mod metadata;
pub mod output;
pub mod recent;
pub mod render;
pub mod resolve;
pub mod scan;
pub mod timestamp;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
