//! Git history scanning.
//!
//! Walking `git log` once per file is slow on large sites, so the whole
//! markdown history is read in a single invocation and folded into
//! per-document summaries:
//!
//! ```text
//! git -c core.quotepath=false log --reverse --no-merges --name-only \
//!     --format=%an|%ae|%aI -- *.md
//! ```
//!
//! prints, oldest commit first, an author line followed by the touched
//! documents:
//!
//! ```text
//! Ana|ana@example.org|2020-03-01T10:15:00+01:00
//!
//! docs/index.md
//! docs/guide/install.md
//! ```
//!
//! Paths come back relative to the repository root. The docs directory's
//! own prefix (`git rev-parse --show-prefix`) is stripped so keys match the
//! docs-relative form used everywhere else.
//!
//! ## Folding rules
//!
//! - **created**: the first commit seen for a path. Commits are walked
//!   oldest-first, so the earliest commit wins and is never replaced.
//! - **authors**: each commit's (name, email) is appended if not already
//!   present, preserving first-seen order.
//! - **latest change**: the last commit seen for a path, for "recently
//!   updated" listings.
//!
//! A malformed author line (fewer than three `|` fields, unparsable date)
//! is skipped along with its file list. Git failures surface as
//! [`HistoryError`]; the caller decides how to degrade.

use crate::timestamp::Timestamp;
use crate::types::{Author, DatesCache, DocumentRecord, normalize_rel_path, push_distinct};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Pathspec restricting every git query to markdown documents.
pub const DOCUMENT_PATHSPEC: &str = "*.md";

const DOCUMENT_EXTENSION: &str = ".md";

const LOG_FORMAT: &str = "--format=%an|%ae|%aI";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Runs git commands inside one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    program: OsString,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            program: OsString::from("git"),
        }
    }

    /// Use a different executable (tests use a missing one).
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<String, HistoryError> {
        let output = Command::new(&self.program)
            .arg("-c")
            .arg("core.quotepath=false")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;
        if !output.status.success() {
            return Err(HistoryError::Failed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Path of the working directory relative to the repository root,
    /// with a trailing slash (`docs/`), or empty at the root.
    pub fn docs_prefix(&self) -> Result<String, HistoryError> {
        Ok(self.run(&["rev-parse", "--show-prefix"])?.trim().to_string())
    }

    /// Raw markdown history, oldest commit first.
    pub fn document_log(&self) -> Result<String, HistoryError> {
        self.run(&[
            "log",
            "--reverse",
            "--no-merges",
            "--name-only",
            LOG_FORMAT,
            "--",
            DOCUMENT_PATHSPEC,
        ])
    }

    /// Tracked documents relative to the working directory, in index order.
    pub fn tracked_documents(&self) -> Result<Vec<String>, HistoryError> {
        let out = self.run(&["ls-files", "--", DOCUMENT_PATHSPEC])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(normalize_rel_path)
            .collect())
    }

    /// Stage a file.
    pub fn add(&self, path: &Path) -> Result<(), HistoryError> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", path.as_ref()]).map(|_| ())
    }
}

/// One parsed commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub author: Author,
    pub timestamp: Timestamp,
    /// Touched documents, docs-relative.
    pub files: Vec<String>,
}

/// Most recent commit touching a document.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestChange {
    pub path: String,
    pub modified: Timestamp,
    pub author: Author,
}

/// Parsed document history, oldest commit first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    pub commits: Vec<Commit>,
}

impl HistoryLog {
    /// First-commit time and ordered distinct authors per document.
    pub fn first_commits(&self) -> DatesCache {
        let mut index = DatesCache::new();
        for commit in &self.commits {
            for path in &commit.files {
                let record = index.entry(path.clone()).or_insert_with(DocumentRecord::default);
                if record.created.is_none() {
                    record.created = Some(commit.timestamp);
                }
                push_distinct(
                    record.authors.get_or_insert_with(Vec::new),
                    commit.author.clone(),
                );
            }
        }
        index
    }

    /// Last commit per document, newest first.
    pub fn latest_changes(&self) -> Vec<LatestChange> {
        let mut latest: BTreeMap<&str, &Commit> = BTreeMap::new();
        for commit in &self.commits {
            for path in &commit.files {
                latest.insert(path.as_str(), commit);
            }
        }
        let mut changes: Vec<LatestChange> = latest
            .into_iter()
            .map(|(path, commit)| LatestChange {
                path: path.to_string(),
                modified: commit.timestamp,
                author: commit.author.clone(),
            })
            .collect();
        changes.sort_by(|a, b| {
            b.modified
                .sort_key()
                .cmp(&a.modified.sort_key())
                .then_with(|| a.path.cmp(&b.path))
        });
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Parse `git log --name-only --format=%an|%ae|%aI` output.
///
/// `prefix` is stripped from paths that start with it. Commits that touch
/// no documents are dropped.
pub fn parse_log(output: &str, prefix: &str) -> HistoryLog {
    let mut commits = Vec::new();
    let mut current: Option<Commit> = None;

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains('|') {
            commits.extend(current.take().filter(|c| !c.files.is_empty()));
            current = parse_author_line(line);
            if current.is_none() {
                tracing::debug!(line, "Skipping malformed commit header");
            }
        } else if line.ends_with(DOCUMENT_EXTENSION)
            && let Some(commit) = current.as_mut()
        {
            let path = line.strip_prefix(prefix).unwrap_or(line);
            commit.files.push(normalize_rel_path(path));
        }
    }
    commits.extend(current.filter(|c| !c.files.is_empty()));

    HistoryLog { commits }
}

fn parse_author_line(line: &str) -> Option<Commit> {
    let mut fields = line.splitn(3, '|');
    let name = fields.next()?;
    let email = fields.next()?;
    let date = fields.next()?;
    let timestamp = Timestamp::parse(date).ok()?;
    Some(Commit {
        author: Author::new(name.trim(), email.trim()),
        timestamp,
        files: Vec::new(),
    })
}

/// Read and parse the full document history of the repository around
/// `git`'s working directory.
pub fn scan_history(git: &Git) -> Result<HistoryLog, HistoryError> {
    let prefix = git.docs_prefix()?;
    let output = git.document_log()?;
    let log = parse_log(&output, &prefix);
    tracing::debug!(commits = log.commits.len(), prefix = %prefix, "Parsed document history");
    Ok(log)
}
