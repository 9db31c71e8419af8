//! Shared test utilities for the doc-dates test suite.
//!
//! Provides document fixtures, a throwaway git repository with controllable
//! commit authors and dates, and lookup helpers over scanned documents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let Some(repo) = GitRepo::init() else { return };
//! repo.commit_file("docs/a.md", "# A\n", ("X", "x@example.org"), "2020-01-05T10:00:00+00:00");
//!
//! let index = scan(&repo.docs_dir()).unwrap();
//! let doc = find_doc(&index, "a.md");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use crate::scan::{Document, DocumentIndex};

// =========================================================================
// Document fixtures
// =========================================================================

/// Write `content` to `root/rel_path`, creating parent directories.
pub fn write_doc(root: &Path, rel_path: &str, content: &str) -> PathBuf {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Find a scanned document by relative path. Panics if not found.
pub fn find_doc<'a>(index: &'a DocumentIndex, rel_path: &str) -> &'a Document {
    index.get(rel_path).unwrap_or_else(|| {
        let paths: Vec<&str> = index.iter().map(|d| d.rel_path.as_str()).collect();
        panic!("document '{rel_path}' not found. Available: {paths:?}")
    })
}

// =========================================================================
// Git fixtures
// =========================================================================

/// Whether a `git` binary is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A temporary git repository with a `docs/` directory.
pub struct GitRepo {
    dir: TempDir,
}

impl GitRepo {
    /// Create an empty repository. `None` when git is not installed.
    pub fn init() -> Option<Self> {
        if !git_available() {
            eprintln!("git not available, skipping");
            return None;
        }
        let repo = Self {
            dir: TempDir::new().unwrap(),
        };
        repo.git(&["init", "--quiet"], &[]);
        repo.git(&["config", "user.name", "Fixture"], &[]);
        repo.git(&["config", "user.email", "fixture@example.org"], &[]);
        repo.git(&["config", "commit.gpgsign", "false"], &[]);
        fs::create_dir_all(repo.docs_dir()).unwrap();
        Some(repo)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root().join("docs")
    }

    /// Write `rel_path` (relative to the repo root) and commit it as
    /// `author` at `date`.
    pub fn commit_file(&self, rel_path: &str, content: &str, author: (&str, &str), date: &str) {
        write_doc(self.root(), rel_path, content);
        self.git(&["add", "--", rel_path], &[]);
        let (name, email) = author;
        let env = [
            ("GIT_AUTHOR_NAME", name),
            ("GIT_AUTHOR_EMAIL", email),
            ("GIT_AUTHOR_DATE", date),
            ("GIT_COMMITTER_NAME", name),
            ("GIT_COMMITTER_EMAIL", email),
            ("GIT_COMMITTER_DATE", date),
        ];
        self.git(&["commit", "--quiet", "-m", &format!("edit {rel_path}")], &env);
    }

    fn git(&self, args: &[&str], env: &[(&str, &str)]) {
        let output = Command::new("git")
            .args(args)
            .envs(env.iter().copied())
            .current_dir(self.root())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
