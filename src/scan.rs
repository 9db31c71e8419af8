//! Docs directory scanning.
//!
//! Walks the docs directory and loads every markdown document:
//!
//! ```text
//! docs/
//! ├── index.md                # → "index.md"
//! ├── guide/
//! │   ├── install.md          # → "guide/install.md"
//! │   └── usage.md
//! ├── .drafts/                # hidden: skipped
//! └── assets/logo.png         # not markdown: skipped
//! ```
//!
//! Each [`Document`] carries its normalized relative path, parsed
//! front-matter, body, and title. Documents are returned sorted by path.

use crate::filesystem::file_times;
use crate::frontmatter::{self, FrontMatter};
use crate::recent::DocumentSet;
use crate::resolve::DocumentInput;
use crate::types::normalize_rel_path;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Docs directory not found: {0}")]
    MissingDocsDir(PathBuf),
}

/// One markdown document under the docs directory.
#[derive(Debug, Clone)]
pub struct Document {
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub meta: FrontMatter,
    /// Everything after the front-matter block.
    pub body: String,
    pub title: Option<String>,
}

impl Document {
    /// Load one document. `rel_path` is normalized.
    pub fn load(abs_path: &Path, rel_path: &str) -> Result<Self, ScanError> {
        let source = fs::read_to_string(abs_path)?;
        let (meta, body) = frontmatter::split(&source);
        let title = frontmatter::title(&meta, body);
        Ok(Self {
            rel_path: normalize_rel_path(rel_path),
            abs_path: abs_path.to_path_buf(),
            body: body.to_string(),
            meta,
            title,
        })
    }

    /// Resolver input, reading filesystem times now.
    pub fn input(&self) -> DocumentInput<'_> {
        DocumentInput {
            rel_path: &self.rel_path,
            meta: &self.meta,
            file_times: file_times(&self.abs_path),
        }
    }
}

/// All documents of a docs directory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    documents: BTreeMap<String, Document>,
}

impl DocumentIndex {
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn get(&self, rel_path: &str) -> Option<&Document> {
        self.documents.get(rel_path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.rel_path.clone(), document);
    }
}

impl DocumentSet for DocumentIndex {
    fn title(&self, rel_path: &str) -> Option<String> {
        self.get(rel_path)?.title.clone()
    }
}

/// Scan `docs_dir` for markdown documents.
///
/// Only a missing docs directory is an error. Entries that cannot be read
/// or are not UTF-8 are logged and left out of the index.
pub fn scan(docs_dir: &Path) -> Result<DocumentIndex, ScanError> {
    if !docs_dir.is_dir() {
        return Err(ScanError::MissingDocsDir(docs_dir.to_path_buf()));
    }

    let mut index = DocumentIndex::default();
    let walker = WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unreadable docs entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(docs_dir) else {
            continue;
        };
        let rel_path = rel.to_string_lossy();
        let document = match Document::load(entry.path(), &rel_path) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(path = %rel_path, error = %err, "Skipping unreadable document");
                continue;
            }
        };
        tracing::debug!(path = %document.rel_path, title = ?document.title, "Scanned document");
        index.insert(document);
    }

    tracing::info!(documents = index.len(), docs_dir = %docs_dir.display(), "Scanned docs");
    Ok(index)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
