//! Per-build state shared by every resolution call.
//!
//! [`BuildContext`] is built once at the start of a run: git history is
//! scanned, the persisted cache is loaded, and the fallback author is
//! chosen. It is then passed by reference to [`crate::resolve::resolve`]
//! for each document and never mutated.

use crate::cache;
use crate::config::DatesConfig;
use crate::history::{self, Git, HistoryLog, LatestChange};
use crate::types::DatesCache;
use std::path::Path;

/// Name used when neither a site author nor a home directory is available.
pub const UNKNOWN_AUTHOR: &str = "unknown";

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub config: DatesConfig,
    /// First-commit records derived from git history.
    pub history: DatesCache,
    /// Records loaded from the on-disk cache.
    pub persisted: DatesCache,
    latest: Vec<LatestChange>,
    fallback_author: String,
}

impl BuildContext {
    pub fn new(config: DatesConfig, log: &HistoryLog, persisted: DatesCache) -> Self {
        let fallback_author = fallback_author_name(&config);
        Self {
            history: log.first_commits(),
            latest: log.latest_changes(),
            persisted,
            fallback_author,
            config,
        }
    }

    /// Scan git history under `docs_dir` and load the persisted cache.
    ///
    /// A failed scan is logged and treated as an empty history.
    pub fn load(docs_dir: &Path, config: DatesConfig) -> Self {
        let git = Git::new(docs_dir);
        let log = match history::scan_history(&git) {
            Ok(log) => log,
            Err(err) => {
                tracing::warn!(
                    docs_dir = %docs_dir.display(),
                    error = %err,
                    "Git history unavailable; using cache and filesystem dates"
                );
                HistoryLog::default()
            }
        };
        let persisted = cache::load_persisted(docs_dir);
        tracing::info!(
            history = log.commits.len(),
            cached = persisted.len(),
            "Build context ready"
        );
        Self::new(config, &log, persisted)
    }

    /// History records with the persisted cache overlaid.
    pub fn merged_cache(&self) -> DatesCache {
        let mut merged = self.history.clone();
        cache::overlay_merge(&mut merged, &self.persisted);
        merged
    }

    /// Most recent change per document, newest first.
    pub fn latest_changes(&self) -> &[LatestChange] {
        &self.latest
    }

    pub fn fallback_author(&self) -> &str {
        &self.fallback_author
    }
}

/// Configured site author, else the name of the user's home directory.
pub fn fallback_author_name(config: &DatesConfig) -> String {
    config
        .site_author
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(os_user_name)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

fn os_user_name() -> Option<String> {
    dirs::home_dir()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
