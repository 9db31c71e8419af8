//! Persisted dates cache for builds without full git history.
//!
//! CI checkouts are often shallow, and hosted builders sometimes have no
//! `.git` at all. Committing the resolved dates next to the documents lets
//! those builds show the same dates as a local one. The cache also serves
//! as a hand-editable override layer: a line written by a person replaces
//! the matching fields of the git-derived record.
//!
//! # Format
//!
//! `<docs_dir>/.dates_cache.jsonl` holds one JSON object per line, each
//! with exactly one key, the docs-relative path:
//!
//! ```text
//! {"index.md":{"created":"2020-01-05T10:00:00+00:00","authors":[{"name":"Ana","email":"ana@example.org"}]}}
//! {"guide/install.md":{"created":"2021-02-06T11:00:00+00:00"}}
//! ```
//!
//! One record per line keeps version-control diffs line-granular, and
//! writing in tracked-file order keeps them stable across builds.
//!
//! # Failure handling
//!
//! Reading never fails: a line that does not decode to a single-entry JSON
//! object is logged and skipped, and an unreadable file yields whatever was
//! parsed before the error. Writing goes through a temporary file and a
//! rename so an interrupted build cannot leave a half-written cache behind.

use crate::history::{Git, HistoryError};
use crate::types::{DatesCache, DocumentRecord};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the cache file within the docs directory.
pub const CACHE_FILENAME: &str = ".dates_cache.jsonl";

/// Older single-object cache format, read when no `.jsonl` file exists.
pub const LEGACY_CACHE_FILENAME: &str = ".dates_cache.json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to stage cache file: {0}")]
    Stage(#[from] HistoryError),
}

/// Resolve the cache file path for a docs directory.
pub fn cache_path(docs_dir: &Path) -> PathBuf {
    docs_dir.join(CACHE_FILENAME)
}

/// Read a JSONL cache file. Missing files yield an empty cache.
pub fn read_cache(path: &Path) -> DatesCache {
    let mut cache = DatesCache::new();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return cache,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Cannot open dates cache");
            return cache;
        }
    };

    for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = match line {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Stopped reading dates cache");
                break;
            }
        };
        let line = match String::from_utf8(line) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %path.display(), line = index + 1, error = %err, "Skipping non-UTF-8 cache line");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok((key, record)) => {
                cache.insert(key, record);
            }
            Err(reason) => {
                tracing::warn!(path = %path.display(), line = index + 1, reason = %reason, "Skipping invalid cache line");
            }
        }
    }
    cache
}

/// Decode one `{"path": record}` line.
fn parse_line(line: &str) -> Result<(String, DocumentRecord), String> {
    let entry: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(line.trim()).map_err(|e| e.to_string())?;
    if entry.len() != 1 {
        return Err(format!("expected exactly one key, found {}", entry.len()));
    }
    let (key, value) = entry
        .into_iter()
        .next()
        .ok_or_else(|| "empty entry".to_string())?;
    let record = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok((key, record))
}

/// Read the legacy single-object `.dates_cache.json`.
///
/// Unlike the line format, one bad record spoils the file, so any parse
/// error yields an empty cache.
pub fn read_legacy_cache(path: &Path) -> DatesCache {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return DatesCache::new(),
    };
    match serde_json::from_str(&content) {
        Ok(cache) => cache,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Ignoring unreadable legacy dates cache");
            DatesCache::new()
        }
    }
}

/// Load the persisted overlay for a docs directory: the JSONL cache, or
/// the legacy JSON file when only that exists.
pub fn load_persisted(docs_dir: &Path) -> DatesCache {
    let jsonl = cache_path(docs_dir);
    if jsonl.exists() {
        return read_cache(&jsonl);
    }
    let legacy = docs_dir.join(LEGACY_CACHE_FILENAME);
    if legacy.exists() {
        tracing::info!(path = %legacy.display(), "Reading legacy dates cache");
        return read_legacy_cache(&legacy);
    }
    DatesCache::new()
}

/// Write `records` as JSONL, one line per key of `ordered_keys` that has a
/// record. Returns the number of lines written.
///
/// The file is written to `<path>.tmp` and renamed over `path`.
pub fn write_cache(
    path: &Path,
    records: &DatesCache,
    ordered_keys: &[String],
) -> Result<usize, CacheError> {
    let tmp = temp_path(path);
    let written = write_lines(&tmp, records, ordered_keys).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })?;
    fs::rename(&tmp, path)?;
    tracing::info!(path = %path.display(), records = written, "Wrote dates cache");
    Ok(written)
}

fn write_lines(tmp: &Path, records: &DatesCache, ordered_keys: &[String]) -> Result<usize, CacheError> {
    let mut out = BufWriter::new(File::create(tmp)?);
    let mut written = 0;
    for key in ordered_keys {
        let Some(record) = records.get(key) else {
            continue;
        };
        let mut entry = serde_json::Map::new();
        entry.insert(key.clone(), serde_json::to_value(record)?);
        serde_json::to_writer(&mut out, &entry)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Shallow-merge every record of `overlay` into `base`, creating entries
/// that `base` lacks. Applying the same overlay twice changes nothing.
pub fn overlay_merge(base: &mut DatesCache, overlay: &DatesCache) {
    for (key, record) in overlay {
        base.entry(key.clone()).or_default().overlay(record);
    }
}

/// Key order for a cache write: tracked documents first, in index order,
/// then every other cached key in sorted order so persisted-only entries
/// survive the rewrite.
pub fn write_order(tracked: &[String], records: &DatesCache) -> Vec<String> {
    let mut keys: Vec<String> = tracked.to_vec();
    let seen: std::collections::HashSet<&str> = tracked.iter().map(String::as_str).collect();
    keys.extend(
        records
            .keys()
            .filter(|k| !seen.contains(k.as_str()))
            .cloned(),
    );
    keys
}

/// `git add` the written cache file.
///
/// This is the one cache operation whose failure is reported to the
/// caller; the written file is left in place.
pub fn stage_cache_file(git: &Git, path: &Path) -> Result<(), CacheError> {
    git.add(path)?;
    tracing::info!(path = %path.display(), "Staged dates cache");
    Ok(())
}
