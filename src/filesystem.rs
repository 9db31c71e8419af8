//! Filesystem creation and modification stamps.
//!
//! Creation time is platform dependent. The first available of these wins:
//!
//! 1. birth time, where the OS and filesystem record one (macOS, Windows,
//!    Linux with `statx` on most modern filesystems)
//! 2. inode change time (`ctime`) on unix
//! 3. last modification time
//!
//! Modification time is always the last-write stamp. A path that cannot be
//! stat'd gets "now" for both, so every document has a displayable date.

use crate::timestamp::Timestamp;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

/// Creation and modification time of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: Timestamp,
    pub modified: Timestamp,
}

impl FileTimes {
    /// Both stamps set to the current time.
    pub fn now() -> Self {
        let now = Timestamp::now();
        Self {
            created: now,
            modified: now,
        }
    }
}

/// Read the creation and modification stamps of `path`.
///
/// Never fails: stat errors are logged and replaced by the current time.
pub fn file_times(path: &Path) -> FileTimes {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Failed to stat file; using current time");
            return FileTimes::now();
        }
    };
    let modified = match meta.modified() {
        Ok(time) => Timestamp::from_system_time(time),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "No modification time; using current time");
            Timestamp::now()
        }
    };
    let created = creation_time(&meta)
        .map(Timestamp::from_system_time)
        .unwrap_or(modified);
    FileTimes { created, modified }
}

fn creation_time(meta: &Metadata) -> Option<SystemTime> {
    meta.created()
        .ok()
        .or_else(|| change_time(meta))
        .or_else(|| meta.modified().ok())
}

#[cfg(unix)]
fn change_time(meta: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = u64::try_from(meta.ctime()).ok()?;
    let nanos = u32::try_from(meta.ctime_nsec()).ok()?;
    Some(UNIX_EPOCH + Duration::new(secs, nanos))
}

#[cfg(not(unix))]
fn change_time(_meta: &Metadata) -> Option<SystemTime> {
    None
}
