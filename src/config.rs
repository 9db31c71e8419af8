//! Configuration module.
//!
//! Handles loading, validating, and merging `doc-dates.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged on top, so a
//! config file only needs the keys it changes.
//!
//! ## Config File Location
//!
//! `doc-dates.toml` lives in the project directory (the one holding `docs/`):
//!
//! ```text
//! project/
//! ├── doc-dates.toml
//! └── docs/
//!     ├── .dates_cache.jsonl
//!     ├── index.md
//!     └── guide/
//!         └── install.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! type = "date"             # date | datetime | timeago
//! locale = "en"             # Passed to the <time> element
//! date_format = "%Y-%m-%d"
//! time_format = "%H:%M:%S"
//! position = "bottom"       # top | bottom
//! exclude = []              # "drafts/*" (prefix) or "about.md" (exact)
//! created_field_names = ["created", "date", "creation"]
//! modified_field_names = ["modified", "updated", "last_modified", "last_updated"]
//! show_author = true
//! # site_author = "Jane Doe"  # Fallback author; defaults to the OS user
//!
//! [author_field_mapping]
//! name = ["name", "author"]
//! email = ["email", "mail"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::timestamp::is_valid_format;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the project directory.
pub const CONFIG_FILENAME: &str = "doc-dates.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How dates are shown in the info snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// `date_format` only.
    Date,
    /// `date_format` followed by `time_format`.
    Datetime,
    /// Empty text; a client-side script renders relative time.
    Timeago,
}

/// Where the info snippet goes in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Bottom,
}

/// Tool configuration loaded from `doc-dates.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    /// Display style for dates in the snippet.
    #[serde(rename = "type")]
    pub display_type: DisplayType,
    /// Locale attribute emitted on `<time>` elements.
    pub locale: String,
    /// strftime pattern for the date part.
    pub date_format: String,
    /// strftime pattern for the time part (`datetime` only).
    pub time_format: String,
    /// Snippet position.
    pub position: Position,
    /// Documents that get no snippet. Exact paths, or prefixes ending in `*`.
    pub exclude: Vec<String>,
    /// Front-matter keys tried, in order, for the created date.
    pub created_field_names: Vec<String>,
    /// Front-matter keys tried, in order, for the modified date.
    pub modified_field_names: Vec<String>,
    /// Resolve and show authors at all.
    pub show_author: bool,
    /// Fallback author name when nothing else names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_author: Option<String>,
    /// Flat front-matter keys recognized as author name / email.
    pub author_field_mapping: AuthorFieldMapping,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            display_type: DisplayType::Date,
            locale: "en".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M:%S".to_string(),
            position: Position::Bottom,
            exclude: Vec::new(),
            created_field_names: strings(&["created", "date", "creation"]),
            modified_field_names: strings(&["modified", "updated", "last_modified", "last_updated"]),
            show_author: true,
            site_author: None,
            author_field_mapping: AuthorFieldMapping::default(),
        }
    }
}

/// Flat front-matter aliases for the author name and email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorFieldMapping {
    pub name: Vec<String>,
    pub email: Vec<String>,
}

impl Default for AuthorFieldMapping {
    fn default() -> Self {
        Self {
            name: strings(&["name", "author"]),
            email: strings(&["email", "mail"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DatesConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.created_field_names.is_empty() {
            return Err(ConfigError::Validation(
                "created_field_names must not be empty".into(),
            ));
        }
        if self.modified_field_names.is_empty() {
            return Err(ConfigError::Validation(
                "modified_field_names must not be empty".into(),
            ));
        }
        for (key, pattern) in [
            ("date_format", &self.date_format),
            ("time_format", &self.time_format),
        ] {
            if pattern.trim().is_empty() || !is_valid_format(pattern) {
                return Err(ConfigError::Validation(format!(
                    "{key} is not a valid strftime pattern: {pattern:?}"
                )));
            }
        }
        if self.exclude.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "exclude patterns must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether `rel_path` matches an exclude pattern.
    ///
    /// A pattern ending in `*` matches by prefix (everything before the
    /// first `*`); any other pattern must equal the path.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            if pattern.ends_with('*') {
                let prefix = pattern.split('*').next().unwrap_or_default();
                rel_path.starts_with(prefix)
            } else {
                rel_path == pattern
            }
        })
    }

    /// Locale as written on `<time>` elements (`zh` → `zh_CN`).
    pub fn time_locale(&self) -> &str {
        if self.locale == "zh" {
            "zh_CN"
        } else {
            &self.locale
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DatesConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so arrays
///   such as `exclude` are replaced rather than concatenated.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `doc-dates.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DatesConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DatesConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `doc-dates.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<DatesConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `doc-dates.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# doc-dates Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# How dates are displayed: "date", "datetime", or "timeago".
# "timeago" leaves the text empty for a client-side script to fill in.
type = "date"

# Locale written on <time> elements ("zh" is emitted as "zh_CN").
locale = "en"

# strftime patterns. "datetime" joins them with a space.
date_format = "%Y-%m-%d"
time_format = "%H:%M:%S"

# Where the info snippet goes: "top" (after the first heading) or "bottom".
position = "bottom"

# Documents that get no snippet. Dates are still resolved for them.
# A trailing * matches by prefix: "drafts/*" matches "drafts/foo.md".
exclude = []

# Front-matter keys tried, in order, for the created and modified dates.
created_field_names = ["created", "date", "creation"]
modified_field_names = ["modified", "updated", "last_modified", "last_updated"]

# Resolve and show authors.
show_author = true

# Fallback author when neither front-matter, cache, nor git names one.
# Defaults to the name of the current user's home directory.
# site_author = "Jane Doe"

# ---------------------------------------------------------------------------
# Flat front-matter keys recognized as the author's name and email
# ---------------------------------------------------------------------------
[author_field_mapping]
name = ["name", "author"]
email = ["email", "mail"]
"##
}
