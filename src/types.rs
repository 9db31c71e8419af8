//! Shared record types for the history scan, the cache file, and the resolver.
//!
//! Every map in this crate is keyed by a document path relative to the docs
//! directory, in posix form. [`normalize_rel_path`] produces that form.

use crate::metadata::name_from_email;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Per-document records keyed by normalized relative path.
pub type DatesCache = BTreeMap<String, DocumentRecord>;

/// A document author.
///
/// `name` and `email` are the identity; anything else (role, avatar, url)
/// rides along in `extra` and is written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Whether two authors are the same (name, email) pair.
    pub fn same_identity(&self, other: &Author) -> bool {
        self.name == other.name && self.email == other.email
    }
}

/// Deduplicated copy of `authors`, first-seen order.
///
/// An author without a name takes the local part of its email; one with
/// neither is dropped.
pub fn distinct_authors(authors: impl IntoIterator<Item = Author>) -> Vec<Author> {
    let mut distinct = Vec::new();
    for mut author in authors {
        if author.name.is_empty() {
            if author.email.is_empty() {
                continue;
            }
            author.name = name_from_email(&author.email);
        }
        push_distinct(&mut distinct, author);
    }
    distinct
}

/// Append `author` unless an author with the same (name, email) is present.
///
/// Returns whether the author was added. Keeps first-seen order.
pub fn push_distinct(authors: &mut Vec<Author>, author: Author) -> bool {
    if authors.iter().any(|a| a.same_identity(&author)) {
        return false;
    }
    authors.push(author);
    true
}

/// Dates and authors known for one document.
///
/// Both fields are optional so that a hand-written cache line can carry
/// only the field it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_authors"
    )]
    pub authors: Option<Vec<Author>>,
}

fn deserialize_authors<'de, D>(deserializer: D) -> Result<Option<Vec<Author>>, D::Error>
where
    D: Deserializer<'de>,
{
    let authors: Option<Vec<Author>> = Option::deserialize(deserializer)?;
    Ok(authors.map(distinct_authors))
}

impl DocumentRecord {
    /// Shallow merge: every field present in `overlay` replaces ours.
    pub fn overlay(&mut self, overlay: &DocumentRecord) {
        if let Some(created) = overlay.created {
            self.created = Some(created);
        }
        if let Some(authors) = &overlay.authors {
            self.authors = Some(distinct_authors(authors.iter().cloned()));
        }
    }

    /// Author list, treating an empty list the same as none.
    pub fn authors(&self) -> Option<&[Author]> {
        self.authors.as_deref().filter(|a| !a.is_empty())
    }
}

/// Normalize a relative path: forward slashes, no leading `./` or `/`.
pub fn normalize_rel_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}
