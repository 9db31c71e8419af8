//! Dates and authors declared in front-matter.
//!
//! Front-matter is the override layer: anything a writer states explicitly
//! beats git history and the filesystem. Field names are configurable alias
//! lists tried in order.
//!
//! ## Dates
//!
//! The first alias present whose value parses as ISO-8601 wins. Values are
//! taken as text, stray quote characters are stripped from both ends, and any
//! offset is dropped, so `created: "2024-01-10T09:00:00+08:00"` resolves to
//! the naive `2024-01-10T09:00:00`. A value that does not parse is skipped
//! and the next alias is tried.
//!
//! ## Authors
//!
//! Tried in this order:
//!
//! 1. `author:` as a mapping (`name`, `email`, anything else kept as an
//!    extension attribute). A mapping without a name yields no author.
//! 2. `author:` as a bare scalar: the name.
//! 3. `author:` as a list of mappings or scalars, de-duplicated.
//! 4. Flat alias fields (`name`/`author`, `email`/`mail` by default). With
//!    only an email, the name is its local part (`ana@x.org` → `ana`).
//!
//! An empty `author:` value falls through to the flat aliases.

use crate::config::AuthorFieldMapping;
use crate::frontmatter::{FrontMatter, scalar_text};
use crate::timestamp::Timestamp;
use crate::types::{Author, push_distinct};
use serde_yaml::Value;

/// First parsable date among `field_names`, offset dropped.
pub fn find_date(meta: &FrontMatter, field_names: &[String]) -> Option<Timestamp> {
    field_names.iter().find_map(|field| {
        let raw = meta.get(field).and_then(scalar_text)?;
        let cleaned = raw.trim().trim_matches(|c| c == '\'' || c == '"');
        match Timestamp::parse(cleaned) {
            Ok(ts) => Some(ts.without_offset()),
            Err(err) => {
                tracing::debug!(field = %field, error = %err, "Ignoring unparsable front-matter date");
                None
            }
        }
    })
}

/// Authors declared in front-matter, if any.
pub fn find_authors(meta: &FrontMatter, mapping: &AuthorFieldMapping) -> Option<Vec<Author>> {
    if let Some(value) = meta.get("author").filter(|v| is_truthy(v)) {
        return authors_from_value(value);
    }
    author_from_aliases(meta, mapping).map(|author| vec![author])
}

fn authors_from_value(value: &Value) -> Option<Vec<Author>> {
    match value {
        Value::Sequence(items) => {
            let mut authors = Vec::new();
            for author in items.iter().filter_map(author_from_entry) {
                push_distinct(&mut authors, author);
            }
            (!authors.is_empty()).then_some(authors)
        }
        other => author_from_entry(other).map(|author| vec![author]),
    }
}

fn author_from_entry(value: &Value) -> Option<Author> {
    match value {
        Value::Mapping(map) => {
            let name = map.get("name").and_then(scalar_text).unwrap_or_default();
            if name.is_empty() {
                return None;
            }
            let email = map.get("email").and_then(scalar_text).unwrap_or_default();
            let mut author = Author::new(name, email);
            for (key, val) in map {
                let Some(key) = key.as_str() else { continue };
                if key == "name" || key == "email" {
                    continue;
                }
                if let Ok(json) = serde_json::to_value(val) {
                    author.extra.insert(key.to_string(), json);
                }
            }
            Some(author)
        }
        Value::Tagged(tagged) => author_from_entry(&tagged.value),
        scalar => scalar_text(scalar)
            .filter(|name| !name.is_empty())
            .map(Author::named),
    }
}

fn author_from_aliases(meta: &FrontMatter, mapping: &AuthorFieldMapping) -> Option<Author> {
    let first_text = |fields: &[String]| {
        fields
            .iter()
            .find(|field| meta.contains(field))
            .and_then(|field| meta.text(field))
            .unwrap_or_default()
    };
    let mut name = first_text(&mapping.name);
    let email = first_text(&mapping.email);
    if name.is_empty() && email.is_empty() {
        return None;
    }
    if name.is_empty() {
        name = name_from_email(&email);
    }
    Some(Author::new(name, email))
}

/// Display name derived from an email's local part.
pub fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}
