//! YAML front-matter splitting.
//!
//! A document may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Install
//! created: 2023-04-01
//! author:
//!   name: Ana
//!   email: ana@example.org
//! ---
//! # Install
//! ```
//!
//! The block closes with `---` or `...`. Malformed YAML is logged and
//! treated as empty metadata so the document still gets dates.

use serde_yaml::Value;
use std::collections::BTreeMap;

/// Parsed front-matter: top-level keys to raw YAML values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(BTreeMap<String, Value>);

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Build from a YAML mapping, keeping only string-like keys.
    pub fn from_mapping(mapping: &serde_yaml::Mapping) -> Self {
        let entries = mapping
            .iter()
            .filter_map(|(k, v)| scalar_text(k).map(|key| (key, v.clone())))
            .collect();
        Self(entries)
    }

    /// Text of a scalar field, if present and scalar.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }
}

/// Render a scalar YAML value as text. Null, sequences, and mappings have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Split a document into its front-matter and body.
///
/// Documents without a leading `---` line, or with an unterminated block,
/// are returned whole with empty front-matter.
pub fn split(source: &str) -> (FrontMatter, &str) {
    let Some(rest) = strip_fence_line(source) else {
        return (FrontMatter::default(), source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\r', '\n']);
        if bare == "---" || bare == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (parse_yaml(yaml), body);
        }
        offset += line.len();
    }
    (FrontMatter::default(), source)
}

fn strip_fence_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix("---")?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_yaml(yaml: &str) -> FrontMatter {
    if yaml.trim().is_empty() {
        return FrontMatter::default();
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => FrontMatter::from_mapping(&mapping),
        Ok(_) => {
            tracing::warn!("Front-matter is not a mapping; ignoring it");
            FrontMatter::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Invalid YAML front-matter; ignoring it");
            FrontMatter::default()
        }
    }
}

/// Page title: front-matter `title`, else the first `# ` heading.
pub fn title(meta: &FrontMatter, body: &str) -> Option<String> {
    meta.text("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            body.lines()
                .find(|line| line.starts_with("# "))
                .map(|line| line.trim_start_matches("# ").trim().to_string())
                .filter(|t| !t.is_empty())
        })
}
