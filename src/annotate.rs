//! Whole-site resolution and annotated output.
//!
//! Ties the scanner, resolver, and renderer together: every scanned
//! document is resolved once against the [`BuildContext`], and `annotate`
//! writes a copy of the docs tree with the info snippet placed in each page.

use crate::context::BuildContext;
use crate::render;
use crate::resolve::{self, ResolvedDates};
use crate::scan::DocumentIndex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Output directory is inside the docs directory: {0}")]
    OutputInsideDocs(PathBuf),
}

/// One document's resolved dates, ready for display or JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDocument {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub dates: ResolvedDates,
}

/// Resolve every document in `index`, in path order.
pub fn resolve_documents(index: &DocumentIndex, ctx: &BuildContext) -> Vec<ResolvedDocument> {
    index
        .iter()
        .map(|doc| ResolvedDocument {
            path: doc.rel_path.clone(),
            title: doc.title.clone(),
            dates: resolve::resolve(&doc.input(), ctx),
        })
        .collect()
}

/// Write each resolved document under `output_dir`, mirroring its relative
/// path. Returns how many documents received a snippet.
pub fn write_annotated(
    index: &DocumentIndex,
    resolved: &[ResolvedDocument],
    ctx: &BuildContext,
    docs_dir: &Path,
    output_dir: &Path,
) -> Result<usize, AnnotateError> {
    if canonical_target(output_dir)?.starts_with(canonical_target(docs_dir)?) {
        return Err(AnnotateError::OutputInsideDocs(output_dir.to_path_buf()));
    }

    let mut annotated = 0;
    for entry in resolved {
        let Some(doc) = index.get(&entry.path) else {
            continue;
        };
        let source = fs::read_to_string(&doc.abs_path)?;
        let out = render::annotate(&source, &entry.dates, &ctx.config);
        let dest = output_dir.join(&entry.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, out)?;
        if entry.dates.excluded {
            tracing::debug!(path = %entry.path, "Excluded; copied unchanged");
        } else {
            annotated += 1;
        }
    }
    tracing::info!(
        annotated,
        total = resolved.len(),
        output = %output_dir.display(),
        "Wrote annotated documents"
    );
    Ok(annotated)
}

/// Real location `path` would have once created.
///
/// Existing prefixes are canonicalized so symlinks resolve; the rest is
/// joined lexically, with `..` popping the previous component.
fn canonical_target(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = resolved.canonicalize() {
                    resolved = real;
                }
            }
            Component::Prefix(_) | Component::RootDir => resolved.push(component),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatesConfig;
    use crate::history::HistoryLog;
    use crate::scan::scan;
    use crate::test_helpers::write_doc;
    use crate::types::DatesCache;
    use tempfile::TempDir;

    fn context(config: DatesConfig) -> BuildContext {
        BuildContext::new(config, &HistoryLog::default(), DatesCache::new())
    }

    #[test]
    fn resolves_every_document_in_path_order() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "b.md", "# B\n");
        write_doc(tmp.path(), "a.md", "---\ncreated: 2020-02-02\n---\n# A\n");
        let index = scan(tmp.path()).unwrap();

        let resolved = resolve_documents(&index, &context(DatesConfig::default()));
        let paths: Vec<&str> = resolved.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
        assert_eq!(resolved[0].dates.created.value.to_iso(), "2020-02-02T00:00:00");
        assert_eq!(resolved[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn json_export_flattens_dates() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "a.md", "---\ncreated: 2020-02-02\n---\n# A\n");
        let index = scan(tmp.path()).unwrap();
        let resolved = resolve_documents(&index, &context(DatesConfig::default()));

        let json = serde_json::to_value(&resolved[0]).unwrap();
        assert_eq!(json["path"], "a.md");
        assert_eq!(json["created"]["value"], "2020-02-02T00:00:00");
        assert_eq!(json["created"]["source"], "front-matter");
        assert_eq!(json["excluded"], false);
    }

    #[test]
    fn writes_annotated_tree_and_copies_excluded() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_doc(docs.path(), "guide/a.md", "# A\n");
        write_doc(docs.path(), "drafts/wip.md", "# WIP\n");
        let index = scan(docs.path()).unwrap();
        let ctx = context(DatesConfig {
            exclude: vec!["drafts/*".into()],
            ..DatesConfig::default()
        });
        let resolved = resolve_documents(&index, &ctx);

        let count = write_annotated(&index, &resolved, &ctx, docs.path(), out.path()).unwrap();
        assert_eq!(count, 1);

        let a = fs::read_to_string(out.path().join("guide/a.md")).unwrap();
        assert!(a.contains("document-dates-plugin-wrapper"));
        let wip = fs::read_to_string(out.path().join("drafts/wip.md")).unwrap();
        assert_eq!(wip, "# WIP\n");
    }

    #[test]
    fn refuses_output_inside_docs() {
        let docs = TempDir::new().unwrap();
        write_doc(docs.path(), "a.md", "# A\n");
        let index = scan(docs.path()).unwrap();
        let ctx = context(DatesConfig::default());
        let resolved = resolve_documents(&index, &ctx);

        let result = write_annotated(&index, &resolved, &ctx, docs.path(), &docs.path().join("out"));
        assert!(matches!(result, Err(AnnotateError::OutputInsideDocs(_))));
    }

    #[test]
    fn refuses_output_reaching_docs_through_parent_segments() {
        let base = TempDir::new().unwrap();
        let docs = base.path().join("docs");
        write_doc(&docs, "a.md", "# A\n");
        fs::create_dir_all(base.path().join("site")).unwrap();
        let index = scan(&docs).unwrap();
        let ctx = context(DatesConfig::default());
        let resolved = resolve_documents(&index, &ctx);

        for output in [
            base.path().join("site/../docs/out"),
            base.path().join("site/new/../../docs/out"),
        ] {
            let result = write_annotated(&index, &resolved, &ctx, &docs, &output);
            assert!(matches!(result, Err(AnnotateError::OutputInsideDocs(_))), "{output:?}");
        }
        assert!(!docs.join("out").exists());
    }

    #[cfg(unix)]
    #[test]
    fn refuses_output_reaching_docs_through_symlink() {
        let base = TempDir::new().unwrap();
        let docs = base.path().join("docs");
        write_doc(&docs, "a.md", "# A\n");
        std::os::unix::fs::symlink(&docs, base.path().join("alias")).unwrap();
        let index = scan(&docs).unwrap();
        let ctx = context(DatesConfig::default());
        let resolved = resolve_documents(&index, &ctx);

        let result =
            write_annotated(&index, &resolved, &ctx, &docs, &base.path().join("alias/out"));
        assert!(matches!(result, Err(AnnotateError::OutputInsideDocs(_))));
        assert!(!docs.join("out").exists());
    }

    #[test]
    fn sibling_output_with_parent_segments_is_allowed() {
        let base = TempDir::new().unwrap();
        let docs = base.path().join("docs");
        write_doc(&docs, "a.md", "# A\n");
        let index = scan(&docs).unwrap();
        let ctx = context(DatesConfig::default());
        let resolved = resolve_documents(&index, &ctx);

        let output = docs.join("../site");
        let count = write_annotated(&index, &resolved, &ctx, &docs, &output).unwrap();
        assert_eq!(count, 1);
        assert!(base.path().join("site/a.md").exists());
    }
}
