//! Final created/modified/authors for one document.
//!
//! Each field has an ordered chain of lookups. The first lookup that
//! returns a value wins and no later source is consulted for that field:
//!
//! ```text
//! created   front-matter → cache → history → filesystem birth time
//! modified  front-matter → filesystem last-write time
//! authors   front-matter → cache → history → fallback author
//! ```
//!
//! `modified` deliberately skips cache and history so uncommitted edits show
//! up in preview builds. Authors are only resolved when `show_author` is on.
//!
//! Resolution does no I/O: filesystem times are read by the caller and
//! passed in through [`DocumentInput`].

use crate::context::BuildContext;
use crate::filesystem::FileTimes;
use crate::frontmatter::FrontMatter;
use crate::metadata;
use crate::timestamp::Timestamp;
use crate::types::{Author, DatesCache, distinct_authors};
use serde::Serialize;
use std::fmt;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    FrontMatter,
    Cache,
    History,
    Filesystem,
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::FrontMatter => "front-matter",
            Source::Cache => "cache",
            Source::History => "history",
            Source::Filesystem => "filesystem",
            Source::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Everything the resolver needs to know about one document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInput<'a> {
    pub rel_path: &'a str,
    pub meta: &'a FrontMatter,
    pub file_times: FileTimes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDates {
    pub created: Resolved<Timestamp>,
    pub modified: Resolved<Timestamp>,
    /// `None` when author display is disabled.
    pub authors: Option<Resolved<Vec<Author>>>,
    /// Matches an exclude pattern; dates are resolved but not displayed.
    pub excluded: bool,
}

type Lookup<T> = fn(&DocumentInput<'_>, &BuildContext) -> Option<T>;

const CREATED: &[(Source, Lookup<Timestamp>)] = &[
    (Source::FrontMatter, created_from_meta),
    (Source::Cache, created_from_cache),
    (Source::History, created_from_history),
];

const MODIFIED: &[(Source, Lookup<Timestamp>)] = &[(Source::FrontMatter, modified_from_meta)];

const AUTHORS: &[(Source, Lookup<Vec<Author>>)] = &[
    (Source::FrontMatter, authors_from_meta),
    (Source::Cache, authors_from_cache),
    (Source::History, authors_from_history),
];

/// Resolve one document against the build context.
pub fn resolve(doc: &DocumentInput<'_>, ctx: &BuildContext) -> ResolvedDates {
    let created = first_present(CREATED, doc, ctx)
        .unwrap_or_else(|| Resolved::new(doc.file_times.created, Source::Filesystem));
    let modified = first_present(MODIFIED, doc, ctx)
        .unwrap_or_else(|| Resolved::new(doc.file_times.modified, Source::Filesystem));
    let authors = ctx.config.show_author.then(|| {
        first_present(AUTHORS, doc, ctx).unwrap_or_else(|| {
            Resolved::new(vec![Author::named(ctx.fallback_author())], Source::Fallback)
        })
    });

    ResolvedDates {
        created,
        modified,
        authors,
        excluded: ctx.config.is_excluded(doc.rel_path),
    }
}

fn first_present<T>(
    chain: &[(Source, Lookup<T>)],
    doc: &DocumentInput<'_>,
    ctx: &BuildContext,
) -> Option<Resolved<T>> {
    chain
        .iter()
        .find_map(|(source, lookup)| lookup(doc, ctx).map(|value| Resolved::new(value, *source)))
}

fn created_from_meta(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Timestamp> {
    metadata::find_date(doc.meta, &ctx.config.created_field_names)
}

fn modified_from_meta(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Timestamp> {
    metadata::find_date(doc.meta, &ctx.config.modified_field_names)
}

fn created_from_cache(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Timestamp> {
    created_in(&ctx.persisted, doc.rel_path)
}

fn created_from_history(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Timestamp> {
    created_in(&ctx.history, doc.rel_path)
}

fn authors_from_meta(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Vec<Author>> {
    metadata::find_authors(doc.meta, &ctx.config.author_field_mapping)
}

fn authors_from_cache(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Vec<Author>> {
    authors_in(&ctx.persisted, doc.rel_path)
}

fn authors_from_history(doc: &DocumentInput<'_>, ctx: &BuildContext) -> Option<Vec<Author>> {
    authors_in(&ctx.history, doc.rel_path)
}

fn created_in(records: &DatesCache, rel_path: &str) -> Option<Timestamp> {
    records.get(rel_path)?.created
}

fn authors_in(records: &DatesCache, rel_path: &str) -> Option<Vec<Author>> {
    records
        .get(rel_path)?
        .authors()
        .map(|authors| distinct_authors(authors.iter().cloned()))
}
