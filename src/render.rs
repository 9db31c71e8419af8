//! Date/author info snippet and its placement in a markdown document.
//!
//! The snippet is plain HTML embedded in the markdown source:
//!
//! ```html
//! <div class="document-dates-plugin-wrapper document-dates-bottom">
//!   <div class="document-dates-plugin">
//!     <span data-tippy-content="Created: 2023-04-01">
//!       <span class="material-icons" data-icon="doc_created"></span>
//!       <time datetime="2023-04-01T10:00:00" locale="en">2023-04-01</time>
//!     </span>
//!     <span data-tippy-content="Last Update: …">…</span>
//!     <span data-tippy-content="Author: …">…</span>
//!   </div>
//! </div>
//! ```
//!
//! Tooltip text goes through `data-tippy-content` and may contain markup
//! (author `mailto:` links), escaped once by Maud so the tooltip library
//! receives it as HTML.
//!
//! ## Placement
//!
//! - `bottom`: appended after a blank line.
//! - `top`: inserted after the first body line when it is an H1 (`# ` or
//!   `<h1`), skipping blank lines and HTML comments. Otherwise prepended.

use crate::config::{DatesConfig, DisplayType, Position};
use crate::frontmatter;
use crate::resolve::ResolvedDates;
use crate::timestamp::Timestamp;
use crate::types::Author;
use maud::{Markup, html};

pub const LABEL_CREATED: &str = "Created";
pub const LABEL_MODIFIED: &str = "Last Update";
pub const LABEL_AUTHOR: &str = "Author";
pub const LABEL_AUTHORS: &str = "Authors";

/// Render the info snippet for one document.
pub fn render_info(dates: &ResolvedDates, config: &DatesConfig) -> Markup {
    let position_class = match config.position {
        Position::Top => "document-dates-top",
        Position::Bottom => "document-dates-bottom",
    };
    let authors = dates
        .authors
        .as_ref()
        .map(|a| a.value.as_slice())
        .filter(|a| !a.is_empty());

    html! {
        div class={ "document-dates-plugin-wrapper " (position_class) } {
            div.document-dates-plugin {
                (date_span(LABEL_CREATED, "doc_created", &dates.created.value, config))
                (date_span(LABEL_MODIFIED, "doc_modified", &dates.modified.value, config))
                @if let Some(authors) = authors {
                    (author_span(authors))
                }
            }
        }
    }
}

fn date_span(label: &str, icon: &str, ts: &Timestamp, config: &DatesConfig) -> Markup {
    let tooltip = format!("{label}: {}", ts.format(&config.date_format));
    html! {
        span data-tippy-content=(tooltip) {
            span.material-icons data-icon=(icon) {}
            time datetime=(ts.to_iso()) locale=(config.time_locale()) {
                (display_date(ts, config))
            }
        }
    }
}

fn author_span(authors: &[Author]) -> Markup {
    let (label, icon, text) = match authors {
        [single] => (LABEL_AUTHOR, "doc_author", single.name.clone()),
        many => {
            let names: Vec<&str> = many
                .iter()
                .map(|a| a.name.as_str())
                .filter(|n| !n.is_empty())
                .collect();
            (LABEL_AUTHORS, "doc_authors", names.join(", "))
        }
    };
    let links: Vec<String> = authors.iter().map(author_tooltip).collect();
    let tooltip = format!("{label}: {}", links.join(",\u{a0}"));
    html! {
        span data-tippy-content=(tooltip) {
            span.material-icons data-icon=(icon) {}
            (text)
        }
    }
}

fn author_tooltip(author: &Author) -> String {
    if author.email.is_empty() {
        author.name.clone()
    } else {
        format!(r#"<a href="mailto:{}">{}</a>"#, author.email, author.name)
    }
}

/// Visible date text for the configured display type.
pub fn display_date(ts: &Timestamp, config: &DatesConfig) -> String {
    match config.display_type {
        DisplayType::Timeago => String::new(),
        DisplayType::Datetime => {
            ts.format(&format!("{} {}", config.date_format, config.time_format))
        }
        DisplayType::Date => ts.format(&config.date_format),
    }
}

/// Place `info` in a markdown body according to `position`.
pub fn insert_info(markdown: &str, info: &str, position: Position) -> String {
    match position {
        Position::Bottom => format!("{markdown}\n\n{info}"),
        Position::Top => {
            let (first_line, insert_at) = find_body_start(markdown);
            if first_line.starts_with("# ") || first_line.starts_with("<h1") {
                let (head, tail) = markdown.split_at(insert_at);
                let sep = if head.ends_with('\n') { "" } else { "\n" };
                format!("{head}{sep}{info}\n{tail}")
            } else {
                format!("{info}\n{markdown}")
            }
        }
    }
}

/// First content line of `text` (left-trimmed) and the byte offset just
/// past it. Blank lines and HTML comments are skipped.
pub fn find_body_start(text: &str) -> (&str, usize) {
    let mut pos = 0;
    let mut in_comment = false;

    while pos < text.len() {
        let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
        let content = text[pos..line_end].trim_start_matches([' ', '\t', '\r']);
        let mut start = line_end - content.len();

        if start < line_end {
            if !in_comment && text[start..].starts_with("<!--") {
                in_comment = true;
                start += 4;
            }
            if in_comment {
                match text[start..line_end].find("-->") {
                    Some(i) => {
                        in_comment = false;
                        pos = start + i + 3;
                    }
                    None => pos = line_end + 1,
                }
                continue;
            }
            let next = (line_end + 1).min(text.len());
            return (&text[start..line_end], next);
        }
        pos = line_end + 1;
    }
    ("", text.len())
}

/// Full document source with the info snippet placed in its body.
///
/// Front-matter is kept verbatim. Excluded documents come back unchanged.
pub fn annotate(source: &str, dates: &ResolvedDates, config: &DatesConfig) -> String {
    if dates.excluded {
        return source.to_string();
    }
    let (_, body) = frontmatter::split(source);
    let head = &source[..source.len() - body.len()];
    let info = render_info(dates, config).into_string();
    format!("{head}{}", insert_info(body, &info, config.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{Resolved, Source};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn dates(authors: Option<Vec<Author>>) -> ResolvedDates {
        ResolvedDates {
            created: Resolved {
                value: ts("2023-04-01T10:00:00"),
                source: Source::History,
            },
            modified: Resolved {
                value: ts("2024-01-10T12:30:00"),
                source: Source::Filesystem,
            },
            authors: authors.map(|value| Resolved {
                value,
                source: Source::History,
            }),
            excluded: false,
        }
    }

    // =========================================================================
    // Snippet
    // =========================================================================

    #[test]
    fn snippet_structure() {
        let html = render_info(&dates(None), &DatesConfig::default()).into_string();
        assert!(html.starts_with(
            r#"<div class="document-dates-plugin-wrapper document-dates-bottom"><div class="document-dates-plugin">"#
        ));
        assert!(html.contains(r#"data-tippy-content="Created: 2023-04-01""#));
        assert!(html.contains(r#"data-tippy-content="Last Update: 2024-01-10""#));
        assert!(html.contains(
            r#"<time datetime="2023-04-01T10:00:00" locale="en">2023-04-01</time>"#
        ));
        assert!(html.contains(r#"<span class="material-icons" data-icon="doc_modified"></span>"#));
        assert!(!html.contains("doc_author"));
    }

    #[test]
    fn top_position_class() {
        let config = DatesConfig {
            position: Position::Top,
            ..DatesConfig::default()
        };
        let html = render_info(&dates(None), &config).into_string();
        assert!(html.contains("document-dates-top"));
    }

    #[test]
    fn zh_locale_maps_to_zh_cn() {
        let config = DatesConfig {
            locale: "zh".into(),
            ..DatesConfig::default()
        };
        let html = render_info(&dates(None), &config).into_string();
        assert!(html.contains(r#"locale="zh_CN""#));
    }

    #[test]
    fn timeago_leaves_text_empty() {
        let config = DatesConfig {
            display_type: DisplayType::Timeago,
            ..DatesConfig::default()
        };
        let html = render_info(&dates(None), &config).into_string();
        assert!(html.contains(r#"locale="en"></time>"#));
    }

    #[test]
    fn datetime_includes_time() {
        let config = DatesConfig {
            display_type: DisplayType::Datetime,
            ..DatesConfig::default()
        };
        assert_eq!(
            display_date(&ts("2024-01-10T12:30:00"), &config),
            "2024-01-10 12:30:00"
        );
    }

    #[test]
    fn single_author_with_mailto_tooltip() {
        let html = render_info(
            &dates(Some(vec![Author::new("Ana", "ana@example.org")])),
            &DatesConfig::default(),
        )
        .into_string();
        assert!(html.contains(
            r#"data-tippy-content="Author: &lt;a href=&quot;mailto:ana@example.org&quot;&gt;Ana&lt;/a&gt;""#
        ));
        assert!(html.contains(r#"data-icon="doc_author"></span>Ana</span>"#));
    }

    #[test]
    fn multiple_authors_comma_joined() {
        let html = render_info(
            &dates(Some(vec![Author::named("Ana"), Author::named("Bo")])),
            &DatesConfig::default(),
        )
        .into_string();
        assert!(html.contains("Authors: Ana,\u{a0}Bo"));
        assert!(html.contains(r#"data-icon="doc_authors"></span>Ana, Bo</span>"#));
    }

    #[test]
    fn author_names_are_escaped() {
        let html = render_info(
            &dates(Some(vec![Author::named("<script>")])),
            &DatesConfig::default(),
        )
        .into_string();
        assert!(!html.contains("<script>"));
    }

    // =========================================================================
    // Placement
    // =========================================================================

    #[test]
    fn bottom_appends_after_blank_line() {
        assert_eq!(
            insert_info("# T\n\nBody.", "<div/>", Position::Bottom),
            "# T\n\nBody.\n\n<div/>"
        );
    }

    #[test]
    fn top_inserts_after_h1() {
        assert_eq!(
            insert_info("# Title\nBody\n", "<div/>", Position::Top),
            "# Title\n<div/>\nBody\n"
        );
    }

    #[test]
    fn top_skips_blank_lines_and_comments() {
        let md = "\n  \n<!-- note\nmore -->\n<!-- one line -->\n# Title\nBody\n";
        let out = insert_info(md, "<div/>", Position::Top);
        assert!(out.ends_with("# Title\n<div/>\nBody\n"));
    }

    #[test]
    fn top_accepts_html_heading() {
        let out = insert_info("<h1>Title</h1>\ntext", "<div/>", Position::Top);
        assert_eq!(out, "<h1>Title</h1>\n<div/>\ntext");
    }

    #[test]
    fn top_prepends_without_heading() {
        assert_eq!(
            insert_info("Intro\n# Later\n", "<div/>", Position::Top),
            "<div/>\nIntro\n# Later\n"
        );
    }

    #[test]
    fn top_heading_without_trailing_newline() {
        assert_eq!(
            insert_info("# Only", "<div/>", Position::Top),
            "# Only\n<div/>\n"
        );
    }

    #[test]
    fn body_start_of_empty_text() {
        assert_eq!(find_body_start(""), ("", 0));
        assert_eq!(find_body_start("\n\n"), ("", 2));
    }

    #[test]
    fn body_start_after_inline_comment() {
        let (line, _) = find_body_start("<!-- c --> # Title\n");
        assert_eq!(line, "# Title");
    }

    // =========================================================================
    // Annotate
    // =========================================================================

    #[test]
    fn annotate_keeps_front_matter() {
        let source = "---\ntitle: T\n---\n# T\nBody\n";
        let config = DatesConfig {
            position: Position::Top,
            ..DatesConfig::default()
        };
        let out = annotate(source, &dates(None), &config);
        assert!(out.starts_with("---\ntitle: T\n---\n# T\n<div class=\"document-dates-plugin-wrapper"));
        assert!(out.ends_with("</div></div>\nBody\n"));
    }

    #[test]
    fn annotate_skips_excluded() {
        let mut d = dates(None);
        d.excluded = true;
        let source = "# T\n";
        assert_eq!(annotate(source, &d, &DatesConfig::default()), source);
    }
}
