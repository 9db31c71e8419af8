use clap::{Parser, Subcommand};
use doc_dates::annotate::{self, ResolvedDocument};
use doc_dates::context::BuildContext;
use doc_dates::history::{self, Git};
use doc_dates::{cache, config, output, recent, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; called exactly once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "doc-dates")]
#[command(about = "Creation dates, update dates, and authors for documentation pages")]
#[command(long_about = "\
Creation dates, update dates, and authors for documentation pages

Every markdown document under the docs directory gets a created date, a
modified date, and an author list, each taken from the first source that
has one:

  Created:   front-matter → dates cache → git first commit → file birth time
  Modified:  front-matter → file last-write time
  Authors:   front-matter → dates cache → git committers → site author

Front-matter fields (aliases configurable):

  ---
  created: 2023-04-01
  modified: 2024-01-10
  author:
    name: Ana
    email: ana@example.org
  ---

The dates cache (.dates_cache.jsonl in the docs directory) holds one JSON
record per line so it diffs cleanly when committed.

Run 'doc-dates gen-config' to generate a documented doc-dates.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory (holds doc-dates.toml)
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Docs directory, relative to the project directory
    #[arg(long, default_value = "docs", global = true)]
    docs_dir: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan git history and show first-commit dates and authors
    Scan,
    /// Resolve dates and authors for every document
    Resolve {
        /// Also write the resolved documents as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Write the docs tree with date info inserted into each page
    Annotate {
        /// Destination directory (must be outside the docs directory)
        #[arg(long)]
        output: PathBuf,
    },
    /// Write the merged dates cache file
    Cache {
        /// Stage the cache file with git add
        #[arg(long)]
        git_add: bool,
    },
    /// List recently updated documents
    Recent {
        /// Maximum number of entries
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print a stock doc-dates.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project = cli.project.as_path();
    let docs_dir = || resolve_docs_dir(project, &cli.docs_dir);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Scan => {
            let docs_dir = docs_dir()?;
            let log = history::scan_history(&Git::new(&docs_dir))?;
            output::print_scan_output(&log.first_commits());
        }
        Command::Resolve { json } => {
            let dates_config = config::load_config(project)?;
            let docs_dir = docs_dir()?;
            let index = scan::scan(&docs_dir)?;
            let ctx = BuildContext::load(&docs_dir, dates_config);
            let resolved = annotate::resolve_documents(&index, &ctx);
            if let Some(path) = json {
                write_json(&path, &resolved)?;
            }
            output::print_resolve_output(&resolved);
        }
        Command::Annotate { output: out_dir } => {
            let dates_config = config::load_config(project)?;
            let docs_dir = docs_dir()?;
            let index = scan::scan(&docs_dir)?;
            let ctx = BuildContext::load(&docs_dir, dates_config);
            let resolved = annotate::resolve_documents(&index, &ctx);
            let out_dir = std::path::absolute(&out_dir)?;
            let annotated =
                annotate::write_annotated(&index, &resolved, &ctx, &docs_dir, &out_dir)?;
            output::print_annotate_output(&out_dir, annotated, resolved.len());
        }
        Command::Cache { git_add } => {
            let dates_config = config::load_config(project)?;
            let docs_dir = docs_dir()?;
            let ctx = BuildContext::load(&docs_dir, dates_config);
            let merged = ctx.merged_cache();
            let git = Git::new(&docs_dir);
            let tracked = git.tracked_documents().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Could not list tracked documents; using sorted order");
                Vec::new()
            });
            let path = cache::cache_path(&docs_dir);
            let written = cache::write_cache(&path, &merged, &cache::write_order(&tracked, &merged))?;
            if git_add {
                cache::stage_cache_file(&git, &path)?;
            }
            output::print_cache_output(&path, written, git_add);
        }
        Command::Recent { limit } => {
            let dates_config = config::load_config(project)?;
            let docs_dir = docs_dir()?;
            let index = scan::scan(&docs_dir)?;
            let ctx = BuildContext::load(&docs_dir, dates_config);
            let entries = recent::recently_updated(ctx.latest_changes(), &index, limit);
            output::print_recent_output(&entries);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Absolute docs directory. Git runs inside it, so every path handed to
/// git must not depend on the caller's working directory.
fn resolve_docs_dir(project: &Path, docs_dir: &Path) -> std::io::Result<PathBuf> {
    project.join(docs_dir).canonicalize()
}

fn write_json(path: &Path, resolved: &[ResolvedDocument]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(resolved)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "Wrote resolved documents");
    Ok(())
}
