//! # docsift CLI (`sift`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sift search "<query>" --dir <path>` | One-shot query over a directory of PDFs |
//! | `sift ls <session>` | List a session's stored files |
//! | `sift serve` | Start the HTTP chat API |
//!
//! ## Examples
//!
//! ```bash
//! # Query a folder of protocols, page-level attribution
//! sift search "morphine dose" --dir ./protocols --mode page
//!
//! # Same corpus through tf-idf weighting
//! sift search "morphine dose" --dir ./protocols --strategy tfidf --top-k 5
//!
//! # Serve the chat API on the configured bind address
//! sift serve --config ./config/sift.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docsift::config::{self, Config};
use docsift::models::{ScoringStrategy, SearchOutcome, UnitMode};
use docsift::search::run_query;
use docsift::server;
use docsift::store::{scan_directory, SessionStore};

/// docsift — session-scoped lexical retrieval over uploaded documents.
#[derive(Parser)]
#[command(
    name = "sift",
    about = "docsift — session-scoped lexical retrieval over uploaded documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/sift.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Query a directory of PDFs and print ranked snippets.
    ///
    /// Builds an ad-hoc corpus from the matched files on every run —
    /// there is no index to initialize or invalidate.
    Search {
        /// The question to search for.
        query: String,

        /// Directory to scan for documents.
        #[arg(long)]
        dir: PathBuf,

        /// Glob for files to include, relative to --dir.
        #[arg(long, default_value = "**/*.pdf")]
        glob: String,

        /// Unit granularity: `page` or `chunk`. Defaults to config.
        #[arg(long)]
        mode: Option<String>,

        /// Scoring strategy: `overlap`, `occurrence`, or `tfidf`.
        /// Defaults to config.
        #[arg(long)]
        strategy: Option<String>,

        /// Maximum number of results. Defaults to config.
        #[arg(long)]
        top_k: Option<i64>,
    },

    /// List files stored for a session.
    Ls {
        /// Session id.
        session: String,
    },

    /// Start the HTTP chat API.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Search {
            query,
            dir,
            glob,
            mode,
            strategy,
            top_k,
        } => {
            run_cli_search(&cfg, &query, &dir, &glob, mode, strategy, top_k)?;
        }
        Commands::Ls { session } => {
            let store = SessionStore::new(cfg.store.upload_root.clone());
            let files = store.list_files(&session)?;
            if files.is_empty() {
                println!("No files stored for session {}.", session);
            } else {
                for f in files {
                    println!("{}  {}", f.modified_at.format("%Y-%m-%dT%H:%M:%SZ"), f.name);
                }
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

fn run_cli_search(
    cfg: &Config,
    query: &str,
    dir: &std::path::Path,
    glob: &str,
    mode: Option<String>,
    strategy: Option<String>,
    top_k: Option<i64>,
) -> anyhow::Result<()> {
    let mut params = cfg.retrieval_params();

    if let Some(mode) = mode {
        params.unit_mode = match mode.as_str() {
            "page" => UnitMode::Page,
            "chunk" => UnitMode::Chunk,
            other => anyhow::bail!("Unknown unit mode: {}. Use page or chunk.", other),
        };
    }
    if let Some(strategy) = strategy {
        params.strategy = match strategy.as_str() {
            "overlap" => ScoringStrategy::Overlap,
            "occurrence" => ScoringStrategy::Occurrence,
            "tfidf" => ScoringStrategy::TfIdf,
            other => anyhow::bail!(
                "Unknown scoring strategy: {}. Use overlap, occurrence, or tfidf.",
                other
            ),
        };
    }

    let snapshot = scan_directory(dir, &[glob.to_string()])?;
    let k = top_k.unwrap_or(cfg.retrieval.top_k);

    match run_query(&snapshot, query, k, &params) {
        SearchOutcome::Matches(hits) => {
            for (i, hit) in hits.iter().enumerate() {
                match hit.page_number {
                    Some(page) => println!(
                        "{}. {} (p.{})  score={:.3}",
                        i + 1,
                        hit.document_name,
                        page,
                        hit.score
                    ),
                    None => println!("{}. {}  score={:.3}", i + 1, hit.document_name, hit.score),
                }
                println!("   {}", hit.snippet);
            }
        }
        SearchOutcome::NoMatches => println!("No results."),
        SearchOutcome::EmptyQuery => println!("No results (query has no searchable terms)."),
        SearchOutcome::EmptyCorpus => println!("No results (no searchable documents found)."),
    }

    Ok(())
}
