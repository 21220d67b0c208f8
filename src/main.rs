use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use murasaki::analyze::{EsAnalyzeClient, Language};
use murasaki::cluster::{SearchConfig, SelectionMethod, TieBreak};
use murasaki::config::Config;
use murasaki::output::terminal;
use murasaki::topics::terms::TermTable;
use murasaki::topics::weights::{self, Document, TermLookup};

/// Murasaki: topic discovery for classical-text corpora.
///
/// Filters a significant-term table, clusters term embeddings into topics,
/// and projects documents onto the resulting topic space.
#[derive(Parser)]
#[command(name = "murasaki", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a significant-term table into topics and display the result
    Topics {
        /// Path to the term table JSON (rows of word/score/vector)
        #[arg(long)]
        terms: PathBuf,

        /// Score percentile gating terms into clustering (default: config)
        #[arg(long)]
        percentile: Option<f64>,

        /// Cluster extraction strategy: leaf or eom
        #[arg(long, default_value = "leaf")]
        method: String,

        /// Tie resolution among equally-good parameter candidates: larger or smaller
        #[arg(long, default_value = "larger")]
        tie_break: String,

        /// Rows of the displayed topic grid
        #[arg(long, default_value = "10")]
        rows: usize,

        /// Columns (topics) of the displayed topic grid
        #[arg(long, default_value = "12")]
        cols: usize,

        /// Write the enriched table as JSON to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Project documents onto the topic space of an enriched term table
    DocTopics {
        /// Path to an enriched term table JSON (as written by `topics --out`)
        #[arg(long)]
        terms: PathBuf,

        /// Path to the documents JSON (rows of id/text)
        #[arg(long)]
        docs: PathBuf,

        /// Write the per-document weight vectors as JSON to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Tokenize text through the analysis backend
    Tokenize {
        /// The text to analyze
        text: String,

        /// Language code (en, zh, ko, es, fr; default: config)
        #[arg(long)]
        lang: Option<String>,

        /// Send the text as-is, without punctuation stripping
        #[arg(long)]
        keep_punctuation: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("murasaki=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Topics {
            terms,
            percentile,
            method,
            tie_break,
            rows,
            cols,
            out,
        } => {
            let config = Config::load()?;
            let table = read_terms(&terms)?;
            let percentile = percentile.unwrap_or(config.percentile);

            let search = SearchConfig {
                selection_method: parse_method(&method)?,
                tie_break: parse_tie_break(&tie_break)?,
                progress: true,
                ..SearchConfig::default()
            };

            println!(
                "Clustering {} terms (score percentile {percentile})...",
                table.len()
            );
            let (enriched, solution) = table.filter_and_enrich(percentile, &search)?;
            info!(
                terms = enriched.len(),
                label_max = solution.label_max,
                min_cluster_size = solution.min_cluster_size,
                min_samples = solution.min_samples,
                "enrichment complete"
            );

            terminal::display_topics(&enriched, rows, cols);

            if let Some(path) = out {
                write_json(&path, &enriched)?;
                println!("Enriched table written to {}", path.display());
            }
        }

        Commands::DocTopics { terms, docs, out } => {
            let table = read_terms(&terms)?;
            let documents: Vec<Document> = read_json(&docs)?;

            let significant: HashSet<String> =
                table.rows.iter().map(|r| r.word.clone()).collect();
            let lookup = TermLookup::from_table(&table);

            let vectors = weights::document_topics(&lookup, &documents, &significant);
            println!(
                "Mapped {} documents onto {} topics.",
                vectors.len(),
                (lookup.topic_max() + 1).max(0)
            );

            match out {
                Some(path) => {
                    write_json(&path, &vectors)?;
                    println!("Weight vectors written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&vectors)?),
            }
        }

        Commands::Tokenize {
            text,
            lang,
            keep_punctuation,
        } => {
            let config = Config::load()?;
            config.require_analyze()?;

            let lang = match lang {
                Some(code) => Language::from_code(&code).ok_or_else(|| {
                    anyhow::anyhow!("unknown language {code:?} (expected en, zh, ko, es, fr)")
                })?,
                None => config.language,
            };

            let prepared = if keep_punctuation {
                text
            } else {
                config.punctuation.strip(&text, lang)
            };

            let client = EsAnalyzeClient::new(&config.analyze_url)?;
            let tokens = client
                .analyze(&prepared, lang)
                .await
                .with_context(|| format!("tokenizing via {}", config.analyze_url))?;

            println!("{}", tokens.join(" "));
        }
    }

    Ok(())
}

fn parse_method(method: &str) -> Result<SelectionMethod> {
    match method {
        "leaf" => Ok(SelectionMethod::Leaf),
        "eom" | "excess-of-mass" => Ok(SelectionMethod::ExcessOfMass),
        other => anyhow::bail!("unknown selection method {other:?} (expected leaf or eom)"),
    }
}

fn parse_tie_break(tie_break: &str) -> Result<TieBreak> {
    match tie_break {
        "larger" => Ok(TieBreak::PreferLarger),
        "smaller" => Ok(TieBreak::PreferSmaller),
        other => anyhow::bail!("unknown tie break {other:?} (expected larger or smaller)"),
    }
}

fn read_terms(path: &PathBuf) -> Result<TermTable> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}
