use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use texdb_core::config::{resolve_with_base, Config};
use texdb_embed::get_default_embedder;
use texdb_latex::{build_dataset, CoursePaths, DocumentLayout, Normalizer};
use texdb_vector::load_index;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "texdb", about = "Course notes dataset builder and retriever")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the `(title, text)` CSV from a LaTeX course tree.
    Dataset {
        /// Course root holding `main.tex` and `section/`.
        #[arg(long)]
        root: Option<PathBuf>,
        /// Output CSV path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Index the dataset and print the chunks retrieved for a query.
    Query {
        query: String,
        /// Dataset CSV to index.
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Embedding model identifier.
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the normalized text of one LaTeX file.
    Normalize { file: PathBuf },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load().context("Error loading config")?;
    let dataset = config.dataset()?;

    match cli.command {
        Command::Dataset { root, output } => {
            let root = root.unwrap_or_else(|| resolve_with_base(config.base_dir(), &dataset.root));
            let output = output.unwrap_or_else(|| resolve_with_base(config.base_dir(), &dataset.output));
            println!("📚 Building dataset from {}", root.display());
            let paths = CoursePaths::from_settings(&root, &dataset);
            let table = build_dataset(&paths, &DocumentLayout::default(), &Normalizer::new())?;
            table.write_csv(&output)?;
            println!("✅ Wrote {} records to {}", table.len(), output.display());
        }
        Command::Query { query, dataset: csv, model } => {
            let csv = csv.unwrap_or_else(|| resolve_with_base(config.base_dir(), &dataset.output));
            let mut embedding = config.embedding()?;
            if let Some(model) = model {
                embedding.model = model;
            }
            let index = config.index()?;
            let embedder = get_default_embedder(&embedding, config.base_dir())?;
            let retriever = load_index(&csv, embedder.as_ref(), &index)?;
            info!(entries = retriever.store().len(), "index built");

            let results = retriever.retrieve(&query)?;
            println!("\n🔍 {} results for: \"{}\"", results.len(), query);
            for (i, result) in results.iter().enumerate() {
                println!("\n  {}. score={:.4}  row={}  kind={:?}  title={}", i + 1, result.score, result.row, result.kind, result.title);
                println!("     📝 {}", result.text);
            }
        }
        Command::Normalize { file } => {
            let content = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", Normalizer::new().normalize(&content));
        }
    }
    Ok(())
}
