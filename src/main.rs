use anyhow::{Context, Result};
use bsbi::index::{CodecKind, IndexBuilder, IndexReader, stats};
use bsbi::utils::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bsbi")]
#[command(about = "Blocked sort-based inverted index builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from <input_dir>/<block>/<file>
    Build {
        /// Posting codec: Basic, VariableByte or Gamma
        codec: CodecKind,

        /// Collection root, one subdirectory per block
        input_dir: PathBuf,

        /// Where the index files are written
        output_dir: PathBuf,

        /// Config file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tokenize documents in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Do not draw progress bars
        #[arg(long)]
        no_progress: bool,
    },
    /// Print the documents containing every term
    Query {
        /// Index directory
        index_dir: PathBuf,

        /// Terms to intersect
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Show index statistics
    Stats {
        /// Index directory
        index_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            codec,
            input_dir,
            output_dir,
            config,
            parallel,
            no_progress,
        } => {
            let mut app_config = AppConfig::load(config.as_deref())?;
            if parallel {
                app_config.parallel_tokenize = true;
            }
            if no_progress {
                app_config.show_progress = false;
            }

            let start = Instant::now();
            let summary = IndexBuilder::new(app_config.index_config(codec))
                .build(&input_dir, &output_dir)
                .with_context(|| format!("Failed to index {}", input_dir.display()))?;

            println!();
            println!("Index built successfully!");
            println!("  Blocks:    {}", summary.block_count);
            println!("  Documents: {}", summary.doc_count);
            println!("  Terms:     {}", summary.term_count);
            println!("  Merges:    {}", summary.merges);
            println!("  Size:      {} bytes", summary.index_bytes);
            println!("  Time:      {:.2}s", start.elapsed().as_secs_f64());
            println!("  Index:     {}", summary.index_path.display());
        }
        Commands::Query { index_dir, terms } => {
            let reader = IndexReader::open(&index_dir)
                .with_context(|| format!("Failed to open index {}", index_dir.display()))?;
            let docs = reader.query_and(&terms)?;
            if docs.is_empty() {
                println!("no results found");
            }
            for doc_id in docs {
                match reader.doc_path(doc_id) {
                    Some(path) => println!("{}", path),
                    None => println!("<unknown doc {}>", doc_id),
                }
            }
        }
        Commands::Stats { index_dir } => {
            stats::show_stats(&index_dir)?;
        }
    }

    Ok(())
}
