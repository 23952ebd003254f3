use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_rag::commands::{ask_question, build_corpus, require_directory, serve, verify_snapshot};
use docs_rag::config::{Config, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "docs-rag")]
#[command(about = "Ask questions about a folder of documents using retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml, the data directory and the snapshot
    /// (defaults to $DOCS_RAG_HOME or ~/.docs-rag)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure embedding, chunking and generation settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Extract, chunk and embed every document, replacing the snapshot
    Build {
        /// Directory of documents to index
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Window length in characters
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Characters shared between consecutive windows
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Check that the snapshot loads and its parts agree
    Verify,
    /// Answer a single question
    Ask {
        question: String,
        /// Number of fragments to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Start the HTTP query service
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => Config::default_base_dir()?,
    };

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&Config::load(&base_dir)?);
            } else {
                run_interactive_config(&base_dir)?;
            }
        }
        Commands::Build {
            data_dir,
            chunk_size,
            overlap,
        } => {
            let mut config = Config::load(&base_dir)?;
            if let Some(dir) = data_dir {
                require_directory(&dir)?;
                config.paths.data_dir = Some(
                    dir.canonicalize()
                        .with_context(|| format!("Failed to resolve {}", dir.display()))?,
                );
            }
            if let Some(chunk_size) = chunk_size {
                config.chunking.chunk_size = chunk_size;
            }
            if let Some(overlap) = overlap {
                config.chunking.overlap = overlap;
            }
            build_corpus(&config)?;
        }
        Commands::Verify => {
            verify_snapshot(&Config::load(&base_dir)?)?;
        }
        Commands::Ask { question, top_k } => {
            ask_question(&Config::load(&base_dir)?, &question, top_k)?;
        }
        Commands::Serve { host, port } => {
            let config = Config::load(&base_dir)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(&config, &host, port)?;
        }
    }

    Ok(())
}
