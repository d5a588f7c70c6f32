use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cvrag_protocol::{CommandResponse, EmbeddingMode, GenerationMode, RagConfig};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod app;
mod render;

use app::App;

#[derive(Parser)]
#[command(name = "cv-rag")]
#[command(about = "Ask grounded questions about your CV", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./cv-rag.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<ModeArg>,

    /// Override generation backend in this process
    #[arg(long, global = true, value_enum)]
    gen_mode: Option<ModeArg>,

    /// Root directory holding vector collections
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Collection name inside the index directory
    #[arg(long, global = true)]
    collection: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk, embed and index every CV in the data directory
    Index(IndexArgs),

    /// Answer a question from the indexed CVs
    Ask(AskArgs),

    /// Load and chunk the data directory without embedding (dry run)
    Chunks(ChunksArgs),

    /// Show collection statistics
    Stats(StatsArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Ollama,
    Stub,
}

#[derive(Args)]
struct IndexArgs {
    /// Directory of .txt/.pdf CV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print a JSON response instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    /// The question to answer
    question: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Print a JSON response instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChunksArgs {
    /// Directory of .txt/.pdf CV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print a JSON response instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Print a JSON response instead of text
    #[arg(long)]
    json: bool,
}

impl Commands {
    const fn json(&self) -> bool {
        match self {
            Self::Index(args) => args.json,
            Self::Ask(args) => args.json,
            Self::Chunks(args) => args.json,
            Self::Stats(args) => args.json,
        }
    }
}

/// Rendered result of a command in both output styles
struct Output {
    text: String,
    data: serde_json::Value,
}

impl Output {
    fn new<T: Serialize>(text: String, data: &T) -> Result<Self> {
        Ok(Self {
            text,
            data: serde_json::to_value(data)?,
        })
    }
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // HTTP and PDF internals are noisy below warn
    if !cli.verbose {
        for module in ["reqwest", "hyper", "hyper_util", "lopdf"] {
            builder.filter_module(module, log::LevelFilter::Warn);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn resolve_config(cli: &Cli) -> Result<RagConfig> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let mut config =
        RagConfig::load(cli.config.as_deref(), &cwd).context("Invalid configuration")?;

    if let Some(mode) = cli.embed_mode {
        config.embedding_mode = match mode {
            ModeArg::Ollama => EmbeddingMode::Ollama,
            ModeArg::Stub => EmbeddingMode::Stub,
        };
    }
    if let Some(mode) = cli.gen_mode {
        config.generation_mode = match mode {
            ModeArg::Ollama => GenerationMode::Ollama,
            ModeArg::Stub => GenerationMode::Stub,
        };
    }
    if let Some(dir) = &cli.index_dir {
        config.index_dir.clone_from(dir);
    }
    if let Some(collection) = &cli.collection {
        config.collection.clone_from(collection);
    }
    match &cli.command {
        Commands::Index(IndexArgs {
            data_dir: Some(dir),
            ..
        })
        | Commands::Chunks(ChunksArgs {
            data_dir: Some(dir),
            ..
        }) => config.data_dir.clone_from(dir),
        _ => {}
    }
    Ok(config)
}

async fn run(cli: &Cli) -> Result<Output> {
    let app = App::new(resolve_config(cli)?)?;
    log::debug!("Effective configuration: {:?}", app.config());

    match &cli.command {
        Commands::Index(_) => {
            let ingestor = app.ingestor().await?;
            let report = ingestor
                .ingest_dir(&app.config().data_dir)
                .await
                .context("Ingestion failed")?;
            Output::new(render::ingest_report(&report), &report)
        }
        Commands::Ask(args) => {
            let top_k = args.top_k.unwrap_or(app.config().top_k);
            let answer = app
                .answerer()
                .await?
                .answer(&args.question, top_k)
                .await
                .context("Failed to answer question")?;
            Output::new(render::answer(&answer), &answer)
        }
        Commands::Chunks(_) => {
            let preview = cvrag_indexer::preview_dir(&app.config().data_dir, &app.chunker()?)
                .await
                .context("Failed to load documents")?;
            Ok(Output {
                text: render::chunk_preview(&preview),
                data: render::chunk_preview_json(&preview),
            })
        }
        Commands::Stats(_) => {
            let stats = app.open_reader().await?.stats().await;
            Output::new(render::collection_stats(&stats), &stats)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);
    let json = cli.command.json();

    match run(&cli).await {
        Ok(output) if json => {
            let response = CommandResponse::ok(&output.data)?;
            print_stdout(&serde_json::to_string_pretty(&response)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(output) => {
            print_stdout(&output.text)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if json => {
            log::error!("{err:#}");
            let response = CommandResponse::error(render::error_envelope(&err));
            print_stdout(&serde_json::to_string_pretty(&response)?)?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err),
    }
}
