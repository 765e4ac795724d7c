//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{Config, Settings};
use crate::models::{AnalysisRecord, AnalysisStatus};
use crate::repository::{run_migrations, AnalysisRepository};
use crate::services::{AnalysisOrchestrator, WordCloudStage};
use crate::services::wordcloud::HttpWordCloudClient;
use crate::storage::{BlobStore, LocalBlobStore, LocalImageStore};

#[derive(Parser)]
#[command(name = "doca")]
#[command(about = "Document analysis pipeline: statistics, duplicates, word clouds")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Store a file into the blob store and print its assigned id
    Store {
        /// File to store
        path: PathBuf,
        /// Run analysis immediately after storing
        #[arg(short, long)]
        analyze: bool,
    },

    /// Analyze a stored file (idempotent for unchanged content)
    Analyze {
        /// File id returned by `store`
        file_id: String,
    },

    /// Show the analysis result for a file
    Status {
        /// File id returned by `store`
        file_id: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir.display().to_string());
    }
    let settings = Settings::from_config(&config);

    match cli.command {
        Commands::Init => cmd_init(&settings).await,
        Commands::Store { path, analyze } => cmd_store(&settings, &path, analyze).await,
        Commands::Analyze { file_id } => cmd_analyze(&settings, &file_id).await,
        Commands::Status { file_id } => cmd_status(&settings, &file_id).await,
    }
}

fn ensure_directories(settings: &Settings) -> std::io::Result<()> {
    std::fs::create_dir_all(&settings.data_dir)?;
    std::fs::create_dir_all(&settings.blobs_dir)?;
    std::fs::create_dir_all(&settings.images_dir)?;
    Ok(())
}

fn database_url(settings: &Settings) -> String {
    settings.database_path.to_string_lossy().to_string()
}

/// Build the full pipeline from settings. The word-cloud stage is present
/// only when a service URL is configured.
fn build_orchestrator(settings: &Settings) -> anyhow::Result<AnalysisOrchestrator> {
    let repo = AnalysisRepository::new(&settings.database_path);
    let blob_store = Arc::new(LocalBlobStore::new(&settings.blobs_dir));

    let word_cloud = match &settings.word_cloud_url {
        Some(url) => {
            let client = HttpWordCloudClient::new(url.clone(), settings.word_cloud_timeout)?;
            Some(WordCloudStage::new(
                Arc::new(client),
                LocalImageStore::new(&settings.images_dir),
                settings.render.clone(),
            ))
        }
        None => None,
    };

    Ok(AnalysisOrchestrator::new(
        repo,
        blob_store,
        word_cloud,
        settings.fetch_timeout,
    ))
}

async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    ensure_directories(settings)?;

    println!("{} Running migrations...", style("→").cyan());
    run_migrations(&database_url(settings)).await?;

    println!(
        "{} Initialized docanalyze in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    Ok(())
}

async fn cmd_store(settings: &Settings, path: &PathBuf, analyze: bool) -> anyhow::Result<()> {
    ensure_directories(settings)?;

    let content = std::fs::read(path)?;
    let store = LocalBlobStore::new(&settings.blobs_dir);
    let file_id = store.save(&content)?;
    let hash = AnalysisRecord::compute_hash(&content);

    println!("{} Stored {} bytes", style("✓").green(), content.len());
    println!("  file id: {}", style(&file_id).bold());
    println!("  sha256:  {hash}");

    if analyze {
        cmd_analyze(settings, &file_id).await?;
    }
    Ok(())
}

async fn cmd_analyze(settings: &Settings, file_id: &str) -> anyhow::Result<()> {
    run_migrations(&database_url(settings)).await?;

    // The fingerprint of the current content drives idempotency: unchanged
    // content short-circuits to the stored result.
    let store = LocalBlobStore::new(&settings.blobs_dir);
    let content = store.fetch(file_id).await?;
    let hash = AnalysisRecord::compute_hash(&content);

    let orchestrator = build_orchestrator(settings)?;
    let record = orchestrator.analyze(file_id, &hash).await?;

    print_record(&record);
    Ok(())
}

async fn cmd_status(settings: &Settings, file_id: &str) -> anyhow::Result<()> {
    let repo = AnalysisRepository::new(&settings.database_path);
    match repo.get(file_id).await? {
        Some(record) => print_record(&record),
        None => println!("{} No analysis found for {}", style("!").yellow(), file_id),
    }
    Ok(())
}

fn print_record(record: &AnalysisRecord) {
    let status = match record.status {
        AnalysisStatus::Completed => style(record.status.as_str()).green(),
        AnalysisStatus::Failed => style(record.status.as_str()).red(),
        _ => style(record.status.as_str()).yellow(),
    };
    println!("{} {}", style(&record.file_id).bold(), status);
    println!("  hash:       {}", record.file_hash);

    if record.status == AnalysisStatus::Completed {
        println!(
            "  statistics: {} words, {} chars, {} paragraphs",
            record.word_count, record.char_count, record.paragraph_count
        );
        match &record.duplicate_info {
            Some(info) if info.is_duplicate => println!(
                "  duplicate:  {} matches {}",
                style("yes").yellow(),
                info.matched_file_id.as_deref().unwrap_or("?")
            ),
            _ => println!("  duplicate:  no"),
        }
        match &record.word_cloud_image_path {
            Some(locator) => println!("  word cloud: {locator}"),
            None => println!("  word cloud: (not generated)"),
        }
    }
    if let Some(error) = &record.error_message {
        println!("  error:      {}", style(error).red());
    }
    if let Some(completed_at) = &record.completed_at {
        println!("  completed:  {}", completed_at.to_rfc3339());
    }
}
