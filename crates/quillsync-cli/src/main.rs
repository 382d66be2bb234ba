use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use quillsync_client::{Config, FileStore, HttpDocumentStore};
use quillsync_core::{DocumentId, QUIESCENCE_WINDOW_MS, SyncSession};

#[derive(Parser)]
#[command(version, about = "Quillsync - push document edits to a backend as debounced patches", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config file (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a backend document from a file and print its id
    Create {
        /// File holding the serialized document
        file: PathBuf,
    },
    /// Fetch a document into a file
    Load {
        /// Document id assigned by the backend
        id: String,

        /// Destination file
        file: PathBuf,
    },
    /// Watch a file and push its edits as debounced patches
    Watch {
        /// File to watch
        file: PathBuf,

        /// Sync into an existing document instead of creating one
        #[arg(long)]
        id: Option<String>,

        /// Quiescence window in milliseconds
        #[arg(long, default_value_t = QUIESCENCE_WINDOW_MS)]
        window_ms: u64,

        /// How often to re-read the file, in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = document_store(cli.config.as_deref(), cli.base_url).await?;

    match cli.command {
        Commands::Create { file } => create(store, &file).await,
        Commands::Load { id, file } => load(store, id, &file).await,
        Commands::Watch {
            file,
            id,
            window_ms,
            poll_ms,
        } => watch(store, file, id, window_ms, poll_ms).await,
    }
}

async fn document_store(
    config_path: Option<&Path>,
    base_url: Option<String>,
) -> Result<HttpDocumentStore> {
    let config = match config_path {
        Some(path) => Config::load(&FileStore::new(path)).await?,
        None => Config::default(),
    };
    Ok(HttpDocumentStore::new(
        base_url.unwrap_or(config.base_url),
    ))
}

async fn create(store: HttpDocumentStore, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file).into_diagnostic()?;
    let mut session = SyncSession::new(store);
    let id = session.create(&content).await.into_diagnostic()?;
    println!("{id}");
    Ok(())
}

async fn load(store: HttpDocumentStore, id: String, file: &Path) -> Result<()> {
    let mut session = SyncSession::new(store);
    let content = session
        .load(DocumentId::new(&id))
        .await
        .into_diagnostic()?;
    std::fs::write(file, &content).into_diagnostic()?;
    println!("loaded document {id} into {}", file.display());
    Ok(())
}

/// Create or load the document, then poll the file and feed changed contents
/// into the session until interrupted. The file plays the editor shell's
/// role: every changed read is an update notification.
async fn watch(
    store: HttpDocumentStore,
    file: PathBuf,
    id: Option<String>,
    window_ms: u64,
    poll_ms: u64,
) -> Result<()> {
    let mut session = SyncSession::new(store).with_window(Duration::from_millis(window_ms));

    let (document_id, content) = match id {
        Some(raw) => {
            let id = DocumentId::new(&raw);
            let remote = session.load(id.clone()).await.into_diagnostic()?;
            std::fs::write(&file, &remote).into_diagnostic()?;
            (id, remote)
        }
        None => {
            let local = std::fs::read_to_string(&file).into_diagnostic()?;
            let id = session.create(&local).await.into_diagnostic()?;
            (id, local)
        }
    };
    println!("watching {} as document {document_id}", file.display());

    let (tx, rx) = mpsc::channel(16);
    let poll_path = file.clone();
    let poller = tokio::spawn(async move {
        let mut last = content;
        let mut ticker = tokio::time::interval(Duration::from_millis(poll_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Ok(current) = tokio::fs::read_to_string(&poll_path).await else {
                continue;
            };
            if current != last {
                last = current.clone();
                if tx.send(current).await.is_err() {
                    break;
                }
            }
        }
    });

    tokio::select! {
        () = session.run(rx) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, stopping"),
    }
    poller.abort();
    Ok(())
}
