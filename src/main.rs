//! Deposit OCR - unattended document ingestion with OCR extraction.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deposit_ocr::config::{AppConfig, ConfigLoader, WatchConfig};
use deposit_ocr::history::{default_history_path, HistoryStore};
use deposit_ocr::ocr::OcrClient;
use deposit_ocr::watcher::DepositWatcher;

#[derive(Parser)]
#[command(
    name = "deposit-ocr",
    about = "Unattended document ingestion with OCR extraction",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file path (overrides the default search locations).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a deposit directory until interrupted.
    Run {
        /// Directory to watch for incoming documents.
        #[arg(long)]
        deposit: Option<PathBuf>,
        /// Directory receiving extracted text.
        #[arg(long)]
        export: Option<PathBuf>,
        /// Directory receiving relocated originals.
        #[arg(long)]
        trash: Option<PathBuf>,
        /// Move originals to the platform trash instead of a trash directory.
        #[arg(long)]
        system_trash: bool,
    },
    /// Inspect the persisted processing history.
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recorded entries, newest first.
    List {
        /// Only show the most recent N entries.
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Delete every recorded entry.
    Wipe,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Run {
            deposit,
            export,
            trash,
            system_trash,
        } => run(config, deposit, export, trash, system_trash).await,
        Commands::History { command } => history(config, command).await,
    };
    std::process::exit(code);
}

async fn open_history(config: &AppConfig) -> Option<HistoryStore> {
    let path = config
        .history_path
        .clone()
        .unwrap_or_else(default_history_path);
    match HistoryStore::open(&path).await {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!(error = %e, "Failed to open history store");
            None
        }
    }
}

async fn run(
    config: AppConfig,
    deposit: Option<PathBuf>,
    export: Option<PathBuf>,
    trash: Option<PathBuf>,
    system_trash: bool,
) -> i32 {
    // CLI flags override the config file.
    let mut watch = match (deposit, config.watch.clone()) {
        (Some(root), _) => WatchConfig::new(root),
        (None, Some(watch)) => watch,
        (None, None) => {
            tracing::error!(
                "No deposit directory configured; pass --deposit or set [watch] in the config file"
            );
            return 1;
        }
    };
    if export.is_some() {
        watch.export_root = export;
    }
    if trash.is_some() {
        watch.trash_root = trash;
    }
    if system_trash {
        watch.use_system_trash = true;
    }

    let extractor = match OcrClient::from_config(&config.ocr) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "OCR client unavailable");
            return 1;
        }
    };

    let Some(history) = open_history(&config).await else {
        return 1;
    };

    let mut watcher = DepositWatcher::new(extractor, history);
    if let Err(e) = watcher.reconfigure(Some(watch)).await {
        tracing::error!(error = %e, "Invalid watch configuration");
        return 1;
    }

    tracing::info!("Watching deposit directory, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    let _ = watcher.reconfigure(None).await;
    0
}

async fn history(config: AppConfig, command: HistoryCommands) -> i32 {
    let Some(store) = open_history(&config).await else {
        return 1;
    };

    match command {
        HistoryCommands::List { limit } => {
            let entries = match limit {
                Some(n) => store.fetch_last(n).await,
                None => store.fetch_all().await,
            };
            if entries.is_empty() {
                println!("No history entries");
                return 0;
            }
            for entry in entries {
                println!(
                    "{}  {}  {:>3} page(s)  {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.id,
                    entry.page_count,
                    entry.display_title
                );
            }
            0
        }
        HistoryCommands::Wipe => match store.wipe_all().await {
            Ok(()) => {
                println!("History wiped");
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to wipe history");
                1
            }
        },
    }
}
