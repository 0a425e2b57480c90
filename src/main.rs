use clap::{Parser, Subcommand};
use journal_archive::{OperationState, OperationTracker};
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod database;
mod error;
mod filesystem;
mod services;

use config::AppConfig;
use services::{export_journal, import_journal, ImportMode};

#[derive(Debug, Parser)]
#[command(name = "photojournal", about = "Photo journal backup tool", version)]
struct Cli {
    /// Configuration file (defaults to photojournal.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the result as JSON instead of a sentence
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write every entry and its photo into a zip archive.
    Export {
        /// Directory for the archive instead of the configured export directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Read entries and photos from an archive created by `export`.
    Import {
        /// Path to the zip archive
        archive: PathBuf,
        /// Delete all existing entries before importing
        #[arg(long)]
        overwrite: bool,
    },
}

fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag("photojournal"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
}

/// Logs every state change of `tracker` until the operation has finished
fn watch_operation<T>(tracker: &OperationTracker<T>) -> tokio::task::JoinHandle<()>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    let mut rx = tracker.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match &state {
                OperationState::InProgress => log::info!("Working..."),
                OperationState::Success(details) => log::debug!("Finished: {:?}", details),
                OperationState::Error(e) => log::debug!("Failed: {}", e),
                OperationState::Idle => {}
            }
            if state.is_finished() {
                break;
            }
        }
    })
}

fn print_result<R: Serialize>(as_json: bool, result: &R, sentence: String) {
    if as_json {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize result: {}", e),
        }
    } else {
        println!("{}", sentence);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Export { out_dir } => {
            if let Some(dir) = out_dir {
                config.export_dir = dir;
            }

            let tracker: OperationTracker<PathBuf> = OperationTracker::new("export");
            let watcher = watch_operation(&tracker);
            tracker.begin();
            let result = export_journal(&config).await;
            tracker.finish(result.outcome());
            let _ = watcher.await;

            let sentence = match tracker.current() {
                OperationState::Success(path) => format!("Exported to {}", path.display()),
                OperationState::Error(e) => e,
                _ => String::new(),
            };
            print_result(cli.json, &result, sentence);
            tracker.acknowledge();

            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Import { archive, overwrite } => {
            let mode = if overwrite {
                ImportMode::Overwrite
            } else {
                ImportMode::Add
            };

            let tracker: OperationTracker<(usize, usize)> = OperationTracker::new("import");
            let watcher = watch_operation(&tracker);
            tracker.begin();
            let result = import_journal(&config, &archive, mode).await;
            tracker.finish(result.outcome());
            let _ = watcher.await;

            let sentence = match tracker.current() {
                OperationState::Success((entries, photos)) => {
                    format!("Imported {} entries and {} photos", entries, photos)
                }
                OperationState::Error(e) => e,
                _ => String::new(),
            };
            print_result(cli.json, &result, sentence);
            tracker.acknowledge();

            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
