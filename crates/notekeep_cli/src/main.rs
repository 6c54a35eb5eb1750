//! notekeep command-line front end.
//!
//! # Responsibility
//! - Capture title/body input and hand it to the core store.
//! - Render stored notes newest-first, with an empty-state line.
//! - Wire delete-by-id from user input.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use log::info;
use notekeep_core::config::default_data_dir;
use notekeep_core::{default_log_level, init_logging, NoteId, NoteService, NotekeepConfig};
use std::path::PathBuf;

mod output;

/// Level used when logs would share stderr with command output.
const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "notekeep")]
#[command(about = "Local note store")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the database file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep the store in memory; nothing is persisted
    #[arg(long, global = true, conflicts_with = "data_dir")]
    in_memory: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new note
    Add {
        title: String,
        #[arg(default_value = "")]
        body: String,
    },
    /// List notes, newest first
    List {
        /// Output as JSON (ascending by id)
        #[arg(long)]
        json: bool,
    },
    /// Delete a note by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    let service = NoteService::open(config.store.clone())
        .await
        .context("failed to open note store")?;
    info!(
        "event=cli_start module=cli status=ok name={} schema_version={}",
        service.name(),
        service.schema_version()
    );

    let result = run(&service, cli.command).await;
    service.close().await;
    result
}

fn resolve_config(cli: &Cli) -> Result<NotekeepConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => NotekeepConfig::load_from_path(path)?,
        None => NotekeepConfig::default(),
    };

    if cli.in_memory {
        config.store.directory = None;
    } else if let Some(dir) = cli.data_dir.clone() {
        config.store.directory = Some(dir);
    } else if config.store.directory.is_none() {
        config.store.directory = Some(
            default_data_dir().context("no data directory; pass --data-dir or --in-memory")?,
        );
    }

    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    } else if config.logging.directory.is_none() && config.logging.level == default_log_level() {
        config.logging.level = STDERR_LOG_LEVEL.to_string();
    }
    Ok(config)
}

async fn run(service: &NoteService, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title, body } => {
            let request = service.add(title, body);
            if let Some(id) = request.inserted.await {
                println!("Added note {id}");
            }
            request.completed.await.context("failed to add note")?;
        }
        Commands::List { json } => {
            let mut stream = service.iterate();
            let mut notes = Vec::new();
            while let Some(step) = stream.next().await {
                notes.push(step.context("failed to read notes")?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if stream.is_empty_scan() {
                println!("{}", output::EMPTY_SENTINEL);
            } else {
                for line in output::render_newest_first(&notes) {
                    println!("{line}");
                }
            }
        }
        Commands::Delete { id } => {
            let id: NoteId = id.parse()?;
            let removed = service
                .delete(id)
                .await
                .context("failed to delete note")?;
            if removed {
                println!("Deleted note {id}");
            } else {
                println!("No note with id {id}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli, STDERR_LOG_LEVEL};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn stderr_logging_defaults_to_warn() {
        let cli = Cli::try_parse_from(["notekeep", "--in-memory", "list"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.logging.level, STDERR_LOG_LEVEL);
        assert_eq!(config.logging.directory, None);
        assert_eq!(config.store.directory, None);
    }

    #[test]
    fn explicit_log_level_and_data_dir_are_kept() {
        let cli = Cli::try_parse_from([
            "notekeep",
            "--data-dir",
            "/tmp/notekeep-data",
            "--log-level",
            "debug",
            "add",
            "title",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.store.directory,
            Some(PathBuf::from("/tmp/notekeep-data"))
        );
    }
}
