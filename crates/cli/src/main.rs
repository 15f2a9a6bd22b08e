use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_db::{MemoryStore, Seed};
use libris_kernel::settings::Settings;

/// Library catalog server and maintenance tools
#[derive(Debug, Parser)]
#[command(name = "libris", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print the resolved configuration as JSON
    Config,
    /// Validate a seed file and report what it contains
    CheckSeed {
        /// Path to the JSON seed file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let settings = load_settings()?;
            libris_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "libris serve starting");
            libris_app::run(settings).await
        }
        Command::Config => {
            let settings = load_settings()?;
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::CheckSeed { path } => {
            let seed = Seed::from_file(&path)
                .await
                .with_context(|| format!("failed to load seed file {}", path.display()))?;
            let books = seed.books.len();
            let recommendations = seed.recommendations.len();
            MemoryStore::from_seed(seed).context("seed file is inconsistent")?;
            println!("{books} books, {recommendations} recommendations");
            Ok(())
        }
    }
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().with_context(|| "failed to load Libris settings")
}
