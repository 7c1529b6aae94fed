//! kbsync - capture, sanitize, and replay Azure AI Search knowledge base
//! configuration
//!
//! The tool walks the configuration graph of a live search service
//! (knowledge bases down to synonym maps), stores it as JSON documents safe
//! to commit, and replays it onto another service with live credentials
//! injected.

use std::path::PathBuf;

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};

use kbsync::config;
use kbsync::export::Exporter;
use kbsync::restore;
use kbsync::sanitize;
use kbsync::search::SearchClient;
use kbsync::store::ConfigStore;

/// Default location of the exported configuration tree
const DEFAULT_DATA_DIR: &str = "infra/modules/az_search";

/// kbsync - capture, sanitize, and replay search service configuration
#[derive(Parser, Debug)]
#[command(name = "kbsync")]
#[command(about = "Capture, sanitize, and replay Azure AI Search knowledge base configuration", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the configuration graph reachable from knowledge base roots
    Export {
        /// Knowledge base names to export, or '*' for all
        #[arg(long = "kb", value_name = "NAME", num_args = 1.., required = true)]
        kb: Vec<String>,

        /// Output directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        out: PathBuf,
    },
    /// Replace secrets, endpoints and legacy container names with placeholders
    Sanitize {
        /// Path to the exported configuration directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// Show what would be changed without modifying files
        #[arg(long)]
        dry_run: bool,
    },
    /// Inject live credentials and deploy to the target service
    Restore {
        /// Path to the sanitized configuration directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
}

/// Initialize logging based on the debug flag
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Local overrides first; provisioning pipelines export these directly
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.debug);

    match args.command {
        Command::Export { kb, out } => {
            let settings = config::SearchSettings::from_env()?;
            let client = SearchClient::new(&settings.endpoint, &settings.api_key)?;
            let store = ConfigStore::new(out);
            store.ensure_layout()?;

            let counts = Exporter::new(&client, &store).run(&kb).await?;
            println!("Export completed");
            println!("{}", counts);
        }
        Command::Sanitize { data_dir, dry_run } => {
            ensure!(
                data_dir.exists(),
                "Data directory not found: {}",
                data_dir.display()
            );
            let store = ConfigStore::new(data_dir);
            let summary = sanitize::sanitize_store(&store, dry_run)?;

            let action = if dry_run { "Would modify" } else { "Sanitized" };
            println!("{} {}/{} files", action, summary.modified, summary.total);
            if dry_run && summary.modified > 0 {
                println!("Run without --dry-run to apply changes.");
            }
        }
        Command::Restore { data_dir } => {
            ensure!(
                data_dir.exists(),
                "Data directory not found: {}",
                data_dir.display()
            );
            let settings = config::SearchSettings::from_env()?;
            let credentials = config::live_credentials_from_env()?;
            let client = SearchClient::new(&settings.endpoint, &settings.api_key)?;
            let store = ConfigStore::new(data_dir);

            let summary = restore::deploy_store(&client, &store, &credentials).await?;
            println!(
                "Deployed {} knowledge source(s) and {} knowledge base(s)",
                summary.knowledge_sources, summary.knowledge_bases
            );
        }
    }

    Ok(())
}
