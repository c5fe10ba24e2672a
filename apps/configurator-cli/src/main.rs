//! # Configurator Command Adapter
//!
//! Thin binary that puts the engine behind a line-oriented JSON protocol, so
//! any rendering layer (web view, native UI, test harness) can drive it.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr; stdout carries the protocol)
//! 2. Load `configurator.toml` (defaults + env overrides)
//! 3. Load the catalog document, logging integrity issues
//! 4. Build the HTTP commerce backend
//! 5. Answer one reply per command line until stdin closes
//!
//! ## Example Session
//! ```text
//! $ configurator --catalog demos/nova75.json
//! > {"command": "select", "handle": "case", "variantId": 101}
//! < {"status":"ok","response":{"type":"snapshot","data":{...}}}
//! > {"command": "submit"}
//! < {"status":"error","error":{"code":"NOT_READY","message":"1 / 3 Components Selected"}}
//! ```

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use configurator_checkout::{load_catalog, ConfiguratorConfig, HttpCommerceBackend};
use configurator_core::Configurator;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Reply, Session};
use crate::error::{ApiError, CliError};

#[derive(Parser, Debug)]
#[command(name = "configurator")]
#[command(about = "Drive the component configurator over JSON lines on stdin/stdout")]
struct Args {
    /// Catalog document (JSON). Falls back to `[catalog] path` in the config.
    #[arg(short, long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable checkout while any conflict is active.
    #[arg(long)]
    block_on_conflict: bool,

    /// Require the preorder agreement before checkout.
    #[arg(long)]
    require_preorder: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Configurator stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let config = ConfiguratorConfig::load(args.config)?;

    let catalog_path = args
        .catalog
        .or_else(|| config.catalog.path.clone())
        .ok_or(CliError::MissingCatalog)?;
    let catalog = load_catalog(&catalog_path)?;

    let mut policy = config.policy();
    policy.block_on_conflict |= args.block_on_conflict;
    policy.require_preorder_agreement |= args.require_preorder;

    let backend = HttpCommerceBackend::new(&config.backend)?;
    info!(
        url = %backend.add_url(),
        block_on_conflict = policy.block_on_conflict,
        require_preorder = policy.require_preorder_agreement,
        "Configurator ready"
    );

    let mut session = Session::new(
        Configurator::new(catalog, policy),
        Box::new(backend),
        config.retry.clone(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = session.handle_line(&line).await;
        if let Reply::Error { error } = &reply {
            warn!(code = ?error.code, message = %error.message, "Command failed");
        }

        let mut encoded = match serde_json::to_string(&reply) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "Failed to encode reply");
                serde_json::to_string(&Reply::Error {
                    error: ApiError::internal("Failed to encode reply"),
                })?
            }
        };
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!(
        selections = session.configurator().store().len(),
        "Input closed, shutting down"
    );
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show every command
/// - `RUST_LOG=info` - Default, startup and submissions only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
