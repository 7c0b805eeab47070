//! Mailsift CLI — entry point.
//!
//! Invocation contract (positional, in order):
//! 1. lookback window in minutes (below 1 falls back to 60)
//! 2. maximum row count (below 1 falls back to 15)
//! 3. output file path (fully replaced on every run)
//!
//! ```text
//! mailsift 60 15 /tmp/unread.tsv
//! ```
//!
//! Store settings (IMAP host, credentials, folders) come from
//! `~/.mailsift/config.json` or `MAILSIFT_IMAP__*` env vars.

mod helpers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use mailsift_core::config::{get_config_path, load_store_config, ExportConfig};
use mailsift_core::error::ExportError;
use mailsift_core::exporter::Exporter;
use mailsift_imap::ImapMailStore;

/// Export unread mail from the inbox to a tab-separated snapshot.
#[derive(Parser)]
#[command(name = "mailsift", version, about, long_about = None)]
struct Cli {
    /// Lookback window in minutes (values below 1 fall back to 60)
    lookback_minutes: Option<i64>,

    /// Maximum number of exported rows (values below 1 fall back to 15)
    max_emails: Option<i64>,

    /// Output file path (fully replaced on every run)
    output_path: Option<String>,

    /// Alternate store config file (default: ~/.mailsift/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err {
                ExportError::Configuration(_) => 2,
                _ => 1,
            };
            error!("{err}");
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExportError> {
    // Arguments are validated before the store or filesystem is touched.
    let export_config = ExportConfig::resolve(
        cli.lookback_minutes,
        cli.max_emails,
        cli.output_path.as_deref().map(helpers::expand_tilde),
    )?;
    let output_path = export_config.output_path.clone();

    let store_config = load_store_config(cli.config.as_deref());
    if !store_config.is_configured() {
        return Err(ExportError::Configuration(format!(
            "imap host/username/password not set — fill in {} or the MAILSIFT_IMAP__* env vars",
            cli.config
                .unwrap_or_else(get_config_path)
                .display()
        )));
    }

    let mut store = ImapMailStore::new(store_config);
    let exporter = Exporter::new(export_config);
    let result = exporter.export_unread(&mut store, chrono::Utc::now()).await;
    store.close().await;

    let rows = result?;
    helpers::print_summary(rows, &output_path);
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("mailsift_core=debug,mailsift_imap=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
