//! Configuration — the three positional invocation arguments, plus the
//! store settings read from `~/.mailsift/config.json`.
//!
//! # Loading precedence (store settings)
//! 1. Defaults (from `StoreConfig::default()`)
//! 2. JSON file at `~/.mailsift/config.json` (camelCase keys)
//! 3. Environment variables `MAILSIFT_IMAP__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExportError;

/// Lookback window used when the supplied value is below 1.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// Row cap used when the supplied value is below 1.
pub const DEFAULT_MAX_EMAILS: usize = 15;

// ─────────────────────────────────────────────
// Invocation arguments
// ─────────────────────────────────────────────

/// Validated arguments of one export invocation.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Trailing window, in minutes, a message must fall into.
    pub lookback_minutes: i64,
    /// Global cap on exported rows, across all folders.
    pub max_emails: usize,
    /// File the row table is written to (fully replaced every run).
    pub output_path: PathBuf,
}

impl ExportConfig {
    /// Validate the three positional invocation values.
    ///
    /// All three must be present; anything missing is a `Configuration`
    /// error raised before the mail store or the filesystem is touched.
    /// Out-of-range numbers do not fail — they fall back to the defaults
    /// (60 minutes / 15 rows), matching the historical contract.
    pub fn resolve(
        lookback_minutes: Option<i64>,
        max_emails: Option<i64>,
        output_path: Option<PathBuf>,
    ) -> Result<Self, ExportError> {
        let (Some(lookback), Some(max), Some(output_path)) =
            (lookback_minutes, max_emails, output_path)
        else {
            return Err(ExportError::Configuration(
                "expected three arguments: <LOOKBACK_MINUTES> <MAX_EMAILS> <OUTPUT_PATH>".into(),
            ));
        };

        let lookback_minutes = if lookback < 1 {
            debug!(supplied = lookback, "lookback below 1, using default");
            DEFAULT_LOOKBACK_MINUTES
        } else {
            lookback
        };
        let max_emails = if max < 1 {
            debug!(supplied = max, "max emails below 1, using default");
            DEFAULT_MAX_EMAILS
        } else {
            max as usize
        };

        Ok(ExportConfig {
            lookback_minutes,
            max_emails,
            output_path,
        })
    }
}

// ─────────────────────────────────────────────
// Store settings
// ─────────────────────────────────────────────

/// Settings for the live IMAP-backed mail store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    /// Folders to scan, in order. Empty means: discover the inbox via LIST.
    pub folders: Vec<String>,
    /// Body length cap, in characters, applied when a message is parsed.
    /// 0 disables the cap.
    pub max_body_chars: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            host: String::new(),
            port: 993,
            username: String::new(),
            password: String::new(),
            use_ssl: true,
            folders: Vec::new(),
            max_body_chars: 12000,
        }
    }
}

impl StoreConfig {
    /// Whether the settings are complete enough to open a session.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Default store config file path.
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// The Mailsift data directory (e.g. `~/.mailsift/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".mailsift")
}

/// Load store settings from the given path (default path if `None`),
/// falling back to defaults when the file is missing or unparseable, then
/// applying env-var overrides on top.
pub fn load_store_config(path: Option<&Path>) -> StoreConfig {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_store_config_from_path(&config_path)
}

fn load_store_config_from_path(path: &Path) -> StoreConfig {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(StoreConfig::default());
    }

    debug!("Loading store config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(StoreConfig::default());
        }
    };

    let config: StoreConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(StoreConfig::default());
        }
    };

    apply_env_overrides(config)
}

/// Apply `MAILSIFT_IMAP__<FIELD>` environment overrides.
///
/// Supported: `HOST`, `PORT`, `USERNAME`, `PASSWORD`, `USE_SSL`,
/// `FOLDERS` (comma-separated), `MAX_BODY_CHARS`.
fn apply_env_overrides(mut config: StoreConfig) -> StoreConfig {
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__HOST") {
        config.host = val;
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.port = p;
        }
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__USERNAME") {
        config.username = val;
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__PASSWORD") {
        config.password = val;
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__USE_SSL") {
        config.use_ssl = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__FOLDERS") {
        config.folders = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(val) = std::env::var("MAILSIFT_IMAP__MAX_BODY_CHARS") {
        if let Ok(n) = val.parse::<usize>() {
            config.max_body_chars = n;
        }
    }
    config
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
