//! mailsift-core — the export/extraction stage of the unread-mail digest
//! pipeline: data model, configuration, sanitization, and the exporter
//! itself.
//!
//! Live mail access sits behind the [`store::MailStore`] trait and the
//! clock is injected into [`exporter::Exporter::export_unread`], so the
//! whole pass is a deterministic function of `(now, store, config)`.

pub mod config;
pub mod error;
pub mod exporter;
pub mod store;
pub mod text;
pub mod timefmt;
pub mod types;

pub use error::{ExportError, StoreError};
pub use exporter::Exporter;
pub use store::MailStore;
pub use types::{ExportRow, MailMessage};
