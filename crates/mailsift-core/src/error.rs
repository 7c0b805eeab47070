//! Error taxonomy for one export invocation.
//!
//! Three kinds, all fatal to the invocation: bad arguments, unreachable
//! mail store, failed file write. Nothing is retried here and nothing is
//! swallowed — retry policy belongs to whatever schedules the export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a [`MailStore`](crate::store::MailStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all (connection, TLS, greeting).
    #[error("mail store unreachable: {0}")]
    Unavailable(String),

    /// The store refused our credentials.
    #[error("mail store rejected login: {0}")]
    Auth(String),

    /// The store answered, but a query failed mid-way.
    #[error("mail store query failed: {0}")]
    Protocol(String),
}

/// Top-level error of an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bad or missing invocation arguments. Raised before the mail store
    /// or the filesystem is touched.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The mail store could not be queried. No output file is produced —
    /// an empty export must never masquerade as success.
    #[error("mail source unavailable: {0}")]
    SourceUnavailable(#[from] StoreError),

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
