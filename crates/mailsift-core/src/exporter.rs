//! The export pass: scan folders, filter, cap, render, write.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::store::MailStore;
use crate::types::{ExportRow, MailMessage};

/// Column header, always the first line of the export file.
pub const HEADER: &str = "sender\tsubject\treceived_at\tbody";

/// Runs one scan-filter-write pass against an injected store and clock.
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Exporter { config }
    }

    /// Export unread messages received within the lookback window.
    ///
    /// `now` is injected so the cutoff — and therefore the whole result —
    /// is a function of the inputs alone. The file at `output_path` is
    /// fully replaced in a single write; on any failure before that write
    /// the file is left untouched, and a failed write propagates after the
    /// handle is closed. Returns the number of data rows written.
    pub async fn export_unread<S: MailStore + ?Sized>(
        &self,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> Result<usize, ExportError> {
        // Oversized lookbacks saturate to the representable floor: the
        // window then simply covers everything, instead of overflowing.
        let cutoff = Duration::try_minutes(self.config.lookback_minutes)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let rows = self.collect_rows(store, cutoff).await?;
        let content = render_tsv(&rows);

        tokio::fs::write(&self.config.output_path, content)
            .await
            .map_err(|source| ExportError::Write {
                path: self.config.output_path.clone(),
                source,
            })?;

        info!(
            rows = rows.len(),
            path = %self.config.output_path.display(),
            "export written"
        );
        Ok(rows.len())
    }

    /// Collect up to `max_emails` qualifying rows across all folders.
    ///
    /// The cap is global: once reached, remaining folders are not queried
    /// at all. Candidate order within and across folders is whatever the
    /// store returns — deliberately not re-sorted.
    async fn collect_rows<S: MailStore + ?Sized>(
        &self,
        store: &mut S,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ExportRow>, ExportError> {
        let folders = store.inbox_folders().await?;
        debug!(folders = folders.len(), %cutoff, "scanning folders");

        let mut rows = Vec::new();
        'folders: for folder in &folders {
            let candidates = store.messages_since(folder, cutoff).await?;
            debug!(folder = %folder, candidates = candidates.len(), "folder scanned");
            for msg in &candidates {
                if !qualifies(msg, cutoff) {
                    continue;
                }
                rows.push(ExportRow::from_message(msg));
                if rows.len() >= self.config.max_emails {
                    debug!(folder = %folder, "row cap reached");
                    break 'folders;
                }
            }
        }
        Ok(rows)
    }
}

/// The export predicate: unread and received inside the lookback window.
fn qualifies(msg: &MailMessage, cutoff: DateTime<Utc>) -> bool {
    !msg.read && msg.received_at >= cutoff
}

/// Render header + rows as the tab-separated wire format.
pub fn render_tsv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 128);
    out.push_str(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.sender);
        out.push('\t');
        out.push_str(&row.subject);
        out.push('\t');
        out.push_str(&row.received_at);
        out.push('\t');
        out.push_str(&row.body);
        out.push('\n');
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
