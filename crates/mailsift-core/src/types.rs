//! Data model — messages as read from the store, and the rows we export.

use chrono::{DateTime, Local, Utc};

use crate::text::clean_text;
use crate::timefmt::format_received;

/// A message as surfaced by a mail store backend.
///
/// Free-text fields arrive exactly as the store holds them and may contain
/// tabs, newlines, and carriage returns; nothing is sanitized yet.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    /// Read-state flag as tracked by the mail client.
    pub read: bool,
}

/// One exported message: four single-line fields, ready for the TSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub sender: String,
    pub subject: String,
    pub received_at: String,
    pub body: String,
}

impl ExportRow {
    /// Build a row from a qualifying message.
    ///
    /// The three free-text fields go through [`clean_text`] so no raw tab
    /// or newline can reach the serialized table; the timestamp is
    /// rendered via [`format_received`].
    pub fn from_message(msg: &MailMessage) -> Self {
        ExportRow {
            sender: clean_text(&msg.sender),
            subject: clean_text(&msg.subject),
            received_at: format_received(msg.received_at.with_timezone(&Local)),
            body: clean_text(&msg.body),
        }
    }
}
