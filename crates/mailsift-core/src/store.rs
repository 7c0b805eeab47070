//! The seam between the exporter and a live mail client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::types::MailMessage;

/// Read-only access to a mail store.
///
/// Backends enumerate folders and messages in whatever order the client
/// returns them; the exporter deliberately does not re-sort. A backend may
/// over-approximate `messages_since` (IMAP `SINCE`, for instance, has day
/// granularity) — the exporter re-applies the exact unread-and-in-window
/// predicate to every candidate, so returning a superset is fine.
///
/// Implementations must not mutate read-state: exported messages stay
/// unread. Marking them read is a downstream consumer's job.
#[async_trait]
pub trait MailStore {
    /// Inbox-equivalent folders, in client order.
    async fn inbox_folders(&mut self) -> Result<Vec<String>, StoreError>;

    /// Candidate unread messages of one folder received at or after
    /// `cutoff`, in client order.
    async fn messages_since(
        &mut self,
        folder: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MailMessage>, StoreError>;
}
