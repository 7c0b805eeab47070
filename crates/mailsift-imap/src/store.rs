//! [`MailStore`] implementation on top of the minimal IMAP client.
//!
//! One `ImapMailStore` holds one session: the connection is opened lazily
//! on first use and reused across folder scans within the invocation.
//! Connect and login failures map to `Unavailable`/`Auth`; everything
//! after a successful login maps to `Protocol`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use mailsift_core::config::StoreConfig;
use mailsift_core::error::StoreError;
use mailsift_core::store::MailStore;
use mailsift_core::types::MailMessage;

use crate::client::ImapClient;
use crate::message::parse_message;

/// Inbox-like mailbox names: `INBOX` itself and its children
/// (`INBOX` followed by a hierarchy delimiter), case-insensitive.
fn is_inbox_like(name: &str) -> bool {
    let Some(head) = name.get(..5) else {
        return false;
    };
    if !head.eq_ignore_ascii_case("INBOX") {
        return false;
    }
    match name[5..].chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

/// Build the SEARCH criteria for unread candidates since `cutoff`.
///
/// IMAP `SINCE` compares the server's internal date at day granularity,
/// so the search date is widened one day below the cutoff. The result is
/// then always a superset of the window, even when the server's calendar
/// date lags the cutoff's UTC date; the exporter re-applies the
/// minute-precise cutoff on every candidate.
fn search_criteria(cutoff: DateTime<Utc>) -> String {
    let since = cutoff
        .checked_sub_signed(Duration::days(1))
        .unwrap_or(cutoff);
    format!("UNSEEN SINCE {}", since.format("%d-%b-%Y"))
}

pub struct ImapMailStore {
    config: StoreConfig,
    client: Option<ImapClient>,
    selected: Option<String>,
}

impl ImapMailStore {
    pub fn new(config: StoreConfig) -> Self {
        ImapMailStore {
            config,
            client: None,
            selected: None,
        }
    }

    /// Connect and log in on first use; reuse the session afterwards.
    async fn session(&mut self) -> Result<&mut ImapClient, StoreError> {
        if self.client.is_none() {
            let mut client =
                ImapClient::connect(&self.config.host, self.config.port, self.config.use_ssl)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            client
                .login(&self.config.username, &self.config.password)
                .await
                .map_err(|e| StoreError::Auth(e.to_string()))?;
            debug!(host = %self.config.host, "IMAP session opened");
            self.client = Some(client);
        }
        self.client
            .as_mut()
            .ok_or_else(|| StoreError::Unavailable("no IMAP session".into()))
    }

    /// Log out and drop the session. Errors here are non-fatal.
    pub async fn close(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Err(e) = client.logout().await {
                debug!(error = %e, "IMAP logout error (non-fatal)");
            }
        }
        self.selected = None;
    }
}

#[async_trait]
impl MailStore for ImapMailStore {
    async fn inbox_folders(&mut self) -> Result<Vec<String>, StoreError> {
        if !self.config.folders.is_empty() {
            return Ok(self.config.folders.clone());
        }

        let client = self.session().await?;
        let mailboxes = client
            .list()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;

        let folders: Vec<String> = mailboxes
            .into_iter()
            .filter(|m| m.selectable && is_inbox_like(&m.name))
            .map(|m| m.name)
            .collect();

        if folders.is_empty() {
            return Err(StoreError::Protocol(
                "no inbox-like mailbox found; set `folders` in the config".into(),
            ));
        }
        Ok(folders)
    }

    async fn messages_since(
        &mut self,
        folder: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MailMessage>, StoreError> {
        let max_body = self.config.max_body_chars;
        let need_select = self.selected.as_deref() != Some(folder);

        let client = self.session().await?;
        if need_select {
            client
                .select(folder)
                .await
                .map_err(|e| StoreError::Protocol(e.to_string()))?;
        }

        let criteria = search_criteria(cutoff);
        let seqnums = client
            .search(&criteria)
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;
        debug!(folder = %folder, candidates = seqnums.len(), "unseen search done");

        let mut out = Vec::with_capacity(seqnums.len());
        for seqnum in seqnums {
            let raw = match client.fetch_peek(seqnum).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(seqnum, folder = %folder, error = %e, "failed to fetch message");
                    continue;
                }
            };
            match parse_message(&raw, max_body) {
                Some(msg) => out.push(msg),
                None => warn!(seqnum, folder = %folder, "skipping unparseable message"),
            }
        }

        self.selected = Some(folder.to_string());
        Ok(out)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::client::ListedMailbox;

    #[test]
    fn test_inbox_like_accepts_inbox_and_children() {
        assert!(is_inbox_like("INBOX"));
        assert!(is_inbox_like("inbox"));
        assert!(is_inbox_like("Inbox"));
        assert!(is_inbox_like("INBOX/Receipts"));
        assert!(is_inbox_like("INBOX.Work"));
        assert!(is_inbox_like("inbox/nested/deeper"));
    }

    #[test]
    fn test_inbox_like_rejects_other_mailboxes() {
        assert!(!is_inbox_like("Archive"));
        assert!(!is_inbox_like("Sent"));
        assert!(!is_inbox_like("INBOXED"));
        assert!(!is_inbox_like("INBOX2"));
        assert!(!is_inbox_like("IN"));
        assert!(!is_inbox_like(""));
    }

    #[test]
    fn test_discovery_filter_keeps_selectable_inbox_tree() {
        let mailboxes = vec![
            ListedMailbox {
                name: "INBOX".into(),
                selectable: true,
            },
            ListedMailbox {
                name: "INBOX/Receipts".into(),
                selectable: true,
            },
            ListedMailbox {
                name: "INBOX/Spam".into(),
                selectable: false,
            },
            ListedMailbox {
                name: "Archive".into(),
                selectable: true,
            },
        ];

        let kept: Vec<String> = mailboxes
            .into_iter()
            .filter(|m| m.selectable && is_inbox_like(&m.name))
            .map(|m| m.name)
            .collect();
        assert_eq!(kept, vec!["INBOX", "INBOX/Receipts"]);
    }

    #[test]
    fn test_search_date_sits_one_day_below_cutoff() {
        // Just past UTC midnight: a server whose calendar date still
        // reads the 24th must not be able to exclude in-window mail.
        let cutoff = Utc.with_ymd_and_hms(2026, 8, 25, 0, 30, 0).unwrap();
        assert_eq!(search_criteria(cutoff), "UNSEEN SINCE 24-Aug-2026");
    }

    #[test]
    fn test_search_criteria_shape() {
        let cutoff = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        assert_eq!(search_criteria(cutoff), "UNSEEN SINCE 01-Mar-2026");
    }
}
