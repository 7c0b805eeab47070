//! A minimal async IMAP client (raw TCP + optional rustls TLS).
//!
//! Supports only the commands the export needs: LOGIN, LIST, SELECT,
//! SEARCH, FETCH with `BODY.PEEK[]`, LOGOUT. Response parsing for LIST,
//! SEARCH, and FETCH literals lives in free functions so it can be tested
//! without a server.

use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

/// Async read+write stream marker.
trait ImapStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}
impl<T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send> ImapStream for T {}

/// A mailbox as reported by LIST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListedMailbox {
    pub name: String,
    /// False when the server flagged the mailbox `\Noselect`.
    pub selectable: bool,
}

pub(crate) struct ImapClient {
    reader: BufReader<ReadHalf<Box<dyn ImapStream>>>,
    writer: WriteHalf<Box<dyn ImapStream>>,
    tag_counter: u32,
}

impl ImapClient {
    /// Connect to an IMAP server (plain or IMAPS/TLS) and read the greeting.
    pub async fn connect(host: &str, port: u16, use_ssl: bool) -> Result<Self> {
        let tcp = TcpStream::connect((host, port)).await?;

        let stream: Box<dyn ImapStream> = if use_ssl {
            let mut root_store = rustls::RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let connector = tokio_rustls::TlsConnector::from(Arc::new(config));
            let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
                .map_err(|e| anyhow::anyhow!("invalid server name '{}': {}", host, e))?;
            let tls = connector.connect(server_name, tcp).await?;
            Box::new(tls)
        } else {
            Box::new(tcp)
        };

        let (read, write) = tokio::io::split(stream);
        let mut client = Self {
            reader: BufReader::new(read),
            writer: write,
            tag_counter: 0,
        };

        let greeting = client.read_line().await?;
        if !greeting.to_uppercase().starts_with("* OK") {
            bail!("unexpected IMAP greeting: {}", greeting);
        }
        debug!(greeting = %greeting, "IMAP connected");

        Ok(client)
    }

    /// Read a single CRLF-terminated line.
    async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            bail!("IMAP connection closed unexpectedly");
        }
        Ok(line
            .trim_end_matches("\r\n")
            .trim_end_matches('\n')
            .to_string())
    }

    /// Read exactly `n` bytes (a literal).
    async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.reader.read_exact(&mut buf).await?;
        Ok(buf)
    }

    /// Send a tagged command. Returns the tag.
    async fn send_command(&mut self, cmd: &str) -> Result<String> {
        self.tag_counter += 1;
        let tag = format!("A{:04}", self.tag_counter);
        let line = format!("{} {}\r\n", tag, cmd);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(tag)
    }

    /// Read responses until the tagged completion line.
    /// Returns (untagged_lines, tagged_status_line).
    async fn read_response(&mut self, tag: &str) -> Result<(Vec<String>, String)> {
        let mut untagged = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line.starts_with(tag) {
                return Ok((untagged, line));
            }
            untagged.push(line);
        }
    }

    /// LOGIN
    pub async fn login(&mut self, user: &str, pass: &str) -> Result<()> {
        let cmd = format!(
            "LOGIN \"{}\" \"{}\"",
            user.replace('\\', "\\\\").replace('"', "\\\""),
            pass.replace('\\', "\\\\").replace('"', "\\\""),
        );
        let tag = self.send_command(&cmd).await?;
        let (_, status) = self.read_response(&tag).await?;
        if !status.to_uppercase().contains("OK") {
            bail!("IMAP LOGIN failed: {}", status);
        }
        Ok(())
    }

    /// LIST all mailboxes of the account.
    pub async fn list(&mut self) -> Result<Vec<ListedMailbox>> {
        let tag = self.send_command("LIST \"\" \"*\"").await?;
        let (lines, status) = self.read_response(&tag).await?;
        if !status.to_uppercase().contains("OK") {
            bail!("IMAP LIST failed: {}", status);
        }
        Ok(lines.iter().filter_map(|l| parse_list_line(l)).collect())
    }

    /// SELECT a mailbox.
    pub async fn select(&mut self, mailbox: &str) -> Result<()> {
        let cmd = format!("SELECT \"{}\"", mailbox);
        let tag = self.send_command(&cmd).await?;
        let (_, status) = self.read_response(&tag).await?;
        if !status.to_uppercase().contains("OK") {
            bail!("IMAP SELECT failed: {}", status);
        }
        Ok(())
    }

    /// SEARCH with the given criteria — returns message sequence numbers.
    pub async fn search(&mut self, criteria: &str) -> Result<Vec<u32>> {
        let tag = self.send_command(&format!("SEARCH {}", criteria)).await?;
        let (lines, status) = self.read_response(&tag).await?;
        if !status.to_uppercase().contains("OK") {
            bail!("IMAP SEARCH failed: {}", status);
        }
        Ok(parse_search_lines(&lines))
    }

    /// FETCH one message by sequence number, without touching `\Seen`.
    /// Returns the raw RFC 2822 bytes.
    pub async fn fetch_peek(&mut self, seqnum: u32) -> Result<Vec<u8>> {
        let cmd = format!("FETCH {} (BODY.PEEK[])", seqnum);
        let tag = self.send_command(&cmd).await?;

        let mut raw = Vec::new();
        loop {
            let line = self.read_line().await?;

            // Tagged response = done
            if line.starts_with(&tag) {
                if !line.to_uppercase().contains("OK") {
                    bail!("IMAP FETCH failed: {}", line);
                }
                break;
            }

            // Untagged FETCH response: * N FETCH (BODY[] {size}
            if line.starts_with("* ") && line.to_uppercase().contains("FETCH") {
                if let Some(size) = parse_literal_size(&line) {
                    raw = self.read_exact(size).await?;
                    // Consume the closing line after the literal
                    let _ = self.read_line().await?;
                }
            }
        }

        if raw.is_empty() {
            bail!("IMAP FETCH returned no literal for message {}", seqnum);
        }
        Ok(raw)
    }

    /// LOGOUT
    pub async fn logout(&mut self) -> Result<()> {
        let tag = self.send_command("LOGOUT").await?;
        // Server may send * BYE before the tagged OK
        let _ = self.read_response(&tag).await;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────

/// Parse one untagged LIST line, e.g.
/// `* LIST (\HasNoChildren) "/" "INBOX"` or `* LIST (\Noselect) "." Archive`.
pub(crate) fn parse_list_line(line: &str) -> Option<ListedMailbox> {
    let prefix = line.get(..7)?;
    if !prefix.eq_ignore_ascii_case("* LIST ") {
        return None;
    }
    let rest = &line[7..];

    let attrs_start = rest.find('(')?;
    let attrs_end = rest[attrs_start..].find(')')? + attrs_start;
    let attrs = &rest[attrs_start + 1..attrs_end];
    let selectable = !attrs.to_ascii_lowercase().contains("\\noselect");

    // Skip the hierarchy delimiter field ("/" or NIL), then take the name.
    let after = rest[attrs_end + 1..].trim_start();
    let name_part = if let Some(quoted) = after.strip_prefix('"') {
        let close = quoted.find('"')?;
        quoted[close + 1..].trim_start()
    } else {
        let sp = after.find(' ')?;
        after[sp + 1..].trim_start()
    };

    let name = name_part.trim().trim_matches('"').to_string();
    if name.is_empty() {
        return None;
    }
    Some(ListedMailbox { name, selectable })
}

/// Collect sequence numbers out of `* SEARCH n n n` lines.
pub(crate) fn parse_search_lines(lines: &[String]) -> Vec<u32> {
    let mut seqnums = Vec::new();
    for line in lines {
        if line.to_uppercase().starts_with("* SEARCH") {
            seqnums.extend(
                line.split_whitespace()
                    .skip(2) // skip "* SEARCH"
                    .filter_map(|s| s.parse::<u32>().ok()),
            );
        }
    }
    seqnums
}

/// Extract the `{N}` literal size from a FETCH response line.
pub(crate) fn parse_literal_size(line: &str) -> Option<usize> {
    let open = line.rfind('{')?;
    let close = line.rfind('}')?;
    if close <= open {
        return None;
    }
    line[open + 1..close].parse().ok()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── LIST parsing ──

    #[test]
    fn test_list_quoted_name() {
        let mb = parse_list_line(r#"* LIST (\HasNoChildren) "/" "INBOX""#).unwrap();
        assert_eq!(mb.name, "INBOX");
        assert!(mb.selectable);
    }

    #[test]
    fn test_list_unquoted_name() {
        let mb = parse_list_line(r#"* LIST (\HasChildren) "." INBOX"#).unwrap();
        assert_eq!(mb.name, "INBOX");
    }

    #[test]
    fn test_list_child_mailbox() {
        let mb = parse_list_line(r#"* LIST (\HasNoChildren) "/" "INBOX/Receipts""#).unwrap();
        assert_eq!(mb.name, "INBOX/Receipts");
    }

    #[test]
    fn test_list_noselect() {
        let mb = parse_list_line(r#"* LIST (\Noselect \HasChildren) "/" "[Gmail]""#).unwrap();
        assert_eq!(mb.name, "[Gmail]");
        assert!(!mb.selectable);
    }

    #[test]
    fn test_list_nil_delimiter() {
        let mb = parse_list_line(r#"* LIST () NIL "Archive""#).unwrap();
        assert_eq!(mb.name, "Archive");
    }

    #[test]
    fn test_list_name_with_space() {
        let mb = parse_list_line(r#"* LIST (\HasNoChildren) "/" "Old Mail""#).unwrap();
        assert_eq!(mb.name, "Old Mail");
    }

    #[test]
    fn test_list_rejects_other_untagged_lines() {
        assert!(parse_list_line("* 3 EXISTS").is_none());
        assert!(parse_list_line("* OK ready").is_none());
        assert!(parse_list_line("").is_none());
    }

    // ── SEARCH parsing ──

    #[test]
    fn test_search_numbers() {
        let lines = vec!["* SEARCH 2 5 44".to_string()];
        assert_eq!(parse_search_lines(&lines), vec![2, 5, 44]);
    }

    #[test]
    fn test_search_empty_result() {
        let lines = vec!["* SEARCH".to_string()];
        assert!(parse_search_lines(&lines).is_empty());
    }

    #[test]
    fn test_search_ignores_unrelated_lines() {
        let lines = vec![
            "* 12 EXISTS".to_string(),
            "* SEARCH 7".to_string(),
            "* OK still here".to_string(),
        ];
        assert_eq!(parse_search_lines(&lines), vec![7]);
    }

    #[test]
    fn test_search_multiple_lines_accumulate() {
        let lines = vec!["* SEARCH 1 2".to_string(), "* SEARCH 3".to_string()];
        assert_eq!(parse_search_lines(&lines), vec![1, 2, 3]);
    }

    // ── FETCH literal size ──

    #[test]
    fn test_literal_size() {
        assert_eq!(parse_literal_size("* 1 FETCH (BODY[] {2048}"), Some(2048));
    }

    #[test]
    fn test_literal_size_absent() {
        assert_eq!(parse_literal_size("* 1 FETCH (FLAGS (\\Seen))"), None);
    }

    #[test]
    fn test_literal_size_garbage() {
        assert_eq!(parse_literal_size("* 1 FETCH (BODY[] {nope}"), None);
    }
}
