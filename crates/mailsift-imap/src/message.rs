//! RFC 2822 parsing — raw fetched bytes into a [`MailMessage`].
//!
//! Header values are kept verbatim (sanitization is the exporter's job).
//! Bodies prefer `text/plain` parts; HTML-only messages fall back to a
//! minimal tag-stripping conversion. Attachments are skipped.

use chrono::{DateTime, Utc};
use mailparse::{DispositionType, ParsedMail};
use tracing::debug;

use mailsift_core::types::MailMessage;

/// Parse raw message bytes into a [`MailMessage`].
///
/// Returns `None` when the message cannot be parsed or carries no usable
/// `Date` header — without a received timestamp the lookback filter cannot
/// be applied, so the message is skipped rather than guessed at.
/// `max_body_chars` caps the extracted body (0 disables the cap). Messages
/// arrive here via `SEARCH UNSEEN`, hence `read: false`.
pub(crate) fn parse_message(raw: &[u8], max_body_chars: usize) -> Option<MailMessage> {
    let parsed = mailparse::parse_mail(raw).ok()?;

    let sender = header_value(&parsed, "From");
    let subject = header_value(&parsed, "Subject");

    let date_raw = header_value(&parsed, "Date");
    let received_at = parse_date(&date_raw)?;

    let body = extract_body(&parsed, max_body_chars);

    Some(MailMessage {
        sender,
        subject,
        body,
        received_at,
        read: false,
    })
}

/// First value of a header, by case-insensitive name.
fn header_value(mail: &ParsedMail, name: &str) -> String {
    mail.headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case(name))
        .map(|h| h.get_value())
        .unwrap_or_default()
}

/// Parse an RFC 2822 `Date` header value.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    match mailparse::dateparse(value) {
        Ok(epoch) => DateTime::from_timestamp(epoch, 0),
        Err(e) => {
            debug!(date = %value, error = %e, "unparseable Date header");
            None
        }
    }
}

/// Extract the text body (prefer text/plain, fallback to converted HTML).
fn extract_body(mail: &ParsedMail, max_chars: usize) -> String {
    if mail.subparts.is_empty() {
        let ct = mail.ctype.mimetype.to_lowercase();
        let body = mail.get_body().unwrap_or_default();
        let text = if ct.contains("text/html") {
            html_to_text(&body)
        } else {
            body
        };
        return cap_chars(&text, max_chars);
    }

    let mut plain_parts = Vec::new();
    let mut html_parts = Vec::new();
    collect_text_parts(mail, &mut plain_parts, &mut html_parts);

    let body = if !plain_parts.is_empty() {
        plain_parts.join("\n")
    } else {
        html_parts
            .iter()
            .map(|h| html_to_text(h))
            .collect::<Vec<_>>()
            .join("\n")
    };

    cap_chars(&body, max_chars)
}

/// Recursively collect text parts from multipart messages, skipping
/// attachments.
fn collect_text_parts(mail: &ParsedMail, plain: &mut Vec<String>, html: &mut Vec<String>) {
    for part in &mail.subparts {
        if part.get_content_disposition().disposition == DispositionType::Attachment {
            continue;
        }

        if !part.subparts.is_empty() {
            collect_text_parts(part, plain, html);
        } else {
            let ct = part.ctype.mimetype.to_lowercase();
            if let Ok(body) = part.get_body() {
                if ct.contains("text/plain") {
                    plain.push(body);
                } else if ct.contains("text/html") {
                    html.push(body);
                }
            }
        }
    }
}

/// Convert minimal HTML to plain text.
fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    // <br> → newline
    text = regex::Regex::new(r"(?i)<br\s*/?>")
        .unwrap()
        .replace_all(&text, "\n")
        .to_string();
    // </p> → newline
    text = regex::Regex::new(r"(?i)</p>")
        .unwrap()
        .replace_all(&text, "\n")
        .to_string();
    // Strip all remaining tags
    text = regex::Regex::new(r"<[^>]+>")
        .unwrap()
        .replace_all(&text, "")
        .to_string();
    // Unescape common HTML entities
    text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    text.trim().to_string()
}

/// Cap a string at `max` characters. 0 means unlimited. Unicode-safe.
fn cap_chars(s: &str, max: usize) -> String {
    if max == 0 || s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
