//! mailsift-imap — the live [`MailStore`](mailsift_core::store::MailStore)
//! backend.
//!
//! Speaks just enough IMAP to enumerate inbox folders and pull unread
//! messages: LOGIN, LIST, SELECT, SEARCH, FETCH with `BODY.PEEK[]`, and
//! LOGOUT. Strictly read-only — `BODY.PEEK` leaves the `\Seen` flag alone
//! and no STORE command is ever issued, so exported messages stay unread.

mod client;
mod message;
mod store;

pub use store::ImapMailStore;
