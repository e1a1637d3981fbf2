//! Action envelope handling.
//!
//! A chat line of the form `\x01ACTION text\x01` is a third-person action
//! (`/me` in most clients) rather than plain text.
//!
//! # Example
//!
//! ```
//! use tmi_proto::ctcp;
//!
//! assert_eq!(ctcp::strip_action("\x01ACTION waves\x01"), Some("waves"));
//! assert_eq!(ctcp::strip_action("hello"), None);
//! assert_eq!(ctcp::action("dances"), "\x01ACTION dances\x01");
//! ```

/// The envelope delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

const ACTION_MARKER: &str = "\x01ACTION";

/// Check if a message body starts an envelope of any kind.
#[inline]
pub fn is_ctcp(text: &str) -> bool {
    text.starts_with(CTCP_DELIM)
}

/// Whether a message body is an action envelope.
#[inline]
pub fn is_action(text: &str) -> bool {
    text.starts_with(ACTION_MARKER)
}

/// Strip the action envelope, returning the inner text.
///
/// The closing delimiter is optional; some clients truncate it.
pub fn strip_action(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(ACTION_MARKER)?;
    let inner = inner.strip_prefix(' ').unwrap_or(inner);
    Some(inner.strip_suffix(CTCP_DELIM).unwrap_or(inner))
}

/// Wrap text in an action envelope.
pub fn action(text: &str) -> String {
    format!("{ACTION_MARKER} {text}{CTCP_DELIM}")
}
