//! Unified error handling for tmi-client.
//!
//! Public session operations never surface transport or protocol failures as
//! `Err`: those become events. The types here cover the library edges
//! (configuration, telemetry, record store, a dead session handle) and the
//! human-readable catalog used for `disconnected` reasons.

use std::io;

use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::store::StoreError;

/// Reason reported when the server closes the stream.
pub const CLOSED_BY_PEER: &str = "Connection closed by peer";

/// Errors surfaced by the library API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {}", format_validation(.0))]
    Invalid(Vec<ValidationError>),

    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("telemetry setup failed: {0}")]
    Telemetry(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The session task has ended; commands can no longer be delivered.
    #[error("session closed")]
    SessionClosed,
}

impl ClientError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Invalid(_) => "invalid_config",
            Self::Store(_) => "store",
            Self::Telemetry(_) => "telemetry",
            Self::Io(_) => "io",
            Self::SessionClosed => "session_closed",
        }
    }
}

impl From<Vec<ValidationError>> for ClientError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ClientError::Invalid(errors)
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Error catalog (socket failures -> human strings)
// ============================================================================

/// Describe a transport failure the way a user expects to read it.
///
/// Falls back to the error's own message for anything uncatalogued.
pub fn describe_io_error(err: &io::Error) -> String {
    if let Some(text) = describe_kind(err.kind()) {
        return text.to_owned();
    }
    if let Some(text) = err.raw_os_error().and_then(describe_errno) {
        return text.to_owned();
    }
    if err.to_string().contains("failed to lookup address") {
        return "Cannot get your address informations".to_owned();
    }
    err.to_string()
}

fn describe_kind(kind: io::ErrorKind) -> Option<&'static str> {
    use io::ErrorKind::*;

    Some(match kind {
        AddrInUse => "Address already in use",
        AddrNotAvailable => "Cannot assign requested address",
        NetworkDown => "Network is down",
        NetworkUnreachable => "Network is unreachable",
        ConnectionAborted => "Software caused connection abort",
        ConnectionReset => "Connection reset by peer",
        TimedOut => "Connection timed out",
        ConnectionRefused => "Connection refused",
        HostUnreachable => "No route to host",
        UnexpectedEof | BrokenPipe => CLOSED_BY_PEER,
        _ => return None,
    })
}

/// Errno values without a dedicated `ErrorKind`.
#[cfg(target_os = "linux")]
fn describe_errno(code: i32) -> Option<&'static str> {
    Some(match code {
        94 => "Socket type not supported",
        102 => "Network dropped connection because of reset",
        105 => "No buffer space available",
        112 => "Host is down",
        121 => "Remote I/O error",
        _ => return None,
    })
}

#[cfg(not(target_os = "linux"))]
fn describe_errno(_code: i32) -> Option<&'static str> {
    None
}
