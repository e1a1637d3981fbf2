//! # tmi-proto
//!
//! Raw protocol feed for the TMI chat protocol, an IRC dialect extended with
//! platform control messages.
//!
//! ## Features
//!
//! - [`RawMessage`]: one protocol line as `{prefix, command, params}`
//! - [`RawMessage::sender`]: nickname of a hostmask, or the server name
//! - [`IrcCodec`]: tokio codec yielding [`RawMessage`]s in wire order and
//!   writing CRLF-terminated frames
//! - Action envelope and channel-name helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use tmi_proto::{ChannelExt, RawMessage};
//!
//! let join = RawMessage::join(&"SomeChannel".to_channel_name());
//! assert_eq!(join.to_string(), "JOIN #somechannel");
//!
//! let line: RawMessage = ":tmi.twitch.tv 376 bot :>".parse().unwrap();
//! assert_eq!(line.numeric_code(), Some(376));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod ctcp;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;

pub use self::chan::ChannelExt;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, LINE_TERMINATOR, MAX_LINE_LEN};
pub use self::message::RawMessage;
