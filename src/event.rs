//! Typed client events.
//!
//! Every interpretation the classifier or the session produces is one
//! [`Event`] variant. [`Event::kind`] gives the stable lowercase name used in
//! logs and in serialized output.

use serde::Serialize;

use crate::state::UserRecord;

/// Limitation codes reported by the control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitationCode {
    CannotHost,
}

/// Permission codes reported by the control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionCode {
    NoPermission,
    OwnerOnly,
}

/// Something that happened on a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    // ---- lifecycle ----
    Connecting {
        host: String,
        port: u16,
    },
    Connected {
        host: String,
        port: u16,
    },
    Disconnected {
        reason: String,
    },
    Reconnect,
    ConnectFail,
    Logon,
    Ping,
    Pong,
    /// The session task panicked.
    Crash {
        message: String,
    },

    // ---- membership ----
    Join {
        channel: String,
        username: String,
    },
    Part {
        channel: String,
        username: String,
    },

    // ---- chat ----
    Chat {
        channel: String,
        user: UserRecord,
        message: String,
    },
    Action {
        channel: String,
        user: UserRecord,
        message: String,
    },

    // ---- control service ----
    /// Raw control-service line, emitted before its interpretation.
    Jtv {
        params: Vec<String>,
    },
    Subscriber {
        channel: String,
        enabled: bool,
    },
    Slowmode {
        channel: String,
        enabled: bool,
        /// Seconds; -1 when off or when the length could not be read.
        length: i64,
    },
    R9kBeta {
        channel: String,
        enabled: bool,
    },
    Hosted {
        message: String,
        host: String,
        viewers: String,
    },
    Mods {
        channel: String,
        mods: Vec<String>,
    },
    Limitation {
        message: String,
        code: LimitationCode,
    },
    Permission {
        message: String,
        code: PermissionCode,
    },
    SpecialUser {
        username: String,
        value: String,
    },
    UserColor {
        username: String,
        value: String,
    },
    EmoteSet {
        username: String,
        value: String,
    },
    Timeout {
        channel: String,
        username: String,
    },
    ClearChat {
        channel: String,
    },
    RoomBan {
        channel: String,
        username: String,
    },
    RoomChanged {
        channel: String,
    },
    RoomDeleted {
        channel: String,
    },
    RoomInvite {
        channel: String,
        by: String,
    },
    Unhost {
        channel: String,
        remains: String,
    },
    Hosting {
        channel: String,
        target: String,
        remains: String,
    },

    // ---- notification service ----
    TwitchNotify {
        channel: String,
        message: String,
    },
    Subscription {
        channel: String,
        username: String,
    },
}

impl Event {
    /// Stable lowercase name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Connecting { .. } => "connecting",
            Event::Connected { .. } => "connected",
            Event::Disconnected { .. } => "disconnected",
            Event::Reconnect => "reconnect",
            Event::ConnectFail => "connectfail",
            Event::Logon => "logon",
            Event::Ping => "ping",
            Event::Pong => "pong",
            Event::Crash { .. } => "crash",
            Event::Join { .. } => "join",
            Event::Part { .. } => "part",
            Event::Chat { .. } => "chat",
            Event::Action { .. } => "action",
            Event::Jtv { .. } => "jtv",
            Event::Subscriber { .. } => "subscriber",
            Event::Slowmode { .. } => "slowmode",
            Event::R9kBeta { .. } => "r9kbeta",
            Event::Hosted { .. } => "hosted",
            Event::Mods { .. } => "mods",
            Event::Limitation { .. } => "limitation",
            Event::Permission { .. } => "permission",
            Event::SpecialUser { .. } => "specialuser",
            Event::UserColor { .. } => "usercolor",
            Event::EmoteSet { .. } => "emoteset",
            Event::Timeout { .. } => "timeout",
            Event::ClearChat { .. } => "clearchat",
            Event::RoomBan { .. } => "roomban",
            Event::RoomChanged { .. } => "roomchanged",
            Event::RoomDeleted { .. } => "roomdeleted",
            Event::RoomInvite { .. } => "roominvite",
            Event::Unhost { .. } => "unhost",
            Event::Hosting { .. } => "hosting",
            Event::TwitchNotify { .. } => "twitchnotify",
            Event::Subscription { .. } => "subscription",
        }
    }

    /// Channel the event concerns, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Event::Join { channel, .. }
            | Event::Part { channel, .. }
            | Event::Chat { channel, .. }
            | Event::Action { channel, .. }
            | Event::Subscriber { channel, .. }
            | Event::Slowmode { channel, .. }
            | Event::R9kBeta { channel, .. }
            | Event::Mods { channel, .. }
            | Event::Timeout { channel, .. }
            | Event::ClearChat { channel }
            | Event::RoomBan { channel, .. }
            | Event::RoomChanged { channel }
            | Event::RoomDeleted { channel }
            | Event::RoomInvite { channel, .. }
            | Event::Unhost { channel, .. }
            | Event::Hosting { channel, .. }
            | Event::TwitchNotify { channel, .. }
            | Event::Subscription { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// User the event is about, if any.
    pub fn actor(&self) -> Option<&str> {
        match self {
            Event::Join { username, .. }
            | Event::Part { username, .. }
            | Event::SpecialUser { username, .. }
            | Event::UserColor { username, .. }
            | Event::EmoteSet { username, .. }
            | Event::Timeout { username, .. }
            | Event::RoomBan { username, .. }
            | Event::Subscription { username, .. } => Some(username),
            Event::Chat { user, .. } | Event::Action { user, .. } => Some(&user.username),
            Event::Hosted { host, .. } => Some(host),
            _ => None,
        }
    }
}
