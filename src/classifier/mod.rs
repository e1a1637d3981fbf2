//! Interpretation of inbound protocol lines.
//!
//! The classifier is sans-IO: it turns one [`RawMessage`] into the events it
//! implies plus the actions the session must perform (frames to write, joins
//! to schedule). It never touches the transport or the clock, which keeps
//! every rule testable without a socket.

pub mod control;

use std::time::Duration;

use tmi_proto::{RawMessage, command, ctcp};
use tracing::{debug, trace};

use self::control::ControlPayload;
use crate::event::Event;
use crate::servers::ServerAddr;
use crate::state::UserStore;

/// Sender of room-state and user-metadata lines.
pub const CONTROL_ACTOR: &str = "jtv";
/// Sender of subscription announcements.
pub const NOTIFY_ACTOR: &str = "twitchnotify";
/// Prefix used by the server for its own notices.
pub const SERVER_IDENTITY: &str = "tmi.twitch.tv";
/// Notice text sent when credentials are rejected.
pub const LOGIN_FAILURE: &str = "Login unsuccessful";
/// Protocol level requested once the welcome completes.
pub const CAPABILITY_LEVEL: &str = "3";
/// Delay between consecutive configured channel joins.
pub const JOIN_STAGGER: Duration = Duration::from_millis(3000);

/// Side effect requested by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyAction {
    /// Write a frame now.
    Send(RawMessage),
    /// Join `channel` after `delay`.
    ScheduleJoin { channel: String, delay: Duration },
}

/// Outcome of classifying one line.
#[derive(Debug, Default, PartialEq)]
pub struct Classification {
    pub events: Vec<Event>,
    pub actions: Vec<ClassifyAction>,
}

impl Classification {
    fn event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn action(&mut self, action: ClassifyAction) {
        self.actions.push(action);
    }
}

/// Offsets at which the configured channels are joined.
pub fn join_schedule(channels: &[String]) -> Vec<(String, Duration)> {
    channels
        .iter()
        .zip(0u32..)
        .map(|(channel, index)| (channel.clone(), JOIN_STAGGER * index))
        .collect()
}

/// Stateless interpreter for one session's inbound lines.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    channels: Vec<String>,
    remote: ServerAddr,
}

impl Classifier {
    /// `channels` are joined in order once registration completes.
    pub fn new(channels: Vec<String>) -> Self {
        Self {
            channels,
            remote: ServerAddr::default(),
        }
    }

    /// Record the address of the open transport for `connected` events.
    pub fn set_remote(&mut self, remote: ServerAddr) {
        self.remote = remote;
    }

    pub fn classify(&self, msg: &RawMessage, users: &mut UserStore) -> Classification {
        let mut out = Classification::default();

        if msg.is_numeric() {
            trace!(code = %msg.command, text = msg.param(1).unwrap_or_default(), "Numeric reply");
        }

        match msg.command.as_str() {
            command::PING => {
                out.event(Event::Ping);
                out.action(ClassifyAction::Send(RawMessage::pong(msg.params.clone())));
            }
            command::PONG => out.event(Event::Pong),
            command::RPL_ENDOFMOTD => self.on_registered(&mut out),
            command::JOIN | command::PART => on_membership(msg, &mut out),
            command::NOTICE => on_notice(msg, &mut out),
            command::PRIVMSG => on_privmsg(msg, users, &mut out),
            other => trace!(command = other, "Ignoring line"),
        }

        out
    }

    fn on_registered(&self, out: &mut Classification) {
        out.event(Event::Connected {
            host: self.remote.host.clone(),
            port: self.remote.port,
        });
        out.action(ClassifyAction::Send(RawMessage::new(
            command::TWITCHCLIENT,
            vec![CAPABILITY_LEVEL.to_string()],
        )));
        for (channel, delay) in join_schedule(&self.channels) {
            out.action(ClassifyAction::ScheduleJoin { channel, delay });
        }
    }
}

fn on_membership(msg: &RawMessage, out: &mut Classification) {
    let (Some(channel), Some(nick)) = (msg.param(0), msg.source_nickname()) else {
        debug!(line = %msg, "Membership line without channel or source");
        return;
    };
    let channel = channel.to_string();
    let username = nick.to_lowercase();
    if msg.command == command::JOIN {
        out.event(Event::Join { channel, username });
    } else {
        out.event(Event::Part { channel, username });
    }
}

fn on_notice(msg: &RawMessage, out: &mut Classification) {
    if msg.prefix.as_deref() == Some(SERVER_IDENTITY) && msg.param(1) == Some(LOGIN_FAILURE) {
        out.event(Event::Disconnected {
            reason: LOGIN_FAILURE.to_string(),
        });
    }
}

fn on_privmsg(msg: &RawMessage, users: &mut UserStore, out: &mut Classification) {
    let Some(channel) = msg.param(0) else {
        debug!(line = %msg, "PRIVMSG without target");
        return;
    };
    let text = msg.param(1).unwrap_or_default();

    match msg.sender() {
        Some(CONTROL_ACTOR) => {
            out.event(Event::Jtv {
                params: msg.params.clone(),
            });
            let payload = ControlPayload::new(channel, text);
            match control::classify_control(&payload, users) {
                Some(events) => out.events.extend(events),
                None => debug!(channel, message = text, "Unhandled message from control service"),
            }
        }
        Some(NOTIFY_ACTOR) => {
            out.event(Event::TwitchNotify {
                channel: channel.to_string(),
                message: text.to_string(),
            });
            out.events
                .extend(control::classify_notification(channel, text));
        }
        _ => {
            let Some(nick) = msg.source_nickname() else {
                debug!(line = %msg, "Chat line without source");
                return;
            };
            let user = users.attach(channel, &nick.to_lowercase());
            let channel = channel.to_string();
            match ctcp::strip_action(text) {
                Some(action) => out.event(Event::Action {
                    channel,
                    user,
                    message: action.to_string(),
                }),
                None => out.event(Event::Chat {
                    channel,
                    user,
                    message: text.to_string(),
                }),
            }
        }
    }
}
