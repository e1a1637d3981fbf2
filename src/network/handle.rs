//! Caller-facing command surface of a running session.

use tmi_proto::{ChannelExt, RawMessage};
use tokio::sync::{mpsc, watch};

use crate::bus::{EventBus, Subscription};
use crate::error::ClientError;
use crate::state::ConnectionState;

/// Default `.timeout` length in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 300;
/// Default `.slow` interval in seconds.
pub const DEFAULT_SLOW_SECS: u32 = 300;
/// Default `.commercial` length in seconds.
pub const DEFAULT_COMMERCIAL_SECS: u32 = 30;

/// Work queued for the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Join a channel (normalized on execution).
    Join(String),
    /// Leave a channel (normalized on execution).
    Part(String),
    /// Write a prepared frame.
    Send(RawMessage),
    /// Close the transport and end the session without reconnecting.
    Disconnect,
}

/// Cloneable handle to a session.
///
/// Every method only queues work; failures on the wire surface as events.
/// `Err(ClientError::SessionClosed)` means the session task is gone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    bus: EventBus,
    state: watch::Receiver<ConnectionState>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<SessionCommand>,
        bus: EventBus,
        state: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self {
            commands,
            bus,
            state,
        }
    }

    fn submit(&self, command: SessionCommand) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::SessionClosed)
    }

    /// Subscribe to this session's events.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    /// The session's event bus.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state changes.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    // ---- membership ----

    pub fn join(&self, channel: &str) -> Result<(), ClientError> {
        self.submit(SessionCommand::Join(channel.to_string()))
    }

    pub fn part(&self, channel: &str) -> Result<(), ClientError> {
        self.submit(SessionCommand::Part(channel.to_string()))
    }

    // ---- messaging ----

    /// `PRIVMSG <channel> :<message>`
    pub fn say(&self, channel: &str, message: &str) -> Result<(), ClientError> {
        self.submit(SessionCommand::Send(RawMessage::privmsg(
            &channel.to_channel_name(),
            message,
        )))
    }

    /// Bare keep-alive `PING`.
    pub fn ping(&self) -> Result<(), ClientError> {
        self.submit(SessionCommand::Send(RawMessage::ping()))
    }

    /// Write an arbitrary line. Unparseable text is rejected as a `PRIVMSG`
    /// would be: silently, with a debug log in the session.
    pub fn raw(&self, line: &str) -> Result<(), ClientError> {
        match line.parse::<RawMessage>() {
            Ok(frame) => self.submit(SessionCommand::Send(frame)),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping unparseable raw line");
                Ok(())
            }
        }
    }

    // ---- moderation ----

    fn moderate(&self, channel: &str, action: &str, args: &[&str]) -> Result<(), ClientError> {
        let mut text = format!(".{action}");
        for arg in args {
            text.push(' ');
            text.push_str(arg);
        }
        self.say(channel, &text)
    }

    pub fn host(&self, channel: &str, target: &str) -> Result<(), ClientError> {
        self.moderate(channel, "host", &[target])
    }

    pub fn unhost(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "unhost", &[])
    }

    /// `.timeout <username> <seconds>`; 300 seconds when `None`.
    pub fn timeout(
        &self,
        channel: &str,
        username: &str,
        seconds: Option<u32>,
    ) -> Result<(), ClientError> {
        let seconds = seconds.unwrap_or(DEFAULT_TIMEOUT_SECS).to_string();
        self.moderate(channel, "timeout", &[username, seconds.as_str()])
    }

    pub fn ban(&self, channel: &str, username: &str) -> Result<(), ClientError> {
        self.moderate(channel, "ban", &[username])
    }

    pub fn unban(&self, channel: &str, username: &str) -> Result<(), ClientError> {
        self.moderate(channel, "unban", &[username])
    }

    /// `.slow <seconds>`; 300 seconds when `None`.
    pub fn slow(&self, channel: &str, seconds: Option<u32>) -> Result<(), ClientError> {
        let seconds = seconds.unwrap_or(DEFAULT_SLOW_SECS).to_string();
        self.moderate(channel, "slow", &[seconds.as_str()])
    }

    pub fn slowoff(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "slowoff", &[])
    }

    pub fn subscribers(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "subscribers", &[])
    }

    pub fn subscribersoff(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "subscribersoff", &[])
    }

    pub fn clear(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "clear", &[])
    }

    pub fn r9kbeta(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "r9kbeta", &[])
    }

    pub fn r9kbetaoff(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "r9kbetaoff", &[])
    }

    /// `.mod <username>`
    pub fn mod_user(&self, channel: &str, username: &str) -> Result<(), ClientError> {
        self.moderate(channel, "mod", &[username])
    }

    /// `.unmod <username>`
    pub fn unmod_user(&self, channel: &str, username: &str) -> Result<(), ClientError> {
        self.moderate(channel, "unmod", &[username])
    }

    /// `.commercial <seconds>`; 30 seconds when `None`.
    pub fn commercial(&self, channel: &str, seconds: Option<u32>) -> Result<(), ClientError> {
        let seconds = seconds.unwrap_or(DEFAULT_COMMERCIAL_SECS).to_string();
        self.moderate(channel, "commercial", &[seconds.as_str()])
    }

    /// Ask for the moderator list; the answer arrives as a `mods` event.
    pub fn mods(&self, channel: &str) -> Result<(), ClientError> {
        self.moderate(channel, "mods", &[])
    }

    // ---- lifecycle ----

    /// End the session without reconnecting.
    pub fn disconnect(&self) -> Result<(), ClientError> {
        self.submit(SessionCommand::Disconnect)
    }
}
