//! Session driver.
//!
//! One task per session owns the transport, the classifier, the user store
//! and the retry budget. Inbound lines are classified in arrival order and
//! their events published before the next line is read.
//!
//! ```text
//!   ┌─────────────┐  connect   ┌──────────────┐  PASS/NICK/USER  ┌─────────┐
//!   │  Connector  ├───────────►│  Framed<S>   ├─────────────────►│ server  │
//!   └─────────────┘            └──────┬───────┘                  └─────────┘
//!                                     │ RawMessage
//!                                     ▼
//!   SessionHandle ──commands──► tokio::select! ──► Classifier ──► EventBus
//! ```

use std::any::Any;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tmi_proto::{ChannelExt, IrcCodec, ProtocolError, RawMessage, command};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, error, info, trace, warn};

use super::connector::Connector;
use super::handle::{SessionCommand, SessionHandle};
use crate::bus::EventBus;
use crate::classifier::{Classification, ClassifyAction, Classifier};
use crate::config::Config;
use crate::error::{CLOSED_BY_PEER, describe_io_error};
use crate::event::Event;
use crate::servers::{self, ServerAddr};
use crate::state::{ConnectionState, RetryBudget, UserStore};
use crate::telemetry::spans;

/// Wait between a transport error and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// How one connection ended.
enum Outcome {
    /// Caller asked to disconnect.
    Shutdown,
    /// Transport failed; the reason is already human-readable.
    TransportError(String),
}

/// Result type for the select - pure data, no I/O inside select.
enum SelectResult {
    Inbound(Option<Result<RawMessage, ProtocolError>>),
    Command(Option<SessionCommand>),
}

/// A client session over transports opened by `C`.
pub struct Session<C: Connector> {
    config: Config,
    connector: C,
    classifier: Classifier,
    users: UserStore,
    budget: RetryBudget,
    bus: EventBus,
    state: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    /// Feeds scheduled joins back into `commands`.
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl<C: Connector> Session<C> {
    pub fn new(config: Config, connector: C) -> (Self, SessionHandle) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(ConnectionState::Disconnected);
        let bus = EventBus::new();
        let handle = SessionHandle::new(command_tx.clone(), bus.clone(), state_rx);

        let session = Self {
            classifier: Classifier::new(config.channels.clone()),
            users: UserStore::with_channel_capacity(config.options.channel_user_capacity),
            budget: RetryBudget::from_retries(config.connection.retries),
            config,
            connector,
            bus,
            state,
            commands,
            command_tx,
        };
        (session, handle)
    }

    /// Run the session on its own task.
    ///
    /// A panic inside the session is published as a `crash` event. The
    /// returned handle completes once the session has ended either way.
    pub fn spawn(self) -> JoinHandle<()> {
        let bus = self.bus.clone();
        let task = tokio::spawn(self.run());
        tokio::spawn(async move {
            if let Err(e) = task.await
                && e.is_panic()
            {
                let message = panic_message(e.into_panic());
                error!(%message, "Session crashed");
                bus.publish(Event::Crash { message });
            }
        })
    }

    /// Drive the session until it is disconnected or gives up reconnecting.
    pub async fn run(mut self) {
        loop {
            match self.connect_once().await {
                Outcome::Shutdown => {
                    info!("Session closed by request");
                    break;
                }
                Outcome::TransportError(reason) => {
                    warn!(%reason, "Transport error");
                    self.bus.publish(Event::Disconnected { reason });

                    if !self.config.connection.reconnect {
                        info!("Reconnect disabled, ending session");
                        break;
                    }
                    if !self.budget.try_consume() {
                        warn!("Reconnect attempts exhausted");
                        self.bus.publish(Event::ConnectFail);
                        break;
                    }

                    self.set_state(ConnectionState::Reconnecting);
                    info!(
                        delay_ms = RECONNECT_DELAY.as_millis() as u64,
                        remaining = ?self.budget.remaining(),
                        "Reconnecting"
                    );
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    self.users.clear();
                    self.bus.publish(Event::Reconnect);
                }
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "State change");
        }
    }

    /// Drop commands queued while no transport was open. Returns `true` if
    /// one of them was a disconnect request.
    fn drain_stale_commands(&mut self) -> bool {
        while let Ok(command) = self.commands.try_recv() {
            if command == SessionCommand::Disconnect {
                return true;
            }
            warn!(?command, "No open transport, dropping command");
        }
        false
    }

    async fn connect_once(&mut self) -> Outcome {
        if self.drain_stale_commands() {
            return Outcome::Shutdown;
        }

        let conn = &self.config.connection;
        let addr = servers::select(
            &conn.server_type,
            conn.preferred_server.as_deref(),
            conn.preferred_port,
        );
        let span = spans::session(&addr.host, addr.port);
        self.serve(addr).instrument(span).await
    }

    async fn serve(&mut self, addr: ServerAddr) -> Outcome {
        self.set_state(ConnectionState::Connecting);
        info!("Connecting");

        let stream = match self.connector.connect(&addr).await {
            Ok(stream) => stream,
            Err(e) => return Outcome::TransportError(describe_io_error(&e)),
        };
        self.bus.publish(Event::Connecting {
            host: addr.host.clone(),
            port: addr.port,
        });
        self.classifier.set_remote(addr);

        let mut framed = Framed::new(stream, IrcCodec::new());

        self.set_state(ConnectionState::Authenticating);
        if let Err(reason) = self.authenticate(&mut framed).await {
            return Outcome::TransportError(reason);
        }
        self.set_state(ConnectionState::Joining);

        loop {
            let selected = tokio::select! {
                frame = framed.next() => SelectResult::Inbound(frame),
                command = self.commands.recv() => SelectResult::Command(command),
            };

            let step = match selected {
                SelectResult::Inbound(Some(Ok(msg))) => self.on_inbound(&mut framed, msg).await,
                SelectResult::Inbound(Some(Err(ProtocolError::Io(e)))) => {
                    Err(describe_io_error(&e))
                }
                SelectResult::Inbound(Some(Err(e))) => Err(e.to_string()),
                SelectResult::Inbound(None) => Err(CLOSED_BY_PEER.to_string()),
                SelectResult::Command(Some(SessionCommand::Disconnect))
                | SelectResult::Command(None) => {
                    if let Err(e) = framed.close().await {
                        debug!(error = %e, "Error closing transport");
                    }
                    return Outcome::Shutdown;
                }
                SelectResult::Command(Some(command)) => self.execute(&mut framed, command).await,
            };

            if let Err(reason) = step {
                return Outcome::TransportError(reason);
            }
        }
    }

    async fn authenticate<S>(&mut self, framed: &mut Framed<S, IrcCodec>) -> Result<(), String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let credentials = self.config.identity.credentials();
        info!(nickname = %credentials.nickname, "Logging in");
        self.bus.publish(Event::Logon);

        write_frame(framed, RawMessage::pass(&credentials.password)).await?;
        write_frame(framed, RawMessage::nick(&credentials.nickname)).await?;
        write_frame(framed, RawMessage::user(&credentials.nickname)).await
    }

    async fn on_inbound<S>(
        &mut self,
        framed: &mut Framed<S, IrcCodec>,
        msg: RawMessage,
    ) -> Result<(), String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        trace!(line = %msg, "Received");
        let Classification { events, actions } = self.classifier.classify(&msg, &mut self.users);

        for event in events {
            if let Event::Connected { .. } = event {
                info!("Registered");
                self.set_state(ConnectionState::Connected);
            }
            self.bus.publish(event);
        }

        for action in actions {
            match action {
                ClassifyAction::Send(frame) => write_frame(framed, frame).await?,
                ClassifyAction::ScheduleJoin { channel, delay } => self.schedule_join(channel, delay),
            }
        }
        Ok(())
    }

    async fn execute<S>(
        &mut self,
        framed: &mut Framed<S, IrcCodec>,
        command: SessionCommand,
    ) -> Result<(), String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let frame = match command {
            SessionCommand::Join(channel) => RawMessage::join(&channel.to_channel_name()),
            SessionCommand::Part(channel) => RawMessage::part(&channel.to_channel_name()),
            SessionCommand::Send(frame) => frame,
            SessionCommand::Disconnect => return Ok(()),
        };
        write_frame(framed, frame).await
    }

    /// Queue a join after `delay`. The timer is not tied to the connection:
    /// it fires even if the transport was replaced in the meantime.
    fn schedule_join(&self, channel: String, delay: Duration) {
        let tx = self.command_tx.clone();
        if delay.is_zero() {
            let _ = tx.send(SessionCommand::Join(channel));
            return;
        }
        debug!(%channel, delay_ms = delay.as_millis() as u64, "Scheduling join");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionCommand::Join(channel));
        });
    }
}

async fn write_frame<S>(framed: &mut Framed<S, IrcCodec>, frame: RawMessage) -> Result<(), String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if frame.command == command::PASS {
        trace!("Sending PASS ***");
    } else {
        trace!(line = %frame, "Sending");
    }

    match framed.send(frame).await {
        Ok(()) => Ok(()),
        Err(ProtocolError::Io(e)) => Err(describe_io_error(&e)),
        Err(e) => {
            warn!(error = %e, "Dropping outbound frame");
            Ok(())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "session task panicked".to_string()
    }
}
