//! Scripted connector.
//!
//! Each connection attempt consumes the next [`Plan`]; once the script runs
//! out every attempt is refused. Accepted attempts hand the server end of an
//! in-memory pipe to the test through a channel.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tmi_client::Connector;
use tmi_client::servers::ServerAddr;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::FakeServer;

const PIPE_CAPACITY: usize = 16 * 1024;

/// What the next connection attempt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Plan {
    Refuse,
    Accept,
}

struct Inner {
    plan: VecDeque<Plan>,
    attempts: Vec<(ServerAddr, Instant)>,
    servers: mpsc::UnboundedSender<FakeServer>,
}

/// Connector driven by a fixed script.
#[derive(Clone)]
pub struct ScriptedConnector {
    inner: Arc<Mutex<Inner>>,
}

#[allow(dead_code)]
impl ScriptedConnector {
    pub fn new(
        plan: impl IntoIterator<Item = Plan>,
    ) -> (Self, mpsc::UnboundedReceiver<FakeServer>) {
        let (servers, accepted) = mpsc::unbounded_channel();
        let connector = Self {
            inner: Arc::new(Mutex::new(Inner {
                plan: plan.into_iter().collect(),
                attempts: Vec::new(),
                servers,
            })),
        };
        (connector, accepted)
    }

    /// Times of every connection attempt so far.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.inner.lock().attempts.iter().map(|(_, at)| *at).collect()
    }

    /// Addresses of every connection attempt so far.
    pub fn attempt_addrs(&self) -> Vec<ServerAddr> {
        self.inner
            .lock()
            .attempts
            .iter()
            .map(|(addr, _)| addr.clone())
            .collect()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Stream = DuplexStream;

    async fn connect(&self, addr: &ServerAddr) -> io::Result<DuplexStream> {
        let mut inner = self.inner.lock();
        inner.attempts.push((addr.clone(), Instant::now()));
        match inner.plan.pop_front().unwrap_or(Plan::Refuse) {
            Plan::Refuse => Err(io::Error::from(io::ErrorKind::ConnectionRefused)),
            Plan::Accept => {
                let (client, server) = tokio::io::duplex(PIPE_CAPACITY);
                let _ = inner.servers.send(FakeServer::new(server));
                Ok(client)
            }
        }
    }
}
