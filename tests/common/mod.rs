//! Integration test common infrastructure.
//!
//! Provides a scripted connector that hands out in-memory transports, the
//! server end of those transports, and helpers for waiting on events.

pub mod connector;
pub mod server;

#[allow(unused_imports)]
pub use connector::{Plan, ScriptedConnector};
#[allow(unused_imports)]
pub use server::FakeServer;

use std::time::Duration;

use tmi_client::config::Config;
use tmi_client::{Event, Subscription};
use tokio::time::timeout;

/// Upper bound for any single wait. Generous because paused-clock tests
/// advance virtual time in multi-second steps.
pub const WAIT: Duration = Duration::from_secs(60);

/// Config pointing at a fixed host so connection events are deterministic.
#[allow(dead_code)]
pub fn test_config(channels: &[&str]) -> Config {
    let mut config = Config::default();
    config.channels = channels.iter().map(|c| c.to_string()).collect();
    config.connection.preferred_server = Some("irc.test".to_string());
    config.connection.preferred_port = Some(6667);
    config
}

/// Next event, failing the test if none arrives in time.
#[allow(dead_code)]
pub async fn next_event(events: &mut Subscription) -> Event {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event bus closed")
}

/// Skip events until one of `kind` arrives.
#[allow(dead_code)]
pub async fn wait_for(events: &mut Subscription, kind: &str) -> Event {
    loop {
        let event = next_event(events).await;
        if event.kind() == kind {
            return event;
        }
    }
}
