//! tmi-client - command-line chat session.
//!
//! Connects with the given config file, logs every event, and keeps an event
//! log in the record store when `[store]` is configured.

use std::sync::Arc;
use std::time::Duration;

use tmi_client::config::{Config, validate};
use tmi_client::store::{RecordStore, SqliteStore};
use tmi_client::{Event, network, telemetry};
use tracing::{error, info, warn};

/// Collection the binary appends events to.
const EVENT_COLLECTION: &str = "events";

/// How long a disconnecting session gets to close its transport.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;

    let _log_guard = telemetry::init(&config.options)?;
    info!(path = %config_path, channels = config.channels.len(), "Starting tmi-client");

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s)",
            errors.len()
        ));
    }

    let store: Option<Arc<dyn RecordStore>> = match config.store {
        Some(ref store) => Some(Arc::new(SqliteStore::open(&store.path).await?)),
        None => None,
    };

    let (handle, mut session) = network::connect(config);
    let mut events = handle.subscribe();

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
            if let Some(ref store) = store {
                record_event(store.as_ref(), &event).await;
            }
            if matches!(event, Event::ConnectFail | Event::Crash { .. }) {
                break;
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, disconnecting");
            if let Err(e) = handle.disconnect() {
                warn!(error = %e, "Session already gone");
            }
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut session).await.is_err() {
                warn!("Session did not stop in time, aborting");
                session.abort();
            }
        }
        _ = &mut session => {}
    }

    printer.abort();
    info!("Shutdown complete");
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::Chat {
            channel,
            user,
            message,
        } => info!(%channel, user = %user.username, %message, "chat"),
        Event::Action {
            channel,
            user,
            message,
        } => info!(%channel, user = %user.username, %message, "action"),
        Event::Disconnected { reason } => warn!(%reason, "disconnected"),
        Event::ConnectFail => error!("Could not reconnect, giving up"),
        Event::Crash { message } => error!(%message, "crash"),
        other => info!(
            kind = other.kind(),
            channel = other.channel().unwrap_or_default(),
            actor = other.actor().unwrap_or_default(),
            "event"
        ),
    }
}

async fn record_event(store: &dyn RecordStore, event: &Event) {
    let value = match serde_json::to_value(event) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to serialize event");
            return;
        }
    };
    if let Err(e) = store.insert(EVENT_COLLECTION, value).await {
        warn!(error = %e, "Failed to record event");
    }
}
