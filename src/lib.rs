//! tmi-client - event-driven client for the TMI chat protocol.
//!
//! A session connects to a chat server, logs in (or joins as an anonymous
//! guest), joins the configured channels and turns every inbound line into
//! typed [`Event`]s delivered through an [`EventBus`]. Control-service lines
//! update per-user metadata that is attached to the next chat line from that
//! user.
//!
//! ```no_run
//! use tmi_client::{Config, Event, network};
//!
//! # async fn demo() -> Result<(), tmi_client::ClientError> {
//! let config = Config::parse(r##"channels = ["#somechannel"]"##)?;
//! let (handle, _task) = network::connect(config);
//! let mut events = handle.subscribe();
//! while let Some(event) = events.recv().await {
//!     if let Event::Chat { channel, user, message } = event {
//!         println!("[{channel}] {}: {message}", user.username);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod classifier;
pub mod config;
pub mod error;
pub mod event;
pub mod network;
pub mod servers;
pub mod state;
pub mod store;
pub mod telemetry;

pub use bus::{EventBus, Subscription};
pub use config::Config;
pub use error::ClientError;
pub use event::{Event, LimitationCode, PermissionCode};
pub use network::{Connector, Session, SessionHandle, TcpConnector};
pub use state::{ConnectionState, UserRecord};
