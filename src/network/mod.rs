//! Network layer: transport establishment, the session driver and the
//! caller-facing handle.

mod connector;
mod handle;
mod session;

pub use connector::{Connector, TcpConnector};
pub use handle::{
    DEFAULT_COMMERCIAL_SECS, DEFAULT_SLOW_SECS, DEFAULT_TIMEOUT_SECS, SessionCommand,
    SessionHandle,
};
pub use session::{RECONNECT_DELAY, Session};

use tokio::task::JoinHandle;

use crate::config::Config;

/// Start a TCP session on the current runtime.
pub fn connect(config: Config) -> (SessionHandle, JoinHandle<()>) {
    let (session, handle) = Session::new(config, TcpConnector::new());
    (handle, session.spawn())
}
