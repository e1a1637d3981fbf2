//! Chat server address lists and selection.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Port used when none (or an unsupported one) is configured.
pub const DEFAULT_PORT: u16 = 443;

/// Ports the server lists are published for.
pub const LIST_PORTS: [u16; 2] = [80, 443];

const CHAT_SERVERS: &[&str] = &[
    "199.9.250.229",
    "199.9.250.239",
    "199.9.252.120",
    "199.9.252.28",
    "199.9.253.165",
    "199.9.253.199",
    "199.9.253.210",
];

const EVENT_SERVERS: &[&str] = &["199.9.250.117", "199.9.251.213", "199.9.252.26"];

const GROUP_SERVERS: &[&str] = &["199.9.248.232", "199.9.248.248"];

/// Server cluster to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerType {
    #[default]
    Chat,
    Events,
    Groups,
}

impl ServerType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "chat" => Some(ServerType::Chat),
            "events" => Some(ServerType::Events),
            "groups" => Some(ServerType::Groups),
            _ => None,
        }
    }

    /// Addresses of this cluster. Both list ports carry the same hosts.
    pub fn addresses(self) -> &'static [&'static str] {
        match self {
            ServerType::Chat => CHAT_SERVERS,
            ServerType::Events => EVENT_SERVERS,
            ServerType::Groups => GROUP_SERVERS,
        }
    }
}

/// A host and port to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
}

impl ServerAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Pick the address for the next connection attempt.
///
/// A preferred server wins outright (port defaults to 443, unchecked).
/// Otherwise an unknown type falls back to `chat`, a port other than 80/443
/// falls back to 443, and a random host of the list is chosen.
pub fn select(
    server_type: &str,
    preferred_server: Option<&str>,
    preferred_port: Option<u16>,
) -> ServerAddr {
    select_with(
        server_type,
        preferred_server,
        preferred_port,
        &mut rand::thread_rng(),
    )
}

/// [`select`] with a caller-supplied RNG.
pub fn select_with<R: Rng + ?Sized>(
    server_type: &str,
    preferred_server: Option<&str>,
    preferred_port: Option<u16>,
    rng: &mut R,
) -> ServerAddr {
    if let Some(host) = preferred_server.filter(|h| !h.is_empty()) {
        return ServerAddr::new(host, preferred_port.unwrap_or(DEFAULT_PORT));
    }

    let kind = ServerType::from_name(server_type).unwrap_or_else(|| {
        debug!(server_type, "Unknown server type, using chat");
        ServerType::Chat
    });
    let port = preferred_port
        .filter(|p| LIST_PORTS.contains(p))
        .unwrap_or(DEFAULT_PORT);

    // Lists are static and non-empty.
    let host = kind.addresses().choose(rng).copied().unwrap_or(CHAT_SERVERS[0]);
    ServerAddr::new(host, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_preferred_server_wins() {
        let addr = select("groups", Some("irc.example.net"), None);
        assert_eq!(addr, ServerAddr::new("irc.example.net", 443));

        let addr = select("chat", Some("10.0.0.1"), Some(6667));
        assert_eq!(addr.to_string(), "10.0.0.1:6667");
    }

    #[test]
    fn test_unknown_type_and_port_fall_back() {
        let addr = select("nonsense", None, Some(6667));
        assert_eq!(addr.port, 443);
        assert!(CHAT_SERVERS.contains(&addr.host.as_str()));
    }

    #[test]
    fn test_port_80_kept() {
        let addr = select("events", None, Some(80));
        assert_eq!(addr.port, 80);
        assert!(EVENT_SERVERS.contains(&addr.host.as_str()));
    }

    #[test]
    fn test_every_host_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<String> = (0..500)
            .map(|_| select_with("groups", None, None, &mut rng).host)
            .collect();
        assert_eq!(seen.len(), GROUP_SERVERS.len());
    }
}
