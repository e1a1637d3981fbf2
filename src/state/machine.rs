//! Connection lifecycle state and reconnect budget.
//!
//! ```text
//! Disconnected ──► Connecting ──► Authenticating ──► Joining ──► Connected
//!       ▲              │                │               │            │
//!       │              └────────────────┴───────┬───────┴────────────┘
//!       │                                transport error
//!       │                                       ▼
//!       └──────── budget exhausted ────── Reconnecting ──► Connecting
//! ```

use std::fmt;

/// Where a session is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Authenticating,
    /// Registration frames sent; waiting for the end of the welcome.
    Joining,
    Connected,
    /// Waiting out the reconnect delay.
    Reconnecting,
}

impl ConnectionState {
    /// Whether a transport is open in this state.
    pub fn has_transport(self) -> bool {
        matches!(
            self,
            ConnectionState::Authenticating | ConnectionState::Joining | ConnectionState::Connected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Joining => "joining",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remaining reconnect attempts.
///
/// Never goes below zero. A finite budget that reaches zero refuses every
/// further attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: Option<u32>,
}

impl RetryBudget {
    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    pub fn finite(attempts: u32) -> Self {
        Self {
            remaining: Some(attempts),
        }
    }

    /// Build from the config value, where any negative number is unlimited.
    pub fn from_retries(retries: i64) -> Self {
        if retries < 0 {
            Self::unlimited()
        } else {
            Self::finite(u32::try_from(retries).unwrap_or(u32::MAX))
        }
    }

    /// Take one attempt from the budget. Returns `false` once exhausted.
    pub fn try_consume(&mut self) -> bool {
        match self.remaining {
            None => true,
            Some(0) => false,
            Some(ref mut n) => {
                *n -= 1;
                true
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_budget_allows_exactly_n() {
        let mut budget = RetryBudget::from_retries(3);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(budget.is_exhausted());
        assert!(!budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_zero_budget_refuses_immediately() {
        let mut budget = RetryBudget::from_retries(0);
        assert!(!budget.try_consume());
    }

    #[test]
    fn test_negative_is_unlimited() {
        let mut budget = RetryBudget::from_retries(-1);
        for _ in 0..10_000 {
            assert!(budget.try_consume());
        }
        assert!(!budget.is_exhausted());
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_transport_states() {
        assert!(!ConnectionState::Disconnected.has_transport());
        assert!(!ConnectionState::Reconnecting.has_transport());
        assert!(ConnectionState::Joining.has_transport());
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
