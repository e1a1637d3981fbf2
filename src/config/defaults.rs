//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use rand::Rng;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Options Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_channel_user_capacity() -> usize {
    5000
}

// =============================================================================
// Connection Defaults
// =============================================================================

pub fn default_server_type() -> String {
    "chat".to_string()
}

/// `-1` means unlimited.
pub fn default_retries() -> i64 {
    -1
}

// =============================================================================
// Guest Identity
// =============================================================================

/// Password accepted by the chat service for anonymous read-only logins.
pub const GUEST_PASSWORD: &str = "SCHMOOPIIE";

/// Nickname prefix for anonymous logins.
pub const GUEST_NICK_PREFIX: &str = "justinfan";

/// Generate a guest nickname: `justinfan` followed by 1000..=80999.
pub fn guest_nickname() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..=80999);
    format!("{GUEST_NICK_PREFIX}{suffix}")
}
