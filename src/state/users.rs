//! Per-session user metadata.
//!
//! The control service announces a user's badges, colour and emote set in
//! separate lines *before* that user's chat line. Those announcements build a
//! temporary record keyed by username; the next chat line from the user moves
//! it into the channel's table. A chat line never waits for metadata: with no
//! temp record a default one is created on the spot.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Colour assigned until the control service announces one.
pub const DEFAULT_COLOR: &str = "#696969";

/// Default per-channel record cap.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 5000;

/// Metadata attached to a chat sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub username: String,
    /// Badge names in arrival order (duplicates kept).
    pub special: Vec<String>,
    pub color: String,
    pub emote_set: String,
}

impl UserRecord {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            special: Vec::new(),
            color: DEFAULT_COLOR.to_string(),
            emote_set: String::new(),
        }
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.special.iter().any(|b| b == badge)
    }
}

/// Records attached to one channel, with an LRU index for eviction.
#[derive(Debug, Default)]
struct ChannelUsers {
    records: HashMap<String, (u64, UserRecord)>,
    recency: BTreeMap<u64, String>,
}

impl ChannelUsers {
    fn insert(&mut self, tick: u64, record: UserRecord, capacity: usize) {
        if let Some((old_tick, _)) = self.records.remove(&record.username) {
            self.recency.remove(&old_tick);
        }
        self.recency.insert(tick, record.username.clone());
        self.records.insert(record.username.clone(), (tick, record));

        while self.records.len() > capacity {
            let Some((_, evicted)) = self.recency.pop_first() else {
                break;
            };
            self.records.remove(&evicted);
        }
    }
}

/// Temp and per-channel user records owned by one session.
#[derive(Debug)]
pub struct UserStore {
    temp: HashMap<String, UserRecord>,
    channels: HashMap<String, ChannelUsers>,
    capacity: usize,
    tick: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Cap each channel at `capacity` records (minimum 1).
    pub fn with_channel_capacity(capacity: usize) -> Self {
        Self {
            temp: HashMap::new(),
            channels: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    /// Get or create the temp record for `username`.
    pub fn create(&mut self, username: &str) -> &mut UserRecord {
        self.temp
            .entry(username.to_string())
            .or_insert_with(|| UserRecord::new(username))
    }

    /// Append a badge to the temp record.
    pub fn apply_special_user(&mut self, username: &str, badge: &str) {
        self.create(username).special.push(badge.to_string());
    }

    /// Set the colour on the temp record.
    pub fn apply_user_color(&mut self, username: &str, color: &str) {
        self.create(username).color = color.to_string();
    }

    /// Set the emote set on the temp record.
    pub fn apply_emote_set(&mut self, username: &str, emote_set: &str) {
        self.create(username).emote_set = emote_set.to_string();
    }

    /// Move the temp record for `username` into `channel`, replacing any
    /// record already there, and return it.
    ///
    /// A missing temp record is created first, so the result always has
    /// defaults at minimum. The temp record is gone afterwards.
    pub fn attach(&mut self, channel: &str, username: &str) -> UserRecord {
        let record = self
            .temp
            .remove(username)
            .unwrap_or_else(|| UserRecord::new(username));

        self.tick += 1;
        self.channels.entry(channel.to_string()).or_default().insert(
            self.tick,
            record.clone(),
            self.capacity,
        );
        record
    }

    pub fn lookup(&self, channel: &str, username: &str) -> Option<&UserRecord> {
        self.channels
            .get(channel)?
            .records
            .get(username)
            .map(|(_, record)| record)
    }

    pub fn temp(&self, username: &str) -> Option<&UserRecord> {
        self.temp.get(username)
    }

    /// Number of records attached to `channel`.
    pub fn channel_len(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |c| c.records.len())
    }

    /// Drop every temp and channel record.
    pub fn clear(&mut self) {
        self.temp.clear();
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_accumulates_then_attaches() {
        let mut users = UserStore::new();
        users.apply_special_user("bob", "subscriber");
        users.apply_special_user("bob", "turbo");
        users.apply_user_color("bob", "#FF0000");
        users.apply_emote_set("bob", "[1,2]");

        let record = users.attach("#room", "bob");
        assert_eq!(record.special, vec!["subscriber", "turbo"]);
        assert_eq!(record.color, "#FF0000");
        assert_eq!(record.emote_set, "[1,2]");
        assert!(record.has_badge("turbo"));

        assert!(users.temp("bob").is_none());
        assert_eq!(users.lookup("#room", "bob"), Some(&record));
    }

    #[test]
    fn test_attach_without_metadata_uses_defaults() {
        let mut users = UserStore::new();
        let record = users.attach("#room", "alice");
        assert_eq!(record, UserRecord::new("alice"));
        assert_eq!(record.color, DEFAULT_COLOR);
        assert!(record.special.is_empty());
    }

    #[test]
    fn test_attach_replaces_previous_channel_record() {
        let mut users = UserStore::new();
        users.apply_user_color("bob", "#00FF00");
        users.attach("#room", "bob");

        // Second chat line with no new metadata resets to defaults.
        let second = users.attach("#room", "bob");
        assert_eq!(second.color, DEFAULT_COLOR);
        assert_eq!(users.lookup("#room", "bob").unwrap().color, DEFAULT_COLOR);
        assert_eq!(users.channel_len("#room"), 1);
    }

    #[test]
    fn test_duplicate_badges_kept() {
        let mut users = UserStore::new();
        users.apply_special_user("bob", "mod");
        users.apply_special_user("bob", "mod");
        assert_eq!(users.temp("bob").unwrap().special, vec!["mod", "mod"]);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut users = UserStore::new();
        users.apply_user_color("bob", "#123456");
        users.attach("#a", "bob");
        users.attach("#b", "bob");
        assert_eq!(users.lookup("#a", "bob").unwrap().color, "#123456");
        assert_eq!(users.lookup("#b", "bob").unwrap().color, DEFAULT_COLOR);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut users = UserStore::with_channel_capacity(2);
        users.attach("#room", "a");
        users.attach("#room", "b");
        // Touch "a" so "b" becomes the oldest.
        users.attach("#room", "a");
        users.attach("#room", "c");

        assert_eq!(users.channel_len("#room"), 2);
        assert!(users.lookup("#room", "a").is_some());
        assert!(users.lookup("#room", "b").is_none());
        assert!(users.lookup("#room", "c").is_some());
    }

    #[test]
    fn test_clear() {
        let mut users = UserStore::new();
        users.create("pending");
        users.attach("#room", "bob");
        users.clear();
        assert!(users.temp("pending").is_none());
        assert!(users.lookup("#room", "bob").is_none());
    }
}
