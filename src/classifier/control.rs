//! Control-service and notification-service rules.
//!
//! Control lines arrive as chat from a reserved sender and carry room state
//! changes and per-user metadata in their text. [`CONTROL_RULES`] is checked
//! top to bottom and the first matching rule wins.

use tracing::debug;

use crate::event::{Event, LimitationCode, PermissionCode};
use crate::state::UserStore;

pub const SUBSCRIBERS_ON: &str = "This room is now in subscribers-only mode.";
pub const SUBSCRIBERS_OFF: &str = "This room is no longer in subscribers-only mode.";
pub const SLOW_ON: &str = "This room is now in slow mode.";
pub const SLOW_OFF: &str = "This room is no longer in slow mode.";
pub const R9K_ON: &str = "This room is now in r9k mode. See http://bit.ly/bGtBDf";
pub const R9K_OFF: &str = "This room is no longer in r9k mode.";
pub const HOSTED_MARKER: &str = "is now hosting you for";
pub const MODS_MARKER: &str = "The moderators of this room are:";
pub const HOST_LIMIT: &str = "Host target cannot be changed more than three times per 30 minutes.";
pub const UNAUTHORIZED_JOIN: &str = "UNAUTHORIZED JOIN";
pub const NO_PERMISSION: &str = "You don't have permission to do this.";
pub const NO_TIMEOUT_PERMISSION: &str = "You don't have permission to timeout people in this room.";
pub const OWNER_ONLY_MARKER: &str = "Only the owner of this channel can use";
pub const SUBSCRIBED_MARKER: &str = "just subscribed!";

/// One control line, pre-split.
#[derive(Debug)]
pub struct ControlPayload<'a> {
    /// First parameter; normally the channel.
    pub target: &'a str,
    /// Second parameter, or empty when absent.
    pub text: &'a str,
    /// `text` split on whitespace.
    pub tokens: Vec<&'a str>,
}

impl<'a> ControlPayload<'a> {
    pub fn new(target: &'a str, text: &'a str) -> Self {
        Self {
            target,
            text,
            tokens: text.split_whitespace().collect(),
        }
    }

    fn keyword(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    fn token(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// Operands of `KEYWORD <username> <value>`; missing ones are empty.
    fn user_value(&self) -> (&'a str, &'a str) {
        (
            self.token(1).unwrap_or_default(),
            self.token(2).unwrap_or_default(),
        )
    }
}

type Matcher = fn(&ControlPayload<'_>) -> bool;
type Handler = fn(&ControlPayload<'_>, &mut UserStore) -> Vec<Event>;

/// A named predicate/handler pair.
pub struct ControlRule {
    pub name: &'static str,
    matches: Matcher,
    handle: Handler,
}

impl ControlRule {
    pub fn matches(&self, payload: &ControlPayload<'_>) -> bool {
        (self.matches)(payload)
    }
}

/// Ordered rule table.
pub static CONTROL_RULES: &[ControlRule] = &[
    ControlRule {
        name: "subscribers",
        matches: is_subscribers,
        handle: on_subscribers,
    },
    ControlRule {
        name: "slowmode-on",
        matches: is_slow_on,
        handle: on_slow_on,
    },
    ControlRule {
        name: "slowmode-off",
        matches: is_slow_off,
        handle: on_slow_off,
    },
    ControlRule {
        name: "r9kbeta",
        matches: is_r9k,
        handle: on_r9k,
    },
    ControlRule {
        name: "hosted",
        matches: is_hosted,
        handle: on_hosted,
    },
    ControlRule {
        name: "mods",
        matches: is_mods,
        handle: on_mods,
    },
    ControlRule {
        name: "limitation",
        matches: is_limitation,
        handle: on_limitation,
    },
    ControlRule {
        name: "permission",
        matches: is_permission,
        handle: on_permission,
    },
    ControlRule {
        name: "specialuser",
        matches: |p| p.keyword() == Some("SPECIALUSER"),
        handle: on_special_user,
    },
    ControlRule {
        name: "usercolor",
        matches: |p| p.keyword() == Some("USERCOLOR"),
        handle: on_user_color,
    },
    ControlRule {
        name: "emoteset",
        matches: |p| p.keyword() == Some("EMOTESET"),
        handle: on_emote_set,
    },
    ControlRule {
        name: "clearchat",
        matches: |p| p.keyword() == Some("CLEARCHAT"),
        handle: on_clearchat,
    },
    ControlRule {
        name: "roomban",
        matches: |p| p.keyword() == Some("ROOMBAN"),
        handle: |p, _| {
            vec![Event::RoomBan {
                channel: p.target.to_string(),
                username: p.token(1).unwrap_or_default().to_string(),
            }]
        },
    },
    ControlRule {
        name: "roomchanged",
        matches: |p| p.keyword() == Some("ROOMCHANGED"),
        handle: |p, _| {
            vec![Event::RoomChanged {
                channel: p.target.to_string(),
            }]
        },
    },
    ControlRule {
        name: "roomdeleted",
        matches: |p| p.keyword() == Some("ROOMDELETED"),
        handle: |p, _| {
            vec![Event::RoomDeleted {
                channel: p.target.to_string(),
            }]
        },
    },
    ControlRule {
        name: "roominvite",
        matches: |p| p.keyword() == Some("ROOMINVITE"),
        handle: |p, _| {
            vec![Event::RoomInvite {
                channel: p.target.to_string(),
                by: p.token(1).unwrap_or_default().to_string(),
            }]
        },
    },
    ControlRule {
        name: "historyend",
        matches: |p| p.keyword() == Some("HISTORYEND"),
        handle: |_, _| Vec::new(),
    },
    ControlRule {
        name: "hosttarget",
        matches: |p| p.keyword() == Some("HOSTTARGET"),
        handle: on_host_target,
    },
];

/// Run the rule table. `None` means no rule matched.
pub fn classify_control(payload: &ControlPayload<'_>, users: &mut UserStore) -> Option<Vec<Event>> {
    let rule = CONTROL_RULES.iter().find(|rule| rule.matches(payload))?;
    debug!(rule = rule.name, channel = payload.target, "Control message");
    Some((rule.handle)(payload, users))
}

/// Interpret a notification-service line. The passthrough event is emitted
/// by the caller.
pub fn classify_notification(channel: &str, text: &str) -> Vec<Event> {
    if text.contains(SUBSCRIBED_MARKER) {
        let username = text.split_whitespace().next().unwrap_or_default();
        return vec![Event::Subscription {
            channel: channel.to_string(),
            username: username.to_string(),
        }];
    }
    debug!(channel, message = text, "Unhandled message from notification service");
    Vec::new()
}

// ============================================================================
// Predicates
// ============================================================================

fn is_subscribers(p: &ControlPayload<'_>) -> bool {
    p.text == SUBSCRIBERS_ON || p.text == SUBSCRIBERS_OFF
}

fn is_slow_on(p: &ControlPayload<'_>) -> bool {
    p.text.contains(SLOW_ON)
}

fn is_slow_off(p: &ControlPayload<'_>) -> bool {
    p.text == SLOW_OFF
}

fn is_r9k(p: &ControlPayload<'_>) -> bool {
    p.text == R9K_ON || p.text == R9K_OFF
}

fn is_hosted(p: &ControlPayload<'_>) -> bool {
    p.target.contains(HOSTED_MARKER)
}

fn is_mods(p: &ControlPayload<'_>) -> bool {
    p.text.contains(MODS_MARKER)
}

fn is_limitation(p: &ControlPayload<'_>) -> bool {
    p.text == HOST_LIMIT || p.text == UNAUTHORIZED_JOIN
}

fn is_permission(p: &ControlPayload<'_>) -> bool {
    p.text == NO_PERMISSION || p.text == NO_TIMEOUT_PERMISSION || p.text.contains(OWNER_ONLY_MARKER)
}

// ============================================================================
// Handlers
// ============================================================================

fn on_subscribers(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    vec![Event::Subscriber {
        channel: p.target.to_string(),
        enabled: p.text == SUBSCRIBERS_ON,
    }]
}

fn on_slow_on(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    // "... You may send messages every <n> seconds."
    let length = p
        .tokens
        .len()
        .checked_sub(2)
        .and_then(|i| p.tokens[i].parse::<i64>().ok())
        .unwrap_or(-1);
    vec![Event::Slowmode {
        channel: p.target.to_string(),
        enabled: true,
        length,
    }]
}

fn on_slow_off(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    vec![Event::Slowmode {
        channel: p.target.to_string(),
        enabled: false,
        length: -1,
    }]
}

fn on_r9k(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    vec![Event::R9kBeta {
        channel: p.target.to_string(),
        enabled: p.text == R9K_ON,
    }]
}

fn on_hosted(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    // "<host> is now hosting you for <n> viewers" lives in the first param.
    let parts: Vec<&str> = p.target.split_whitespace().collect();
    vec![Event::Hosted {
        message: p.target.to_string(),
        host: parts.first().copied().unwrap_or_default().to_string(),
        viewers: parts.get(6).copied().unwrap_or_default().to_string(),
    }]
}

fn on_mods(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    let list = p.text.split_once(':').map_or("", |(_, rest)| rest);
    let mods = list
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    vec![Event::Mods {
        channel: p.target.to_string(),
        mods,
    }]
}

fn on_limitation(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    vec![Event::Limitation {
        message: p.text.to_string(),
        code: LimitationCode::CannotHost,
    }]
}

fn on_permission(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    let code = if p.text.contains(OWNER_ONLY_MARKER) {
        PermissionCode::OwnerOnly
    } else {
        PermissionCode::NoPermission
    };
    vec![Event::Permission {
        message: p.text.to_string(),
        code,
    }]
}

fn on_special_user(p: &ControlPayload<'_>, users: &mut UserStore) -> Vec<Event> {
    let (username, value) = p.user_value();
    users.apply_special_user(username, value);
    vec![Event::SpecialUser {
        username: username.to_string(),
        value: value.to_string(),
    }]
}

fn on_user_color(p: &ControlPayload<'_>, users: &mut UserStore) -> Vec<Event> {
    let (username, value) = p.user_value();
    users.apply_user_color(username, value);
    vec![Event::UserColor {
        username: username.to_string(),
        value: value.to_string(),
    }]
}

fn on_emote_set(p: &ControlPayload<'_>, users: &mut UserStore) -> Vec<Event> {
    let (username, value) = p.user_value();
    users.apply_emote_set(username, value);
    vec![Event::EmoteSet {
        username: username.to_string(),
        value: value.to_string(),
    }]
}

fn on_clearchat(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    let channel = p.target.to_string();
    match p.token(1) {
        Some(username) => vec![Event::Timeout {
            channel,
            username: username.to_string(),
        }],
        None => vec![Event::ClearChat { channel }],
    }
}

fn on_host_target(p: &ControlPayload<'_>, _: &mut UserStore) -> Vec<Event> {
    let channel = p.target.to_string();
    let remains = p.token(2).unwrap_or_default().to_string();
    match p.token(1) {
        Some("-") | None => vec![Event::Unhost { channel, remains }],
        Some(target) => vec![Event::Hosting {
            channel,
            target: target.to_string(),
            remains,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(target: &str, text: &str) -> (Option<Vec<Event>>, UserStore) {
        let mut users = UserStore::new();
        let events = classify_control(&ControlPayload::new(target, text), &mut users);
        (events, users)
    }

    fn single(target: &str, text: &str) -> Event {
        let (events, _) = run(target, text);
        let mut events = events.expect("a rule should match");
        assert_eq!(events.len(), 1, "{events:?}");
        events.remove(0)
    }

    #[test]
    fn test_subscribers_mode() {
        assert_eq!(
            single("#c", SUBSCRIBERS_ON),
            Event::Subscriber {
                channel: "#c".into(),
                enabled: true
            }
        );
        assert_eq!(
            single("#c", SUBSCRIBERS_OFF),
            Event::Subscriber {
                channel: "#c".into(),
                enabled: false
            }
        );
    }

    #[test]
    fn test_slowmode_length() {
        let on = single(
            "#c",
            "This room is now in slow mode. You may send messages every 120 seconds.",
        );
        assert_eq!(
            on,
            Event::Slowmode {
                channel: "#c".into(),
                enabled: true,
                length: 120
            }
        );

        let off = single("#c", SLOW_OFF);
        assert_eq!(
            off,
            Event::Slowmode {
                channel: "#c".into(),
                enabled: false,
                length: -1
            }
        );
    }

    #[test]
    fn test_slowmode_unparseable_length() {
        let Event::Slowmode { length, .. } = single("#c", SLOW_ON) else {
            panic!("expected slowmode");
        };
        assert_eq!(length, -1);
    }

    #[test]
    fn test_r9k() {
        assert_eq!(
            single("#c", R9K_ON),
            Event::R9kBeta {
                channel: "#c".into(),
                enabled: true
            }
        );
        assert_eq!(
            single("#c", R9K_OFF),
            Event::R9kBeta {
                channel: "#c".into(),
                enabled: false
            }
        );
    }

    #[test]
    fn test_hosted_reads_first_param() {
        let target = "somebody is now hosting you for 42 viewers";
        assert_eq!(
            single(target, ""),
            Event::Hosted {
                message: target.into(),
                host: "somebody".into(),
                viewers: "42".into()
            }
        );
    }

    #[test]
    fn test_mods_list() {
        let event = single("#c", "The moderators of this room are: Alice, bob ,CAROL");
        assert_eq!(
            event,
            Event::Mods {
                channel: "#c".into(),
                mods: vec!["alice".into(), "bob".into(), "carol".into()]
            }
        );

        let Event::Mods { mods, .. } = single("#c", "The moderators of this room are:") else {
            panic!("expected mods");
        };
        assert!(mods.is_empty());
    }

    #[test]
    fn test_limitation_and_permission_codes() {
        assert_eq!(
            single("#c", UNAUTHORIZED_JOIN),
            Event::Limitation {
                message: UNAUTHORIZED_JOIN.into(),
                code: LimitationCode::CannotHost
            }
        );
        let Event::Permission { code, .. } = single("#c", NO_TIMEOUT_PERMISSION) else {
            panic!("expected permission");
        };
        assert_eq!(code, PermissionCode::NoPermission);

        let Event::Permission { code, .. } =
            single("#c", "Only the owner of this channel can use /commercial.")
        else {
            panic!("expected permission");
        };
        assert_eq!(code, PermissionCode::OwnerOnly);
    }

    #[test]
    fn test_metadata_keywords_update_temp_record() {
        let mut users = UserStore::new();
        for line in [
            "SPECIALUSER bob subscriber",
            "USERCOLOR bob #0000FF",
            "EMOTESET bob [33,42]",
        ] {
            let events = classify_control(&ControlPayload::new("#c", line), &mut users).unwrap();
            assert_eq!(events.len(), 1);
        }
        let record = users.temp("bob").unwrap();
        assert_eq!(record.special, vec!["subscriber"]);
        assert_eq!(record.color, "#0000FF");
        assert_eq!(record.emote_set, "[33,42]");
    }

    #[test]
    fn test_metadata_with_missing_value_is_empty() {
        let (events, users) = run("#c", "SPECIALUSER bob");
        assert_eq!(
            events.unwrap(),
            vec![Event::SpecialUser {
                username: "bob".into(),
                value: String::new()
            }]
        );
        assert_eq!(users.temp("bob").unwrap().special, vec![String::new()]);

        let (events, users) = run("#c", "USERCOLOR bob");
        assert_eq!(
            events.unwrap(),
            vec![Event::UserColor {
                username: "bob".into(),
                value: String::new()
            }]
        );
        assert_eq!(users.temp("bob").unwrap().color, "");

        assert_eq!(
            single("#c", "EMOTESET"),
            Event::EmoteSet {
                username: String::new(),
                value: String::new()
            }
        );
    }

    #[test]
    fn test_clearchat_and_timeout() {
        assert_eq!(
            single("#c", "CLEARCHAT"),
            Event::ClearChat {
                channel: "#c".into()
            }
        );
        assert_eq!(
            single("#c", "CLEARCHAT bob"),
            Event::Timeout {
                channel: "#c".into(),
                username: "bob".into()
            }
        );
    }

    #[test]
    fn test_room_keywords() {
        assert_eq!(
            single("#c", "ROOMBAN bob"),
            Event::RoomBan {
                channel: "#c".into(),
                username: "bob".into()
            }
        );
        assert_eq!(single("#c", "ROOMCHANGED").kind(), "roomchanged");
        assert_eq!(single("#c", "ROOMDELETED").kind(), "roomdeleted");
        assert_eq!(
            single("#c", "ROOMINVITE alice"),
            Event::RoomInvite {
                channel: "#c".into(),
                by: "alice".into()
            }
        );
    }

    #[test]
    fn test_historyend_emits_nothing() {
        let (events, _) = run("#c", "HISTORYEND c");
        assert_eq!(events, Some(Vec::new()));
    }

    #[test]
    fn test_hosttarget() {
        assert_eq!(
            single("#c", "HOSTTARGET - 5"),
            Event::Unhost {
                channel: "#c".into(),
                remains: "5".into()
            }
        );
        assert_eq!(
            single("#c", "HOSTTARGET other 3"),
            Event::Hosting {
                channel: "#c".into(),
                target: "other".into(),
                remains: "3".into()
            }
        );
    }

    #[test]
    fn test_no_match() {
        let (events, _) = run("#c", "Something entirely new");
        assert!(events.is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // Exact subscriber text never reaches the keyword rules.
        let names: Vec<&str> = CONTROL_RULES
            .iter()
            .filter(|r| r.matches(&ControlPayload::new("#c", SUBSCRIBERS_ON)))
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["subscribers"]);
    }

    #[test]
    fn test_notification_subscription() {
        assert_eq!(
            classify_notification("#c", "bob just subscribed!"),
            vec![Event::Subscription {
                channel: "#c".into(),
                username: "bob".into()
            }]
        );
        assert!(classify_notification("#c", "something else").is_empty());
    }
}
