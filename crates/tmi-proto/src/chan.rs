//! Channel name utilities.

/// The channel marker every channel name starts with.
pub const CHANNEL_MARKER: char = '#';

/// Extension trait for channel names.
pub trait ChannelExt {
    /// Check if this string already carries the channel marker.
    fn is_channel_name(&self) -> bool;

    /// Normalize to the wire form: marker prefixed exactly once, lowercased.
    fn to_channel_name(&self) -> String;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        self.starts_with(CHANNEL_MARKER) && self.len() > 1
    }

    fn to_channel_name(&self) -> String {
        let lowered = self.to_lowercase();
        if lowered.starts_with(CHANNEL_MARKER) {
            lowered
        } else {
            format!("{CHANNEL_MARKER}{lowered}")
        }
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }

    fn to_channel_name(&self) -> String {
        self.as_str().to_channel_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_added_once() {
        assert_eq!("foo".to_channel_name(), "#foo");
        assert_eq!("#foo".to_channel_name(), "#foo");
    }

    #[test]
    fn test_lowercased() {
        assert_eq!("#SomeStreamer".to_channel_name(), "#somestreamer");
        assert_eq!(String::from("Caps").to_channel_name(), "#caps");
    }

    #[test]
    fn test_is_channel_name() {
        assert!("#foo".is_channel_name());
        assert!(!"foo".is_channel_name());
        assert!(!"#".is_channel_name());
    }
}
