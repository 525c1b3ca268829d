//! Channel name detection.
//!
//! Clients only need to tell a channel target from a nick target, so this is
//! a prefix check rather than full validation.

/// Extension trait telling channel names apart from nicknames.
pub trait ChannelExt {
    /// True when the string starts with one of the RFC 2812 channel prefixes.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        matches!(self.as_bytes().first(), Some(b'#' | b'&' | b'+' | b'!'))
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_prefixes() {
        assert!("#rust".is_channel_name());
        assert!("&local".is_channel_name());
        assert!("+modeless".is_channel_name());
        assert!("!12345chan".is_channel_name());
    }

    #[test]
    fn test_nicknames_are_not_channels() {
        assert!(!"alice".is_channel_name());
        assert!(!"".is_channel_name());
        assert!(!"[bot]".is_channel_name());
    }
}
