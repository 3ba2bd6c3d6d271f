//! Per-community automod configuration

use crate::automod::action::ActionKind;
use crate::automod::error::ValidationError;
use crate::automod::gateway::{ChannelId, CommunityId};
use serde::{Deserialize, Serialize};

/// Automod configuration for one community.
///
/// Created on the first configuration write and owned by the settings
/// store; the engine passes it around by value and never assumes the
/// in-memory copy is shared across concurrent requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomodConfig {
    pub community_id: CommunityId,
    /// Strike threshold. `None` means the strike feature is off.
    pub max_strikes: Option<u32>,
    /// Action taken once the threshold is crossed
    pub action: Option<ActionKind>,
    /// When true, infractions by privileged members are also counted
    /// and enforced
    pub debug_enabled: bool,
    /// Destination channel for enforcement notices
    pub log_channel_id: Option<ChannelId>,
}

impl AutomodConfig {
    /// Fresh configuration for a community: strike feature off, no
    /// action, privileged members exempt.
    #[must_use]
    pub fn new(community_id: CommunityId) -> Self {
        Self {
            community_id,
            max_strikes: None,
            action: None,
            debug_enabled: false,
            log_channel_id: None,
        }
    }

    /// Set the strike threshold. Zero is rejected before any store
    /// write.
    pub fn set_max_strikes(&mut self, max_strikes: u32) -> Result<(), ValidationError> {
        if max_strikes == 0 {
            return Err(ValidationError::ZeroStrikes);
        }
        self.max_strikes = Some(max_strikes);
        Ok(())
    }

    /// Upholds the stored invariant `max_strikes >= 1`. Guards against
    /// hand-edited settings files.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_strikes == Some(0) {
            return Err(ValidationError::ZeroStrikes);
        }
        Ok(())
    }

    /// Read-only snapshot for the configuration surface
    #[must_use]
    pub fn status(&self) -> AutomodStatus {
        AutomodStatus {
            max_strikes: self.max_strikes,
            action: self.action,
            debug_enabled: self.debug_enabled,
            log_channel_id: self.log_channel_id,
        }
    }
}

/// Snapshot of a community's automod configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomodStatus {
    pub max_strikes: Option<u32>,
    pub action: Option<ActionKind>,
    pub debug_enabled: bool,
    pub log_channel_id: Option<ChannelId>,
}

impl std::fmt::Display for AutomodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strikes = self
            .max_strikes
            .map_or_else(|| "NA".to_string(), |n| n.to_string());
        let action = self
            .action
            .map_or_else(|| "NA".to_string(), |a| a.to_string());
        write!(
            f,
            "Max Strikes: {strikes}. Action: {action}. Debug: {}. Log Channel: {}.",
            if self.debug_enabled { "ON" } else { "OFF" },
            self.log_channel_id
                .map_or_else(|| "Not Configured".to_string(), |c| c.to_string()),
        )
    }
}

/// Parse an `on`/`off` token, case insensitive
pub fn parse_toggle(input: &str) -> Result<bool, ValidationError> {
    match input.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(ValidationError::UnknownToggle(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_feature_off() {
        let config = AutomodConfig::new(12345);
        assert_eq!(config.community_id, 12345);
        assert_eq!(config.max_strikes, None);
        assert_eq!(config.action, None);
        assert!(!config.debug_enabled);
        assert!(config.log_channel_id.is_none());
    }

    #[test]
    fn test_zero_strikes_rejected() {
        let mut config = AutomodConfig::new(1);
        assert_eq!(
            config.set_max_strikes(0),
            Err(ValidationError::ZeroStrikes)
        );
        assert_eq!(config.max_strikes, None);

        config.set_max_strikes(1).unwrap();
        assert_eq!(config.max_strikes, Some(1));
    }

    #[test]
    fn test_validate_catches_stored_zero() {
        let mut config = AutomodConfig::new(1);
        assert!(config.validate().is_ok());
        config.max_strikes = Some(0);
        assert_eq!(config.validate(), Err(ValidationError::ZeroStrikes));
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("on"), Ok(true));
        assert_eq!(parse_toggle("OFF"), Ok(false));
        assert_eq!(
            parse_toggle("maybe"),
            Err(ValidationError::UnknownToggle("maybe".to_string()))
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = AutomodConfig {
            community_id: 12345,
            max_strikes: Some(5),
            action: Some(ActionKind::Mute),
            debug_enabled: true,
            log_channel_id: Some(67890),
        };

        let serialized = serde_yaml::to_string(&config).expect("Failed to serialize");
        assert!(serialized.contains("community_id: 12345"));
        assert!(serialized.contains("max_strikes: 5"));
        assert!(serialized.contains("action: Mute"));
        assert!(serialized.contains("debug_enabled: true"));

        let deserialized: AutomodConfig =
            serde_yaml::from_str(&serialized).expect("Failed to deserialize");
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_status_display_uses_na_for_unset() {
        let status = AutomodConfig::new(1).status();
        let text = status.to_string();
        assert!(text.contains("Max Strikes: NA"));
        assert!(text.contains("Action: NA"));
        assert!(text.contains("Debug: OFF"));
        assert!(text.contains("Not Configured"));
    }
}
