//! Error types and outcome taxonomy for the automod engine
//!
//! Two failure families are kept apart on purpose: `Denied` is a
//! policy or permission refusal that is safe to surface verbatim to
//! the requesting operator, while `Failed` is a transient platform
//! error that gets logged and may be retried by the caller.

use std::fmt;
use thiserror::Error;

/// Errors that can occur during automod operations
#[derive(Debug, Error)]
pub enum AutomodError {
    /// Settings store failure (load or save)
    #[error("settings store error: {0}")]
    Settings(String),

    /// A configuration write was rejected before reaching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A configuration write asked for an action the acting principal
    /// cannot currently carry out
    #[error("action unavailable: {0}")]
    ActionUnavailable(DenyReason),
}

/// Result type for automod operations
pub type AutomodResult<T> = Result<T, AutomodError>;

impl From<crate::settings::SettingsError> for AutomodError {
    fn from(error: crate::settings::SettingsError) -> Self {
        Self::Settings(error.to_string())
    }
}

/// Rejections raised by configuration writes before any mutation occurs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Strike threshold must be at least 1
    #[error("strikes must be a number greater than 0")]
    ZeroStrikes,

    /// Unrecognized action token
    #[error("unknown action `{0}`, expected MUTE, KICK or BAN")]
    UnknownAction(String),

    /// Unrecognized on/off token
    #[error("unknown status `{0}`, expected on or off")]
    UnknownToggle(String),
}

/// Why an enforcement action was refused by policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The muted role does not exist in the community
    RoleMissing,
    /// The muted role sits at or above the principal's highest role
    RoleNotEditable,
    /// The acting principal lacks the required authority
    MissingPermission,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleMissing => write!(f, "role-missing"),
            Self::RoleNotEditable => write!(f, "role-not-editable"),
            Self::MissingPermission => write!(f, "missing-permission"),
        }
    }
}

/// Result of applying an enforcement action through the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The action was carried out
    Applied,
    /// Policy or permission refusal, actionable by the operator
    Denied(DenyReason),
    /// Transient platform failure, logged and retriable by the caller
    Failed(String),
}

impl ExecutionOutcome {
    /// Check whether the action went through
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Failure reported by a platform gateway call
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct GatewayError(pub String);

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(DenyReason::RoleMissing.to_string(), "role-missing");
        assert_eq!(DenyReason::RoleNotEditable.to_string(), "role-not-editable");
        assert_eq!(
            DenyReason::MissingPermission.to_string(),
            "missing-permission"
        );
    }

    #[test]
    fn test_error_display() {
        let error = AutomodError::Settings("disk full".to_string());
        assert_eq!(error.to_string(), "settings store error: disk full");

        let error = AutomodError::from(ValidationError::ZeroStrikes);
        assert_eq!(error.to_string(), "strikes must be a number greater than 0");

        let error = AutomodError::ActionUnavailable(DenyReason::RoleMissing);
        assert_eq!(error.to_string(), "action unavailable: role-missing");
    }

    #[test]
    fn test_outcome_is_applied() {
        assert!(ExecutionOutcome::Applied.is_applied());
        assert!(!ExecutionOutcome::Denied(DenyReason::RoleMissing).is_applied());
        assert!(!ExecutionOutcome::Failed("timeout".to_string()).is_applied());
    }
}
