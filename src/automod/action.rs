//! Enforcement action types
//!
//! This module defines the punitive actions the automod can escalate to
//! once a member crosses the strike threshold.

use crate::automod::error::ValidationError;
use crate::automod::gateway::Capability;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the role assigned by the mute action. Exact match.
pub const MUTED_ROLE_NAME: &str = "muted";

/// Punitive action applied when a member reaches the strike threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Assign the muted role
    Mute,
    /// Remove the member from the community
    Kick,
    /// Ban the member from the community
    Ban,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mute => write!(f, "MUTE"),
            Self::Kick => write!(f, "KICK"),
            Self::Ban => write!(f, "BAN"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MUTE" => Ok(Self::Mute),
            "KICK" => Ok(Self::Kick),
            "BAN" => Ok(Self::Ban),
            other => Err(ValidationError::UnknownAction(other.to_string())),
        }
    }
}

impl ActionKind {
    /// The authority the acting principal must hold to carry out this
    /// action. Mute is role based and checked against role
    /// assignability instead.
    #[must_use]
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            Self::Mute => None,
            Self::Kick => Some(Capability::KickMembers),
            Self::Ban => Some(Capability::BanMembers),
        }
    }
}
