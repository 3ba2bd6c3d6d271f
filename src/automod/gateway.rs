//! Platform collaborator seams
//!
//! The engine never talks to a chat platform directly. Everything it
//! needs from one is expressed as a trait here: permission queries,
//! member mutations, and the fire-and-forget notification sink.

use crate::NOTICE_TARGET;
use crate::automod::action::ActionKind;
use crate::automod::error::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Identifier of a community (guild/server)
pub type CommunityId = u64;
/// Identifier of a member within a community
pub type MemberId = u64;
/// Identifier of a text channel
pub type ChannelId = u64;
/// Identifier of a role
pub type RoleId = u64;

/// Authority the acting principal may hold in a community
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// May remove members from the community
    KickMembers,
    /// May ban members from the community
    BanMembers,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KickMembers => write!(f, "kick-members"),
            Self::BanMembers => write!(f, "ban-members"),
        }
    }
}

/// A role as seen through the permission oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Answers whether the acting principal can currently do things
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Does the acting principal hold this authority in the community?
    async fn has_authority(&self, community: CommunityId, capability: Capability) -> bool;

    /// Look up a role by its exact name
    async fn role_by_name(&self, community: CommunityId, name: &str) -> Option<Role>;

    /// Is the role below the principal's highest role, so the
    /// principal may assign it?
    async fn role_assignable(&self, community: CommunityId, role: &Role) -> bool;
}

/// Member mutation primitives provided by the platform
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MemberGateway: Send + Sync {
    /// Assign a role to a member
    async fn assign_role(
        &self,
        community: CommunityId,
        member: MemberId,
        role: &Role,
    ) -> Result<(), GatewayError>;

    /// Remove a member from the community
    async fn kick_member(
        &self,
        community: CommunityId,
        member: MemberId,
        reason: &str,
    ) -> Result<(), GatewayError>;

    /// Ban a member from the community
    async fn ban_member(
        &self,
        community: CommunityId,
        member: MemberId,
        reason: &str,
    ) -> Result<(), GatewayError>;
}

/// Payload sent to a community's log channel after an enforcement fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementNotice {
    /// Unique id of this enforcement
    pub id: String,
    pub community_id: CommunityId,
    pub member_id: MemberId,
    /// The action that was applied
    pub action: ActionKind,
    /// Strike count at the time of enforcement
    pub strikes: u32,
    pub issued_at: DateTime<Utc>,
}

impl EnforcementNotice {
    pub fn new(
        community_id: CommunityId,
        member_id: MemberId,
        action: ActionKind,
        strikes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            community_id,
            member_id,
            action,
            strikes,
            issued_at: Utc::now(),
        }
    }
}

impl fmt::Display for EnforcementNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied to member {} in community {} at {} strikes",
            self.action, self.member_id, self.community_id, self.strikes
        )
    }
}

/// Best-effort destination for enforcement notices
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notice to a log channel. Failures are the sink's
    /// problem; the caller never observes them.
    async fn notify(&self, channel: ChannelId, notice: EnforcementNotice);
}

/// Sink that writes notices to the tracing log instead of a platform
/// channel. Default for setups without a configured log channel
/// backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait::async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, channel: ChannelId, notice: EnforcementNotice) {
        info!(
            target: NOTICE_TARGET,
            notice_id = %notice.id,
            channel_id = %channel,
            community_id = %notice.community_id,
            member_id = %notice.member_id,
            action = %notice.action,
            strikes = notice.strikes,
            "Enforcement notice"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_carries_enforcement_context() {
        let notice = EnforcementNotice::new(100, 200, ActionKind::Kick, 3);
        assert_eq!(notice.community_id, 100);
        assert_eq!(notice.member_id, 200);
        assert_eq!(notice.action, ActionKind::Kick);
        assert_eq!(notice.strikes, 3);
        assert!(!notice.id.is_empty());

        let text = notice.to_string();
        assert!(text.contains("KICK"));
        assert!(text.contains("member 200"));
        assert!(text.contains("3 strikes"));
    }

    #[test]
    fn test_notice_serialization() {
        let notice = EnforcementNotice::new(100, 200, ActionKind::Mute, 5);
        let yaml = serde_yaml::to_string(&notice).expect("Failed to serialize");
        assert!(yaml.contains("community_id: 100"));
        assert!(yaml.contains("action: Mute"));

        let back: EnforcementNotice = serde_yaml::from_str(&yaml).expect("Failed to deserialize");
        assert_eq!(back.id, notice.id);
        assert_eq!(back.strikes, 5);
    }

    #[test]
    fn test_capability_display() {
        assert_eq!(Capability::KickMembers.to_string(), "kick-members");
        assert_eq!(Capability::BanMembers.to_string(), "ban-members");
    }
}
