//! Enforcement action execution
//!
//! One handler per action kind, held in a registry and dispatched from
//! the tagged `ActionKind` variant. Every platform call runs under a
//! bounded timeout; the executor itself never retries.

use crate::EXECUTOR_TARGET;
use crate::automod::action::{ActionKind, MUTED_ROLE_NAME};
use crate::automod::error::{DenyReason, ExecutionOutcome};
use crate::automod::gateway::{
    Capability, ChannelId, CommunityId, EnforcementNotice, MemberGateway, MemberId,
    NotificationSink, PermissionOracle,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Upper bound on a single platform call before it is reported as
/// `failed("timeout")`
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for carrying out one kind of enforcement action
#[async_trait::async_trait]
trait ActionHandler: Send + Sync {
    async fn apply(
        &self,
        oracle: &dyn PermissionOracle,
        gateway: &dyn MemberGateway,
        community: CommunityId,
        member: MemberId,
        strikes: u32,
    ) -> ExecutionOutcome;
}

/// Applies enforcement decisions through the platform collaborators
pub struct ActionExecutor {
    handlers: HashMap<ActionKind, Box<dyn ActionHandler>>,
    oracle: Arc<dyn PermissionOracle>,
    gateway: Arc<dyn MemberGateway>,
    sink: Arc<dyn NotificationSink>,
    call_timeout: Duration,
}

impl ActionExecutor {
    /// Create an executor with all action handlers registered
    #[must_use]
    pub fn new(
        oracle: Arc<dyn PermissionOracle>,
        gateway: Arc<dyn MemberGateway>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let mut handlers: HashMap<ActionKind, Box<dyn ActionHandler>> = HashMap::new();
        handlers.insert(ActionKind::Mute, Box::new(MuteHandler));
        handlers.insert(ActionKind::Kick, Box::new(KickHandler));
        handlers.insert(ActionKind::Ban, Box::new(BanHandler));

        Self {
            handlers,
            oracle,
            gateway,
            sink,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call timeout
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Apply an enforcement action to a member.
    ///
    /// On `Applied`, a notice goes to the community's log channel (if
    /// one is configured) as a detached task; its delivery never
    /// changes the returned outcome.
    pub async fn execute(
        &self,
        community: CommunityId,
        member: MemberId,
        action: ActionKind,
        strikes: u32,
        log_channel: Option<ChannelId>,
    ) -> ExecutionOutcome {
        let Some(handler) = self.handlers.get(&action) else {
            return ExecutionOutcome::Failed(format!("no handler registered for action {action}"));
        };

        let attempt = handler.apply(
            self.oracle.as_ref(),
            self.gateway.as_ref(),
            community,
            member,
            strikes,
        );

        let outcome = match timeout(self.call_timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => ExecutionOutcome::Failed("timeout".to_string()),
        };

        match &outcome {
            ExecutionOutcome::Applied => {
                info!(
                    target: EXECUTOR_TARGET,
                    community_id = %community,
                    member_id = %member,
                    action = %action,
                    strikes,
                    "Enforcement action applied"
                );
            }
            ExecutionOutcome::Denied(reason) => {
                info!(
                    target: EXECUTOR_TARGET,
                    community_id = %community,
                    member_id = %member,
                    action = %action,
                    reason = %reason,
                    "Enforcement action denied"
                );
            }
            ExecutionOutcome::Failed(reason) => {
                warn!(
                    target: EXECUTOR_TARGET,
                    community_id = %community,
                    member_id = %member,
                    action = %action,
                    reason = %reason,
                    "Enforcement action failed"
                );
            }
        }

        if outcome.is_applied() {
            if let Some(channel) = log_channel {
                let sink = Arc::clone(&self.sink);
                let notice = EnforcementNotice::new(community, member, action, strikes);
                tokio::spawn(async move {
                    sink.notify(channel, notice).await;
                });
            }
        }

        outcome
    }
}

fn enforcement_reason(strikes: u32) -> String {
    format!("automod: reached {strikes} strikes")
}

/// Assigns the muted role
struct MuteHandler;

#[async_trait::async_trait]
impl ActionHandler for MuteHandler {
    async fn apply(
        &self,
        oracle: &dyn PermissionOracle,
        gateway: &dyn MemberGateway,
        community: CommunityId,
        member: MemberId,
        _strikes: u32,
    ) -> ExecutionOutcome {
        let Some(role) = oracle.role_by_name(community, MUTED_ROLE_NAME).await else {
            return ExecutionOutcome::Denied(DenyReason::RoleMissing);
        };

        if !oracle.role_assignable(community, &role).await {
            return ExecutionOutcome::Denied(DenyReason::RoleNotEditable);
        }

        match gateway.assign_role(community, member, &role).await {
            Ok(()) => ExecutionOutcome::Applied,
            Err(e) => ExecutionOutcome::Failed(e.to_string()),
        }
    }
}

/// Removes the member from the community
struct KickHandler;

#[async_trait::async_trait]
impl ActionHandler for KickHandler {
    async fn apply(
        &self,
        oracle: &dyn PermissionOracle,
        gateway: &dyn MemberGateway,
        community: CommunityId,
        member: MemberId,
        strikes: u32,
    ) -> ExecutionOutcome {
        if !oracle.has_authority(community, Capability::KickMembers).await {
            return ExecutionOutcome::Denied(DenyReason::MissingPermission);
        }

        match gateway
            .kick_member(community, member, &enforcement_reason(strikes))
            .await
        {
            Ok(()) => ExecutionOutcome::Applied,
            Err(e) => ExecutionOutcome::Failed(e.to_string()),
        }
    }
}

/// Bans the member from the community
struct BanHandler;

#[async_trait::async_trait]
impl ActionHandler for BanHandler {
    async fn apply(
        &self,
        oracle: &dyn PermissionOracle,
        gateway: &dyn MemberGateway,
        community: CommunityId,
        member: MemberId,
        strikes: u32,
    ) -> ExecutionOutcome {
        if !oracle.has_authority(community, Capability::BanMembers).await {
            return ExecutionOutcome::Denied(DenyReason::MissingPermission);
        }

        match gateway
            .ban_member(community, member, &enforcement_reason(strikes))
            .await
        {
            Ok(()) => ExecutionOutcome::Applied,
            Err(e) => ExecutionOutcome::Failed(e.to_string()),
        }
    }
}
