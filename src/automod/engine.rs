//! Moderation engine
//!
//! Orchestrates the strike ledger, escalation policy and action
//! executor for every incoming infraction, and owns the validated
//! configuration surface.
//!
//! Per (community, member) the engine behaves as a small state
//! machine: clean, accumulating, then escalating once the threshold is
//! reached. A successful action resets the member back to clean; a
//! denied or failed action leaves the count frozen at its incremented
//! value, and the decision is recomputed on every later infraction so
//! the escalation re-attempts as soon as the operator fixes the
//! configuration.

use crate::ENGINE_TARGET;
use crate::automod::action::{ActionKind, MUTED_ROLE_NAME};
use crate::automod::config::{AutomodConfig, AutomodStatus};
use crate::automod::error::{AutomodError, AutomodResult, DenyReason, ExecutionOutcome};
use crate::automod::executor::ActionExecutor;
use crate::automod::gateway::{
    ChannelId, CommunityId, MemberGateway, MemberId, NotificationSink, PermissionOracle,
};
use crate::automod::ledger::StrikeLedger;
use crate::automod::policy::{self, Decision};
use crate::settings::{ConfigCache, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What happened to a single infraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfractionReport {
    /// Strike count after this infraction (0 after a successful
    /// escalation)
    pub strikes: u32,
    pub action: ActionReport,
}

/// Enforcement outcome attached to an infraction report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReport {
    /// No enforcement fired
    None,
    /// The configured action was carried out
    Applied(ActionKind),
    /// The action was refused by policy; the reason is safe to show
    /// the operator
    Denied(ActionKind, DenyReason),
    /// The action hit a transient platform failure
    Failed(ActionKind, String),
}

/// Per-community moderation policy engine
pub struct ModerationEngine {
    ledger: StrikeLedger,
    executor: ActionExecutor,
    settings: ConfigCache,
    oracle: Arc<dyn PermissionOracle>,
}

impl ModerationEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn SettingsStore>,
        oracle: Arc<dyn PermissionOracle>,
        gateway: Arc<dyn MemberGateway>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            ledger: StrikeLedger::new(),
            executor: ActionExecutor::new(Arc::clone(&oracle), gateway, sink),
            settings: ConfigCache::new(store),
            oracle,
        }
    }

    /// Override the executor's per-call timeout
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.executor = self.executor.with_call_timeout(call_timeout);
        self
    }

    /// Record an infraction and escalate if the threshold is crossed.
    ///
    /// Every call counts as a new infraction; deduplication of
    /// repeated events is the caller's concern. The increment and the
    /// decision happen under the ledger's entry lock; the enforcement
    /// action runs without any lock held, and the reset on success
    /// re-acquires the entry. An infraction racing an in-flight action
    /// is processed against the pre-reset count, which can only
    /// produce a redundant escalation attempt, never a lost strike.
    pub async fn on_infraction(
        &self,
        community: CommunityId,
        member: MemberId,
        privileged: bool,
    ) -> AutomodResult<InfractionReport> {
        let config = self.settings.get(community).await?;
        let strikes = self.ledger.increment(community, member);

        let decision = policy::decide(
            strikes,
            config.max_strikes,
            config.action,
            config.debug_enabled,
            privileged,
        );

        let Decision::Execute(kind) = decision else {
            return Ok(InfractionReport {
                strikes,
                action: ActionReport::None,
            });
        };

        info!(
            target: ENGINE_TARGET,
            community_id = %community,
            member_id = %member,
            action = %kind,
            strikes,
            "Strike threshold crossed, escalating"
        );

        let outcome = self
            .executor
            .execute(community, member, kind, strikes, config.log_channel_id)
            .await;

        let report = match outcome {
            ExecutionOutcome::Applied => {
                self.ledger.reset(community, member);
                InfractionReport {
                    strikes: 0,
                    action: ActionReport::Applied(kind),
                }
            }
            ExecutionOutcome::Denied(reason) => InfractionReport {
                strikes,
                action: ActionReport::Denied(kind, reason),
            },
            ExecutionOutcome::Failed(reason) => InfractionReport {
                strikes,
                action: ActionReport::Failed(kind, reason),
            },
        };

        Ok(report)
    }

    /// Current strike count for a member
    #[must_use]
    pub fn strikes(&self, community: CommunityId, member: MemberId) -> u32 {
        self.ledger.get(community, member)
    }

    /// Out-of-band operator reset of a member's strikes
    pub fn clear_strikes(&self, community: CommunityId, member: MemberId) {
        self.ledger.clear(community, member);
        info!(
            target: ENGINE_TARGET,
            community_id = %community,
            member_id = %member,
            "Strikes cleared by operator"
        );
    }

    /// Set the strike threshold for a community. Rejects zero before
    /// any store write.
    pub async fn set_max_strikes(
        &self,
        community: CommunityId,
        max_strikes: u32,
    ) -> AutomodResult<()> {
        let mut config = self.settings.get(community).await?;
        config.set_max_strikes(max_strikes)?;
        self.settings.save(config).await?;
        Ok(())
    }

    /// Set the configured action, pre-checking that the acting
    /// principal can currently carry it out. State may still drift
    /// before an enforcement fires, so the executor re-checks at
    /// enforcement time.
    pub async fn set_action(
        &self,
        community: CommunityId,
        action: ActionKind,
    ) -> AutomodResult<()> {
        if let Err(reason) = self.preflight(community, action).await {
            return Err(AutomodError::ActionUnavailable(reason));
        }

        let mut config = self.settings.get(community).await?;
        config.action = Some(action);
        self.settings.save(config).await?;
        Ok(())
    }

    async fn preflight(
        &self,
        community: CommunityId,
        action: ActionKind,
    ) -> Result<(), DenyReason> {
        match action.required_capability() {
            Some(capability) => {
                if !self.oracle.has_authority(community, capability).await {
                    return Err(DenyReason::MissingPermission);
                }
            }
            None => {
                let Some(role) = self.oracle.role_by_name(community, MUTED_ROLE_NAME).await
                else {
                    return Err(DenyReason::RoleMissing);
                };
                if !self.oracle.role_assignable(community, &role).await {
                    return Err(DenyReason::RoleNotEditable);
                }
            }
        }
        Ok(())
    }

    /// Enable or disable enforcement for privileged members
    pub async fn set_debug(&self, community: CommunityId, enabled: bool) -> AutomodResult<()> {
        let mut config = self.settings.get(community).await?;
        config.debug_enabled = enabled;
        self.settings.save(config).await?;
        Ok(())
    }

    /// Set or clear the destination channel for enforcement notices
    pub async fn set_log_channel(
        &self,
        community: CommunityId,
        channel: Option<ChannelId>,
    ) -> AutomodResult<()> {
        let mut config = self.settings.get(community).await?;
        config.log_channel_id = channel;
        self.settings.save(config).await?;
        Ok(())
    }

    /// Read-only snapshot of a community's configuration
    pub async fn status(&self, community: CommunityId) -> AutomodResult<AutomodStatus> {
        let config = self.settings.get(community).await?;
        Ok(config.status())
    }

    /// Current configuration by value, never a shared reference
    pub async fn config(&self, community: CommunityId) -> AutomodResult<AutomodConfig> {
        Ok(self.settings.get(community).await?)
    }
}
