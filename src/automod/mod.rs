//! Automod policy engine
//!
//! This module implements the per-community strike system: strike
//! bookkeeping, threshold escalation, and enforcement-action execution
//! against a platform-agnostic gateway.

mod action;
mod config;
mod engine;
mod error;
mod executor;
mod gateway;
mod ledger;
mod policy;

pub use action::{ActionKind, MUTED_ROLE_NAME};
pub use config::{AutomodConfig, AutomodStatus, parse_toggle};
pub use engine::{ActionReport, InfractionReport, ModerationEngine};
pub use error::{AutomodError, AutomodResult, DenyReason, ExecutionOutcome, GatewayError, ValidationError};
pub use executor::{ActionExecutor, DEFAULT_CALL_TIMEOUT};
pub use gateway::{
    Capability, ChannelId, CommunityId, EnforcementNotice, MemberGateway, MemberId,
    NotificationSink, PermissionOracle, Role, RoleId, TracingSink,
};
pub use ledger::StrikeLedger;
pub use policy::{Decision, decide};

#[cfg(test)]
pub use gateway::{MockMemberGateway, MockNotificationSink, MockPermissionOracle};
