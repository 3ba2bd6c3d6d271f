//! Per-community automod policy engine.
//!
//! Strike bookkeeping, threshold escalation and enforcement-action
//! policy. The chat platform itself is an external collaborator: every
//! touchpoint (permission queries, member mutations, notification
//! delivery, settings persistence) is a trait the embedder implements.

pub mod automod;
pub mod logging;
pub mod settings;

/// Log target for engine orchestration events
pub const ENGINE_TARGET: &str = "strike_warden::engine";
/// Log target for action execution events
pub const EXECUTOR_TARGET: &str = "strike_warden::executor";
/// Log target for enforcement notices
pub const NOTICE_TARGET: &str = "strike_warden::notice";
/// Log target for settings persistence
pub const SETTINGS_TARGET: &str = "strike_warden::settings";

pub use automod::{
    ActionKind, ActionReport, AutomodConfig, AutomodError, AutomodResult, AutomodStatus,
    Capability, DenyReason, EnforcementNotice, ExecutionOutcome, GatewayError, InfractionReport,
    MemberGateway, ModerationEngine, NotificationSink, PermissionOracle, Role, StrikeLedger,
};
pub use settings::{
    ConfigCache, MemorySettingsStore, SettingsError, SettingsStore, YamlSettingsStore,
};
