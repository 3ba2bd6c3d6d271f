use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strike_warden::automod::{
    ActionKind, Capability, CommunityId, GatewayError, MemberGateway, MemberId, ModerationEngine,
    PermissionOracle, Role, TracingSink,
};
use strike_warden::settings::MemorySettingsStore;

/// Oracle whose kick authority can be toggled at runtime
struct DemoOracle {
    can_kick: AtomicBool,
}

#[async_trait::async_trait]
impl PermissionOracle for DemoOracle {
    async fn has_authority(&self, _community: CommunityId, capability: Capability) -> bool {
        match capability {
            Capability::KickMembers => self.can_kick.load(Ordering::Relaxed),
            Capability::BanMembers => false,
        }
    }

    async fn role_by_name(&self, _community: CommunityId, _name: &str) -> Option<Role> {
        None
    }

    async fn role_assignable(&self, _community: CommunityId, _role: &Role) -> bool {
        false
    }
}

/// Gateway that just prints what it would do
struct DemoGateway;

#[async_trait::async_trait]
impl MemberGateway for DemoGateway {
    async fn assign_role(
        &self,
        community: CommunityId,
        member: MemberId,
        role: &Role,
    ) -> Result<(), GatewayError> {
        println!("  [gateway] assigning role {} to {member} in {community}", role.name);
        Ok(())
    }

    async fn kick_member(
        &self,
        community: CommunityId,
        member: MemberId,
        reason: &str,
    ) -> Result<(), GatewayError> {
        println!("  [gateway] kicking {member} from {community}: {reason}");
        Ok(())
    }

    async fn ban_member(
        &self,
        community: CommunityId,
        member: MemberId,
        reason: &str,
    ) -> Result<(), GatewayError> {
        println!("  [gateway] banning {member} from {community}: {reason}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    strike_warden::logging::init().expect("failed to initialize logging");

    println!("Strike Lifecycle Walk-through");
    println!("-----------------------------");

    let oracle = Arc::new(DemoOracle {
        can_kick: AtomicBool::new(true),
    });
    let engine = ModerationEngine::new(
        Arc::new(MemorySettingsStore::new()),
        oracle.clone(),
        Arc::new(DemoGateway),
        Arc::new(TracingSink),
    );

    let community = 100;
    let member = 200;

    // Configure: three strikes, then kick
    engine.set_max_strikes(community, 3).await.unwrap();
    engine.set_action(community, ActionKind::Kick).await.unwrap();
    println!("\nConfig: {}", engine.status(community).await.unwrap());

    println!("\n--- Accumulation and escalation ---");
    for n in 1..=3 {
        let report = engine.on_infraction(community, member, false).await.unwrap();
        println!("infraction {n}: strikes={} action={:?}", report.strikes, report.action);
    }

    println!("\n--- Denied escalation (kick authority revoked) ---");
    oracle.can_kick.store(false, Ordering::Relaxed);
    for n in 1..=4 {
        let report = engine.on_infraction(community, member, false).await.unwrap();
        println!("infraction {n}: strikes={} action={:?}", report.strikes, report.action);
    }

    println!("\n--- Authority restored: next infraction re-attempts ---");
    oracle.can_kick.store(true, Ordering::Relaxed);
    let report = engine.on_infraction(community, member, false).await.unwrap();
    println!("infraction: strikes={} action={:?}", report.strikes, report.action);

    println!("\n--- Privileged member, debug off vs on ---");
    let admin = 300;
    let report = engine.on_infraction(community, admin, true).await.unwrap();
    println!("debug off: strikes={} action={:?}", report.strikes, report.action);

    engine.set_debug(community, true).await.unwrap();
    engine.on_infraction(community, admin, true).await.unwrap();
    let report = engine.on_infraction(community, admin, true).await.unwrap();
    println!("debug on:  strikes={} action={:?}", report.strikes, report.action);
}
