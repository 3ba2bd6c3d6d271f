//! Escalation policy
//!
//! Pure decision function mapping a member's strike state and the
//! community configuration to an enforcement decision. Deterministic
//! and side-effect free so it can be tested exhaustively without any
//! platform collaborator.

use crate::automod::action::ActionKind;

/// Enforcement decision computed for a single infraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No enforcement fires
    None,
    /// Escalate with the configured action
    Execute(ActionKind),
}

/// Decide whether an infraction escalates.
///
/// Rules, in order:
/// 1. threshold unset: the strike feature is off,
/// 2. privileged members are exempt unless debug mode is on,
/// 3. below the threshold nothing fires,
/// 4. no configured action is a misconfiguration, treated as a silent
///    no-op rather than a fault.
#[must_use]
pub fn decide(
    current_strikes: u32,
    max_strikes: Option<u32>,
    action: Option<ActionKind>,
    debug_enabled: bool,
    privileged: bool,
) -> Decision {
    let Some(max) = max_strikes else {
        return Decision::None;
    };

    if privileged && !debug_enabled {
        return Decision::None;
    }

    if current_strikes < max {
        return Decision::None;
    }

    match action {
        Some(kind) => Decision::Execute(kind),
        None => Decision::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_unset_never_fires() {
        for strikes in [0, 1, 5, 100, u32::MAX] {
            assert_eq!(
                decide(strikes, None, Some(ActionKind::Ban), true, false),
                Decision::None
            );
        }
    }

    #[test]
    fn test_privileged_exempt_unless_debug() {
        // Privileged, debug off: exempt no matter the count
        for strikes in [3, 10, 1000] {
            assert_eq!(
                decide(strikes, Some(3), Some(ActionKind::Kick), false, true),
                Decision::None
            );
        }

        // Privileged, debug on: treated like anyone else
        assert_eq!(
            decide(3, Some(3), Some(ActionKind::Kick), true, true),
            Decision::Execute(ActionKind::Kick)
        );
        assert_eq!(
            decide(2, Some(3), Some(ActionKind::Kick), true, true),
            Decision::None
        );
    }

    #[test]
    fn test_below_threshold() {
        assert_eq!(
            decide(1, Some(3), Some(ActionKind::Mute), false, false),
            Decision::None
        );
        assert_eq!(
            decide(2, Some(3), Some(ActionKind::Mute), false, false),
            Decision::None
        );
    }

    #[test]
    fn test_at_and_above_threshold() {
        assert_eq!(
            decide(3, Some(3), Some(ActionKind::Mute), false, false),
            Decision::Execute(ActionKind::Mute)
        );
        // The decision is recomputed on every infraction once the
        // threshold is reached, so a frozen count keeps escalating.
        assert_eq!(
            decide(4, Some(3), Some(ActionKind::Mute), false, false),
            Decision::Execute(ActionKind::Mute)
        );
    }

    #[test]
    fn test_action_unset_is_silent_noop() {
        assert_eq!(decide(10, Some(3), None, false, false), Decision::None);
    }

    #[test]
    fn test_threshold_of_one() {
        assert_eq!(
            decide(1, Some(1), Some(ActionKind::Ban), false, false),
            Decision::Execute(ActionKind::Ban)
        );
    }
}
