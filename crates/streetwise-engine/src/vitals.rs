//! Stamina and life: bounded deltas and periodic regeneration.
//!
//! Both resources live in `[0, max_resource]`. Deltas that would leave the
//! range are clamped, never rejected.

use chrono::{DateTime, Utc};
use streetwise_types::Avatar;

use crate::config::RulesConfig;
use crate::formulas::apply_bounded;
use crate::timeout;

/// Apply a signed stamina delta, clamped to `[0, max_resource]`.
pub fn apply_stamina(avatar: &mut Avatar, delta: i64, rules: &RulesConfig) {
    avatar.stamina = apply_bounded(avatar.stamina, delta, rules.max_resource);
}

/// Apply a signed life delta, clamped to `[0, max_resource]`.
pub fn apply_life(avatar: &mut Avatar, delta: i64, rules: &RulesConfig) {
    avatar.life = apply_bounded(avatar.life, delta, rules.max_resource);
}

/// One regeneration tick: restore a little stamina and life.
///
/// Skipped for inactive avatars and for avatars inside an unexpired
/// timeout. Returns `true` if either resource changed.
pub fn regenerate(avatar: &mut Avatar, rules: &RulesConfig, now: DateTime<Utc>) -> bool {
    if !avatar.active || timeout::is_restricted(avatar, now) {
        return false;
    }
    let before = (avatar.stamina, avatar.life);
    apply_stamina(avatar, i64::from(rules.regen_stamina), rules);
    apply_life(avatar, i64::from(rules.regen_life), rules);
    before != (avatar.stamina, avatar.life)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeDelta;
    use rust_decimal::Decimal;
    use streetwise_types::{ActorId, Timeout, TimeoutKind};

    use super::*;
    use crate::avatar::new_avatar;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn tired() -> Avatar {
        let mut avatar =
            new_avatar(ActorId::from("a"), "Tank", &RulesConfig::default(), now()).unwrap();
        avatar.stamina = 40;
        avatar.life = 99;
        avatar
    }

    #[test]
    fn deltas_are_clamped() {
        let rules = RulesConfig::default();
        let mut avatar = tired();
        apply_stamina(&mut avatar, -50, &rules);
        assert_eq!(avatar.stamina, 0);
        apply_life(&mut avatar, 10, &rules);
        assert_eq!(avatar.life, 100);
    }

    #[test]
    fn regeneration_caps_at_max() {
        let rules = RulesConfig::default();
        let mut avatar = tired();
        assert!(regenerate(&mut avatar, &rules, now()));
        assert_eq!(avatar.stamina, 41);
        assert_eq!(avatar.life, 100);
        assert!(regenerate(&mut avatar, &rules, now()));
        assert_eq!(avatar.life, 100);

        avatar.stamina = 100;
        assert!(!regenerate(&mut avatar, &rules, now()));
    }

    #[test]
    fn regeneration_skips_restricted_and_inactive() {
        let rules = RulesConfig::default();
        let mut avatar = tired();
        avatar.timeout = Some(Timeout {
            kind: TimeoutKind::Hospital,
            until: now() + TimeDelta::minutes(5),
            cost: Decimal::new(500, 0),
        });
        assert!(!regenerate(&mut avatar, &rules, now()));
        assert_eq!(avatar.stamina, 40);

        // Once the timeout has lapsed the avatar regenerates again.
        assert!(regenerate(&mut avatar, &rules, now() + TimeDelta::minutes(5)));

        avatar.timeout = None;
        avatar.active = false;
        assert!(!regenerate(&mut avatar, &rules, now()));
    }
}
