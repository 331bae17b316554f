//! Request-level execution: restriction and affordability checks, the
//! repeat loop, and the report handed back to the caller.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use streetwise_types::{
    ActionDefinition, ActionReport, ActionView, AttemptOutcome, Avatar, ResourceDeltas,
};
use tracing::{debug, warn};

use crate::avatar::expire_temporary;
use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::pricing::PurchaseLedger;
use crate::processor;
use crate::timeout;

/// Check that the avatar can pay for one more attempt of `action`.
///
/// Money is checked against the avatar's current (possibly escalated)
/// price; stamina only when the action consumes it.
pub fn check_affordable(
    avatar: &Avatar,
    purchases: &PurchaseLedger,
    action: &ActionDefinition,
) -> Result<(), EngineError> {
    let price = purchases.current_price(action);
    if price < Decimal::ZERO && avatar.money < price.abs() {
        return Err(EngineError::InsufficientMoney {
            required: price.abs(),
            available: avatar.money,
        });
    }
    let stamina = action.stamina_cost();
    if stamina > 0 && avatar.stamina < stamina {
        return Err(EngineError::InsufficientStamina {
            required: stamina,
            available: avatar.stamina,
        });
    }
    Ok(())
}

/// How `action` looks to `avatar` right now.
pub fn view(
    avatar: &mut Avatar,
    purchases: &PurchaseLedger,
    action: &ActionDefinition,
    now: DateTime<Utc>,
) -> ActionView {
    ActionView {
        failure_chance: processor::chance_for(avatar, action, now),
        price: purchases.current_price(action),
        action: action.clone(),
    }
}

/// Run `action` up to `repeat` times and report the net effect.
///
/// The loop stops early when an attempt does not succeed, when an attempt
/// puts the avatar into a new timeout, or when the next attempt is no
/// longer affordable. Only a rejection of the very first attempt is an
/// error; later ones just end the loop. A `repeat` of zero runs once and
/// values above [`RulesConfig::max_repeat`] are capped.
pub fn perform(
    avatar: &mut Avatar,
    purchases: &mut PurchaseLedger,
    action: &ActionDefinition,
    repeat: u32,
    rules: &RulesConfig,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<ActionReport, EngineError> {
    timeout::ensure_can_act(avatar, action.category, rules, now)?;
    expire_temporary(avatar, now);
    let before = avatar.clone();

    let requested = repeat.clamp(1, rules.max_repeat.max(1));
    let mut executed: u32 = 0;
    let mut outcome = AttemptOutcome::Success;

    for attempt in 0..requested {
        if let Err(err) = check_affordable(avatar, purchases, action) {
            if attempt == 0 {
                warn!(
                    avatar_id = %avatar.id,
                    action_id = %action.id,
                    error = %err,
                    "action rejected"
                );
                return Err(err);
            }
            debug!(avatar_id = %avatar.id, attempt, error = %err, "repeat stopped: unaffordable");
            break;
        }

        let timeout_before = avatar.timeout.clone();
        outcome = processor::resolve(avatar, purchases, action, rules, now, rng)?;
        executed = executed.saturating_add(1);

        let entered_timeout = avatar.timeout.is_some() && avatar.timeout != timeout_before;
        if !outcome.is_success() || entered_timeout {
            break;
        }
    }

    debug!(
        avatar_id = %avatar.id,
        action_id = %action.id,
        requested,
        executed,
        outcome = ?outcome,
        "action performed"
    );

    Ok(ActionReport {
        action_id: action.id.clone(),
        success: outcome.is_success(),
        outcome,
        attempts_executed: executed,
        deltas: ResourceDeltas::between(&before, avatar),
        timeout_state: timeout::state(avatar, now),
        next_price: purchases.current_price(action),
        next_failure_chance: processor::chance_for(avatar, action, now),
        avatar: avatar.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::RngCore;
    use rust_decimal_macros::dec;
    use streetwise_types::{ActionCategory, ActorId, SpecialEffect, TimeoutKind, TimeoutState};

    use super::*;
    use crate::avatar::new_avatar;

    /// Replays a fixed list of 64-bit draws, repeating the last one.
    struct ScriptedRng {
        draws: Vec<u64>,
        next: usize,
    }

    impl ScriptedRng {
        fn new(draws: &[u64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            u32::try_from(self.next_u64() >> 32).unwrap_or(u32::MAX)
        }

        fn next_u64(&mut self) -> u64 {
            let index = self.next.min(self.draws.len().saturating_sub(1));
            self.next += 1;
            self.draws.get(index).copied().unwrap_or(u64::MAX)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.next_u64().to_le_bytes()[0];
            }
        }
    }

    const PASS: u64 = u64::MAX;
    const FAIL: u64 = 0;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn avatar() -> Avatar {
        new_avatar(ActorId::from("a"), "Cypher", &RulesConfig::default(), now()).unwrap()
    }

    fn job() -> ActionDefinition {
        ActionDefinition {
            stamina: -10,
            money: dec!(100),
            xp: 10,
            failure_chance: 0.15,
            lost_hp_failure: 5,
            ..ActionDefinition::blank("delivery", ActionCategory::Work, "Delivery")
        }
    }

    #[test]
    fn zero_stamina_is_rejected_without_mutation() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        a.stamina = 0;
        let snapshot = a.clone();
        let mut ledger = PurchaseLedger::new();
        let mut rng = ScriptedRng::new(&[PASS]);
        let result = perform(&mut a, &mut ledger, &job(), 1, &rules, now(), &mut rng);
        assert_eq!(
            result.err(),
            Some(EngineError::InsufficientStamina {
                required: 10,
                available: 0
            })
        );
        assert_eq!(a, snapshot);
    }

    #[test]
    fn unaffordable_price_is_rejected() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        let mut ledger = PurchaseLedger::new();
        let course = ActionDefinition {
            money: dec!(-2500),
            ..ActionDefinition::blank("course", ActionCategory::Training, "Course")
        };
        let mut rng = ScriptedRng::new(&[PASS]);
        let result = perform(&mut a, &mut ledger, &course, 1, &rules, now(), &mut rng);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientMoney { .. })
        ));
        assert_eq!(a.money, dec!(500));
    }

    #[test]
    fn repeat_stops_at_first_failure() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        let mut ledger = PurchaseLedger::new();
        let mut rng = ScriptedRng::new(&[PASS, PASS, PASS, FAIL, PASS]);
        let report = perform(&mut a, &mut ledger, &job(), 5, &rules, now(), &mut rng).unwrap();
        assert_eq!(report.attempts_executed, 4);
        assert!(!report.success);
        assert_eq!(report.outcome, AttemptOutcome::Failure);
        assert_eq!(report.deltas.stamina, -40);
        assert_eq!(report.deltas.money, dec!(300));
        assert_eq!(report.deltas.experience, 30);
        assert_eq!(report.deltas.life, -5);
        assert_eq!(report.avatar, a);
    }

    #[test]
    fn repeat_stops_when_stamina_runs_out() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        a.stamina = 25;
        let mut ledger = PurchaseLedger::new();
        let mut rng = ScriptedRng::new(&[PASS]);
        let report = perform(&mut a, &mut ledger, &job(), 10, &rules, now(), &mut rng).unwrap();
        assert_eq!(report.attempts_executed, 2);
        assert!(report.success);
        assert_eq!(a.stamina, 5);
    }

    #[test]
    fn repeat_zero_runs_once() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        let mut ledger = PurchaseLedger::new();
        let mut rng = ScriptedRng::new(&[PASS]);
        let report = perform(&mut a, &mut ledger, &job(), 0, &rules, now(), &mut rng).unwrap();
        assert_eq!(report.attempts_executed, 1);
    }

    #[test]
    fn restricted_avatar_is_rejected() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        timeout::enter(&mut a, TimeoutKind::Hospital, 1, &rules, now()).unwrap();
        let mut ledger = PurchaseLedger::new();
        let mut rng = ScriptedRng::new(&[PASS]);
        let result = perform(&mut a, &mut ledger, &job(), 1, &rules, now(), &mut rng);
        assert!(matches!(result, Err(EngineError::Restricted { .. })));
    }

    #[test]
    fn voluntary_work_hospitalization_ends_the_loop() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        a.wanted_level = 120;
        timeout::enter(&mut a, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        let mut ledger = PurchaseLedger::new();
        let work = ActionDefinition {
            stamina: -50,
            hp: -50,
            special_effect: Some(SpecialEffect::VoluntaryWork),
            ..ActionDefinition::blank("community", ActionCategory::Jail, "Community work")
        };
        let mut rng = ScriptedRng::new(&[PASS]);
        let report = perform(&mut a, &mut ledger, &work, 5, &rules, now(), &mut rng).unwrap();
        assert_eq!(report.attempts_executed, 2);
        assert!(report.success);
        assert_eq!(report.timeout_state, TimeoutState::Hospital);
        assert_eq!(a.wanted_level, 20);
    }

    #[test]
    fn report_includes_next_price() {
        let rules = RulesConfig::default();
        let mut a = avatar();
        a.money = dec!(1000000);
        let mut ledger = PurchaseLedger::new();
        let syringe = ActionDefinition {
            money: dec!(-500000),
            special_effect: Some(SpecialEffect::AddStrength),
            ..ActionDefinition::blank("strength", ActionCategory::SpecialStatusSeller, "Strength")
        };
        let mut rng = ScriptedRng::new(&[PASS]);
        let report = perform(&mut a, &mut ledger, &syringe, 3, &rules, now(), &mut rng).unwrap();
        // 1_000_000 covers 500_000 but not the escalated 750_000.
        assert_eq!(report.attempts_executed, 1);
        assert_eq!(report.next_price, dec!(-750000));
        assert!(report.next_failure_chance.abs() < f64::EPSILON);
        assert_eq!(a.stats.strength, 1);
    }

    #[test]
    fn view_reflects_dynamic_price_and_chance() {
        let mut a = avatar();
        let ledger = PurchaseLedger::new();
        let shown = view(&mut a, &ledger, &job(), now());
        assert_eq!(shown.price, dec!(100));
        assert!((shown.failure_chance - 0.15).abs() < 1e-9);
    }
}
