//! The hospital and jail state machine.
//!
//! ```text
//! FREE ──life reaches 0──────────► HOSPITAL
//! FREE ──wanted reaches threshold─► JAIL
//! JAIL ──life reaches 0──────────► JAIL     (sentence kept, no transfer)
//! HOSPITAL / JAIL ──expiry──────────► FREE   (life raised to release value)
//! HOSPITAL / JAIL ──leave (paid or
//!                     after expiry)─► FREE   (life raised to release value, wanted reset for JAIL)
//! ```
//!
//! A timeout whose expiry has passed no longer restricts anything, even
//! before it is cleared. Only actions of the matching category (hospital
//! treatment while hospitalized, jail work while jailed) may run during an
//! unexpired timeout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use streetwise_types::{ActionCategory, Avatar, Timeout, TimeoutKind, TimeoutState};
use tracing::{debug, info, warn};

use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::formulas::{timeout_cost, timeout_duration};

/// The unexpired timeout of an avatar, if any.
pub fn active(avatar: &Avatar, now: DateTime<Utc>) -> Option<&Timeout> {
    avatar.timeout.as_ref().filter(|t| now < t.until)
}

/// Whether the avatar is inside an unexpired timeout.
pub fn is_restricted(avatar: &Avatar, now: DateTime<Utc>) -> bool {
    active(avatar, now).is_some()
}

/// Current restriction state, treating an expired timeout as free.
pub fn state(avatar: &Avatar, now: DateTime<Utc>) -> TimeoutState {
    active(avatar, now).map_or(TimeoutState::Free, |t| TimeoutState::from(t.kind))
}

/// Put the avatar into a timeout sized by level and risk multiplier.
pub fn enter(
    avatar: &mut Avatar,
    kind: TimeoutKind,
    multiplier: u32,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    let per_level = match kind {
        TimeoutKind::Hospital => rules.hospital_cost_per_level,
        TimeoutKind::Jail => rules.jail_cost_per_level,
    };
    let cost = timeout_cost(per_level, avatar.level, multiplier)?;
    let until = now
        .checked_add_signed(timeout_duration(avatar.level, multiplier, rules))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    info!(
        avatar_id = %avatar.id,
        kind = %kind,
        until = %until,
        cost = %cost,
        "avatar entered timeout"
    );
    avatar.timeout = Some(Timeout { kind, until, cost });
    Ok(())
}

/// Hospitalize the avatar if its life has reached zero.
///
/// Returns `true` if the avatar ends up hospitalized. An avatar already in
/// an unexpired hospital stay is not re-admitted. An unexpired jail sentence
/// is kept as it is: the avatar serves it at zero life and is released with
/// the release life value.
pub fn hospitalize_if_dead(
    avatar: &mut Avatar,
    multiplier: u32,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    if avatar.life > 0 {
        return Ok(false);
    }
    match active(avatar, now).map(|t| t.kind) {
        Some(TimeoutKind::Hospital) => return Ok(true),
        Some(TimeoutKind::Jail) => {
            debug!(avatar_id = %avatar.id, "life reached zero in jail, sentence kept");
            return Ok(false);
        }
        None => {}
    }
    enter(avatar, TimeoutKind::Hospital, multiplier, rules, now)?;
    Ok(true)
}

/// Raise the wanted level after a failed arrestable attempt and jail the
/// avatar once it reaches the threshold.
///
/// Returns `true` if the avatar was jailed.
pub fn register_offence(
    avatar: &mut Avatar,
    multiplier: u32,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    let heat = rules.wanted_per_failure.saturating_mul(multiplier);
    avatar.wanted_level = avatar.wanted_level.saturating_add(heat);
    if avatar.wanted_level < rules.wanted_threshold {
        return Ok(false);
    }
    enter(avatar, TimeoutKind::Jail, multiplier, rules, now)?;
    Ok(true)
}

/// Clear a timeout whose expiry has passed.
///
/// Expiry raises life to the release value. Expiry of a jail sentence
/// leaves the wanted level as it is. Returns the kind that was cleared.
pub fn clear_if_expired(
    avatar: &mut Avatar,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Option<TimeoutKind> {
    let kind = avatar
        .timeout
        .as_ref()
        .filter(|t| now >= t.until)
        .map(|t| t.kind)?;
    avatar.timeout = None;
    avatar.life = avatar.life.max(rules.hospital_release_life);
    Some(kind)
}

/// Check that the avatar may start an action of `category` right now.
///
/// Clears an expired timeout first.
pub fn ensure_can_act(
    avatar: &mut Avatar,
    category: ActionCategory,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    clear_if_expired(avatar, rules, now);
    match active(avatar, now) {
        Some(t) if t.kind.allowed_category() != category => Err(EngineError::Restricted {
            kind: t.kind,
            until: t.until,
        }),
        _ => Ok(()),
    }
}

/// Leave a timeout, either for free once it has expired or early by paying
/// its cost.
///
/// On success the avatar is free and active with at least the release life
/// value, and a jail release also resets the wanted level.
/// Returns the amount paid. Rejections leave the avatar untouched.
pub fn leave(
    avatar: &mut Avatar,
    pay: bool,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<Decimal, EngineError> {
    let Some(timeout) = avatar.timeout.clone() else {
        return Err(EngineError::NotInTimeout);
    };

    let paid = if now >= timeout.until {
        Decimal::ZERO
    } else if !pay {
        return Err(EngineError::MustWaitOrPay {
            kind: timeout.kind,
            until: timeout.until,
        });
    } else if avatar.money < timeout.cost {
        warn!(
            avatar_id = %avatar.id,
            cost = %timeout.cost,
            money = %avatar.money,
            "early release refused: not enough money"
        );
        return Err(EngineError::InsufficientMoney {
            required: timeout.cost,
            available: avatar.money,
        });
    } else {
        avatar.money = avatar
            .money
            .checked_sub(timeout.cost)
            .ok_or_else(|| EngineError::overflow("release payment"))?;
        timeout.cost
    };

    avatar.timeout = None;
    avatar.active = true;
    avatar.life = avatar.life.max(rules.hospital_release_life);
    if timeout.kind == TimeoutKind::Jail {
        avatar.wanted_level = 0;
    }
    info!(avatar_id = %avatar.id, kind = %timeout.kind, paid = %paid, "avatar left timeout");
    Ok(paid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;
    use streetwise_types::ActorId;

    use super::*;
    use crate::avatar::new_avatar;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn avatar_at_level(level: u32) -> Avatar {
        let mut avatar =
            new_avatar(ActorId::from("a"), "Switch", &RulesConfig::default(), now()).unwrap();
        avatar.level = level;
        avatar
    }

    #[test]
    fn hospital_entry_scales_with_level() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(3);
        avatar.life = 0;
        assert_eq!(hospitalize_if_dead(&mut avatar, 1, &rules, now()), Ok(true));
        let timeout = avatar.timeout.clone().unwrap();
        assert_eq!(timeout.kind, TimeoutKind::Hospital);
        assert_eq!(timeout.cost, dec!(1500));
        assert_eq!(timeout.until, now() + TimeDelta::minutes(15));
        assert_eq!(state(&avatar, now()), TimeoutState::Hospital);
    }

    #[test]
    fn living_avatar_is_not_hospitalized() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        assert_eq!(hospitalize_if_dead(&mut avatar, 1, &rules, now()), Ok(false));
        assert!(avatar.timeout.is_none());
    }

    #[test]
    fn hospital_stay_is_not_restarted() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.life = 0;
        hospitalize_if_dead(&mut avatar, 1, &rules, now()).unwrap();
        let first = avatar.timeout.clone();
        let later = now() + TimeDelta::minutes(2);
        assert_eq!(hospitalize_if_dead(&mut avatar, 3, &rules, later), Ok(true));
        assert_eq!(avatar.timeout, first);
    }

    #[test]
    fn zero_life_in_jail_keeps_the_sentence() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        let sentence = avatar.timeout.clone();
        avatar.life = 0;
        assert_eq!(hospitalize_if_dead(&mut avatar, 1, &rules, now()), Ok(false));
        assert_eq!(avatar.timeout, sentence);
        assert_eq!(state(&avatar, now()), TimeoutState::Jail);

        let later = now() + TimeDelta::minutes(5);
        assert_eq!(
            clear_if_expired(&mut avatar, &rules, later),
            Some(TimeoutKind::Jail)
        );
        assert_eq!(avatar.life, 1);
    }

    #[test]
    fn offences_accumulate_until_jail() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(2);
        for _ in 0..4 {
            assert_eq!(register_offence(&mut avatar, 1, &rules, now()), Ok(false));
        }
        assert_eq!(avatar.wanted_level, 80);
        assert_eq!(register_offence(&mut avatar, 1, &rules, now()), Ok(true));
        let timeout = avatar.timeout.clone().unwrap();
        assert_eq!(timeout.kind, TimeoutKind::Jail);
        assert_eq!(timeout.cost, dec!(2000));
    }

    #[test]
    fn high_risk_offence_triples_heat_and_sentence() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.wanted_level = 50;
        assert_eq!(register_offence(&mut avatar, 3, &rules, now()), Ok(true));
        assert_eq!(avatar.wanted_level, 110);
        let timeout = avatar.timeout.clone().unwrap();
        assert_eq!(timeout.until, now() + TimeDelta::minutes(15));
        assert_eq!(timeout.cost, dec!(3000));
    }

    #[test]
    fn restricted_avatar_may_only_use_matching_category() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        assert!(matches!(
            ensure_can_act(&mut avatar, ActionCategory::Work, &rules, now()),
            Err(EngineError::Restricted {
                kind: TimeoutKind::Jail,
                ..
            })
        ));
        assert!(ensure_can_act(&mut avatar, ActionCategory::Jail, &rules, now()).is_ok());
        assert!(ensure_can_act(&mut avatar, ActionCategory::Hospital, &rules, now()).is_err());
    }

    #[test]
    fn expiry_frees_without_resetting_wanted() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.wanted_level = 100;
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        let later = now() + TimeDelta::minutes(5);
        assert!(ensure_can_act(&mut avatar, ActionCategory::Work, &rules, later).is_ok());
        assert!(avatar.timeout.is_none());
        assert_eq!(avatar.wanted_level, 100);
    }

    #[test]
    fn hospital_expiry_restores_minimal_life() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.life = 0;
        hospitalize_if_dead(&mut avatar, 1, &rules, now()).unwrap();
        let later = now() + TimeDelta::minutes(10);
        assert_eq!(
            clear_if_expired(&mut avatar, &rules, later),
            Some(TimeoutKind::Hospital)
        );
        assert_eq!(avatar.life, 1);
        assert_eq!(state(&avatar, later), TimeoutState::Free);
    }

    #[test]
    fn leave_requires_timeout() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        assert_eq!(
            leave(&mut avatar, true, &rules, now()),
            Err(EngineError::NotInTimeout)
        );
    }

    #[test]
    fn free_leave_before_expiry_is_refused() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        assert!(matches!(
            leave(&mut avatar, false, &rules, now()),
            Err(EngineError::MustWaitOrPay { .. })
        ));
        assert!(avatar.timeout.is_some());
    }

    #[test]
    fn paid_leave_without_money_changes_nothing() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(4);
        avatar.money = dec!(100);
        avatar.wanted_level = 120;
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        let before = avatar.clone();
        assert_eq!(
            leave(&mut avatar, true, &rules, now()),
            Err(EngineError::InsufficientMoney {
                required: dec!(4000),
                available: dec!(100)
            })
        );
        assert_eq!(avatar, before);
    }

    #[test]
    fn paid_jail_release_resets_wanted() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.money = dec!(1500);
        avatar.wanted_level = 100;
        enter(&mut avatar, TimeoutKind::Jail, 1, &rules, now()).unwrap();
        assert_eq!(leave(&mut avatar, true, &rules, now()), Ok(dec!(1000)));
        assert_eq!(avatar.money, dec!(500));
        assert_eq!(avatar.wanted_level, 0);
        assert!(avatar.timeout.is_none());
        assert!(avatar.active);
    }

    #[test]
    fn leave_after_expiry_is_free() {
        let rules = RulesConfig::default();
        let mut avatar = avatar_at_level(1);
        avatar.life = 0;
        hospitalize_if_dead(&mut avatar, 1, &rules, now()).unwrap();
        let later = now() + TimeDelta::hours(1);
        assert_eq!(leave(&mut avatar, false, &rules, later), Ok(Decimal::ZERO));
        assert_eq!(avatar.life, 1);
        assert_eq!(avatar.money, dec!(500));
    }
}
