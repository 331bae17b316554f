//! Resolution of a single action attempt.
//!
//! # Order of operations
//!
//! 1. Special effects short-circuit the pipeline and always succeed
//! 2. Apply the stamina delta
//! 3. Apply the (varied) life delta
//! 4. Hospitalize if life reached zero
//! 5. Compute the failure chance from effective stats
//! 6. Draw failure: lose life, maybe hospitalize, maybe raise heat or jail
//! 7. On success: money, experience (with level-ups), temporary grants
//!
//! Affordability and timeout restrictions are checked by the caller
//! (see [`crate::execution`]).

use chrono::{DateTime, Utc};
use rand::Rng;
use streetwise_types::{
    ActionCategory, ActionDefinition, AttemptOutcome, Avatar, SpecialEffect, StatKind,
};
use tracing::{debug, info};

use crate::avatar::{
    clear_temporary, effective_stats, grant_temporary, increase_experience, reduce_experience,
};
use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::formulas::{
    apply_money, failure_chance, risk_multiplier, roll_failure, vary_money, vary_points,
};
use crate::pricing::PurchaseLedger;
use crate::timeout;
use crate::vitals::{apply_life, apply_stamina};

/// Failure chance of `action` for `avatar` right now.
///
/// Risk-free categories and special effects never fail.
pub fn chance_for(avatar: &mut Avatar, action: &ActionDefinition, now: DateTime<Utc>) -> f64 {
    if action.category.is_risk_free() || action.special_effect.is_some() {
        return 0.0;
    }
    let effective = effective_stats(avatar, now);
    failure_chance(action.failure_chance, &action.requirements, &effective)
}

/// Resolve one attempt of `action`, mutating the avatar and its purchase
/// ledger in place.
///
/// A returned error is an internal fault; the caller must discard any
/// partial mutation.
pub fn resolve(
    avatar: &mut Avatar,
    purchases: &mut PurchaseLedger,
    action: &ActionDefinition,
    rules: &RulesConfig,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<AttemptOutcome, EngineError> {
    if let Some(effect) = action.special_effect {
        apply_special_effect(avatar, purchases, action, effect, rules, now)?;
        return Ok(AttemptOutcome::Success);
    }

    apply_stamina(avatar, i64::from(action.stamina), rules);
    if action.hp != 0 {
        let hp = vary_points(i64::from(action.hp), action.hp_variation, rng);
        apply_life(avatar, hp, rules);
    }
    if timeout::hospitalize_if_dead(avatar, 1, rules, now)? {
        info!(avatar_id = %avatar.id, action_id = %action.id, "collapsed while acting");
        return Ok(AttemptOutcome::Hospitalized);
    }

    let chance = chance_for(avatar, action, now);
    if roll_failure(chance, rng) {
        return handle_failure(avatar, action, chance, rules, now, rng);
    }

    handle_success(avatar, purchases, action, rules, now, rng)?;
    Ok(AttemptOutcome::Success)
}

fn handle_failure(
    avatar: &mut Avatar,
    action: &ActionDefinition,
    chance: f64,
    rules: &RulesConfig,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<AttemptOutcome, EngineError> {
    let multiplier = risk_multiplier(chance, rules);
    debug!(
        avatar_id = %avatar.id,
        action_id = %action.id,
        chance,
        multiplier,
        "attempt failed"
    );

    if action.lost_hp_failure > 0 {
        let loss = vary_points(
            i64::from(action.lost_hp_failure),
            action.lost_hp_failure_variation,
            rng,
        )
        .max(0)
        .saturating_mul(i64::from(multiplier));
        apply_life(avatar, loss.saturating_neg(), rules);
    }

    if timeout::hospitalize_if_dead(avatar, multiplier, rules, now)? {
        return Ok(AttemptOutcome::Hospitalized);
    }
    if action.can_be_arrested && timeout::register_offence(avatar, multiplier, rules, now)? {
        return Ok(AttemptOutcome::Arrested);
    }
    Ok(AttemptOutcome::Failure)
}

fn handle_success(
    avatar: &mut Avatar,
    purchases: &PurchaseLedger,
    action: &ActionDefinition,
    rules: &RulesConfig,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<(), EngineError> {
    let price = purchases.current_price(action);
    if !price.is_zero() {
        let delta = vary_money(price, action.money_variation, rng);
        avatar.money = apply_money(avatar.money, delta)?;
    }

    if action.xp > 0 {
        let base = i64::try_from(action.xp).unwrap_or(i64::MAX);
        let xp = vary_points(base, action.xp_variation, rng).max(0);
        let gained = increase_experience(avatar, u64::try_from(xp).unwrap_or(0));
        if gained > 0 {
            info!(avatar_id = %avatar.id, level = avatar.level, gained, "avatar levelled up");
        }
    }

    grant_temporary(avatar, &action.temporary, rules, now);
    Ok(())
}

// ---------------------------------------------------------------------------
// Special effects
// ---------------------------------------------------------------------------

fn apply_special_effect(
    avatar: &mut Avatar,
    purchases: &mut PurchaseLedger,
    action: &ActionDefinition,
    effect: SpecialEffect,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    let price = purchases.current_price(action);
    if !price.is_zero() {
        avatar.money = apply_money(avatar.money, price)?;
    }

    match (effect, effect.purchased_stat()) {
        (_, Some(stat)) => buy_stat(avatar, purchases, action, stat, rules)?,
        (SpecialEffect::ClearTemporaryStatus, None) => clear_temporary(avatar),
        (SpecialEffect::VoluntaryWork, None) => voluntary_work(avatar, rules, now)?,
        (_, None) => {}
    }
    debug!(avatar_id = %avatar.id, action_id = %action.id, effect = ?effect, "special effect applied");
    Ok(())
}

/// Permanent +1 to `stat`, escalating the seller's price for this avatar.
fn buy_stat(
    avatar: &mut Avatar,
    purchases: &mut PurchaseLedger,
    action: &ActionDefinition,
    stat: StatKind,
    rules: &RulesConfig,
) -> Result<(), EngineError> {
    let value = avatar.stats.get_mut(stat);
    *value = value.saturating_add(1);
    if action.category == ActionCategory::SpecialStatusSeller {
        purchases.record_purchase(avatar.id, action, rules)?;
    }
    Ok(())
}

/// Work off heat at the cost of life, stamina and a share of lifetime
/// experience.
///
/// The experience penalty is `pct` percent of the lifetime total, rounded
/// down. A jailed avatar keeps its sentence even if the work takes its last
/// life point.
fn voluntary_work(
    avatar: &mut Avatar,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    avatar.wanted_level = avatar
        .wanted_level
        .saturating_sub(rules.voluntary_work_wanted_reduction);
    apply_life(avatar, i64::from(rules.voluntary_work_life_cost).saturating_neg(), rules);
    apply_stamina(avatar, i64::from(rules.voluntary_work_stamina_cost).saturating_neg(), rules);

    let penalty = avatar
        .total_experience
        .saturating_mul(u64::from(rules.voluntary_work_xp_penalty_pct))
        .checked_div(100)
        .unwrap_or(0);
    reduce_experience(avatar, penalty);

    timeout::hospitalize_if_dead(avatar, 1, rules, now)?;
    Ok(())
}
