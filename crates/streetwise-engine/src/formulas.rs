//! Pure arithmetic of the game: the experience curve, random variance,
//! failure chance, risk multiplier, price escalation and timeout sizing.
//!
//! Nothing here touches an [`Avatar`](streetwise_types::Avatar). Randomness
//! is always injected by the caller so results are reproducible under a
//! seeded generator.

use chrono::TimeDelta;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use streetwise_types::{StatBlock, StatKind};

use crate::config::RulesConfig;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Experience curve
// ---------------------------------------------------------------------------

/// Requirement reported for levels that cannot be reached (level 0 and below).
pub const UNREACHABLE_EXPERIENCE: u64 = 99_999_999;

/// Flat part of the curve.
const CURVE_BASE: Decimal = Decimal::from_parts(880, 0, 0, false, 0);
/// Coefficient of the exponential term.
const CURVE_EXP_COEFF: Decimal = Decimal::from_parts(120, 0, 0, false, 0);
/// Growth per level of the exponential term (1.18).
const CURVE_GROWTH: Decimal = Decimal::from_parts(118, 0, 0, false, 2);
/// Coefficient of the quadratic term.
const CURVE_QUAD_COEFF: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Experience needed, inside the previous level, to reach `level`.
///
/// An avatar at level `L` levels up once its in-level experience reaches
/// `required_experience(L + 1)`.
///
/// ```text
/// required(L) = round(880 + 120 * 1.18^L + 25 * L^2)
/// ```
///
/// Rounded half-up. Strictly increasing for `L >= 1` until the value
/// saturates at `u64::MAX` for very high levels. Level 0 returns
/// [`UNREACHABLE_EXPERIENCE`].
pub fn required_experience(level: u32) -> u64 {
    if level == 0 {
        return UNREACHABLE_EXPERIENCE;
    }
    experience_curve(level).unwrap_or(u64::MAX)
}

fn experience_curve(level: u32) -> Option<u64> {
    let l = Decimal::from(level);
    let exponential = CURVE_EXP_COEFF.checked_mul(checked_pow(CURVE_GROWTH, level)?)?;
    let quadratic = CURVE_QUAD_COEFF.checked_mul(l.checked_mul(l)?)?;
    CURVE_BASE
        .checked_add(exponential)?
        .checked_add(quadratic)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

/// Square-and-multiply exponentiation; `None` on overflow.
fn checked_pow(base: Decimal, mut exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut factor = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(factor)?;
        }
        exp >>= 1;
        if exp > 0 {
            factor = factor.checked_mul(factor)?;
        }
    }
    Some(result)
}

// ---------------------------------------------------------------------------
// Variance
// ---------------------------------------------------------------------------

/// Draw the relative offset `r * variance` with `r` uniform in `[-1, 1]`.
///
/// Returns `None` without drawing when `variance <= 0` (or NaN).
fn variance_offset(variance: f64, rng: &mut impl Rng) -> Option<Decimal> {
    if variance.is_nan() || variance <= 0.0 {
        return None;
    }
    let unit: f64 = rng.random_range(-1.0..=1.0);
    Decimal::from_f64_retain(unit * variance)
}

/// `base + base * r * variance`, rounded to cents.
///
/// A non-positive variance returns `base` unchanged.
pub fn vary_money(base: Decimal, variance: f64, rng: &mut impl Rng) -> Decimal {
    let Some(offset) = variance_offset(variance, rng) else {
        return base;
    };
    base.checked_mul(offset)
        .and_then(|delta| base.checked_add(delta))
        .map_or(base, |v| {
            v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        })
}

/// `base + base * r * variance`, rounded to a whole number.
///
/// A non-positive variance returns `base` unchanged.
pub fn vary_points(base: i64, variance: f64, rng: &mut impl Rng) -> i64 {
    let Some(offset) = variance_offset(variance, rng) else {
        return base;
    };
    let b = Decimal::from(base);
    b.checked_mul(offset)
        .and_then(|delta| b.checked_add(delta))
        .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|v| v.to_i64())
        .unwrap_or(base)
}

// ---------------------------------------------------------------------------
// Failure chance
// ---------------------------------------------------------------------------

/// Percentage points added per point of a stat below its requirement.
pub const UNDER_QUALIFIED_PENALTY: f64 = 5.0;
/// Percentage points removed per point of a stat above its requirement.
pub const OVER_QUALIFIED_BONUS: f64 = 1.0;
/// Percentage points added per negative effective stat.
pub const NEGATIVE_STAT_PENALTY: f64 = 5.0;

/// Failure probability (0--1) of an attempt.
///
/// Starts from `base * 100` percentage points and walks the four stats:
/// under-qualification adds [`UNDER_QUALIFIED_PENALTY`] per point,
/// over-qualification removes [`OVER_QUALIFIED_BONUS`] per point, and each
/// negative effective stat adds [`NEGATIVE_STAT_PENALTY`]. The result is
/// clamped to `[0, 1]`.
///
/// Non-increasing in every effective stat, non-decreasing in every
/// requirement.
pub fn failure_chance(base: f64, required: &StatBlock, effective: &StatBlock) -> f64 {
    let mut points = base * 100.0;
    for kind in StatKind::ALL {
        let req = f64::from(required.get(kind));
        let eff = f64::from(effective.get(kind));
        if req > eff {
            points += (req - eff) * UNDER_QUALIFIED_PENALTY;
        } else if eff > req {
            points -= (eff - req) * OVER_QUALIFIED_BONUS;
        }
        if eff < 0.0 {
            points += NEGATIVE_STAT_PENALTY;
        }
    }
    clamp_unit(points / 100.0)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Draw whether an attempt with the given failure chance fails.
///
/// A chance of zero never fails and consumes no randomness.
pub fn roll_failure(chance: f64, rng: &mut impl Rng) -> bool {
    if chance.is_nan() || chance <= 0.0 {
        return false;
    }
    rng.random::<f64>() < chance
}

/// Penalty multiplier: high-risk attempts hit harder.
pub fn risk_multiplier(chance: f64, rules: &RulesConfig) -> u32 {
    if chance > rules.high_risk_threshold {
        rules.high_risk_multiplier
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// Add a signed delta to a bounded resource, clamping to `[0, max]`.
pub fn apply_bounded(current: u32, delta: i64, max: u32) -> u32 {
    let raw = i64::from(current).saturating_add(delta);
    let clamped = raw.clamp(0, i64::from(max));
    u32::try_from(clamped).unwrap_or(max)
}

/// Add a signed delta to money, flooring at zero.
pub fn apply_money(current: Decimal, delta: Decimal) -> Result<Decimal, EngineError> {
    let raw = current
        .checked_add(delta)
        .ok_or_else(|| EngineError::overflow("money delta overflow"))?;
    Ok(raw.max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Prices and timeouts
// ---------------------------------------------------------------------------

/// Next price of a special status after one more purchase.
///
/// Prices are stored negative (a cost); the magnitude grows by `factor`.
pub fn escalate_price(current: Decimal, factor: Decimal) -> Result<Decimal, EngineError> {
    let mut price = current
        .abs()
        .checked_mul(factor)
        .ok_or_else(|| EngineError::overflow("price escalation overflow"))?;
    price.set_sign_negative(true);
    Ok(price)
}

/// Length of a timeout: `minutes_per_level * max(1, level) * multiplier` minutes.
pub fn timeout_duration(level: u32, multiplier: u32, rules: &RulesConfig) -> TimeDelta {
    let minutes = i64::from(rules.timeout_minutes_per_level)
        .saturating_mul(i64::from(level.max(1)))
        .saturating_mul(i64::from(multiplier));
    TimeDelta::try_minutes(minutes).unwrap_or(TimeDelta::MAX)
}

/// Early-release cost: `per_level * max(1, level) * multiplier`.
pub fn timeout_cost(
    per_level: Decimal,
    level: u32,
    multiplier: u32,
) -> Result<Decimal, EngineError> {
    per_level
        .checked_mul(Decimal::from(level.max(1)))
        .and_then(|v| v.checked_mul(Decimal::from(multiplier)))
        .ok_or_else(|| EngineError::overflow("timeout cost overflow"))
}
