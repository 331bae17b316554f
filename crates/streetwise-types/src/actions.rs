//! Action catalog entries and the request/result payloads built around them.
//!
//! [`ActionDefinition`] is the static, read-only description of one
//! performable action. The engine never mutates it. Every numeric field is
//! optional in the catalog file: absent or `null` reads as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionCategory, AttemptOutcome, SpecialEffect, TimeoutState};
use crate::ids::ActionId;
use crate::serde_util::null_as_default;
use crate::structs::{Avatar, StatBlock};

// ---------------------------------------------------------------------------
// ActionDefinition
// ---------------------------------------------------------------------------

/// One entry of the action catalog.
///
/// Sign convention: positive deltas are gains, negative deltas are costs.
/// Variances are fractions (`0.5` means +/-50%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionDefinition {
    /// Stable catalog slug.
    pub id: ActionId,
    /// Catalog section.
    pub category: ActionCategory,
    /// Display title.
    pub title: String,
    /// Stamina delta applied on every attempt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stamina: i32,
    /// Life delta applied on every attempt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hp: i32,
    /// Variance of `hp`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hp_variation: f64,
    /// Money delta applied on success (catalog price for purchases).
    #[serde(default, deserialize_with = "null_as_default")]
    #[ts(as = "String")]
    pub money: Decimal,
    /// Variance of `money`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub money_variation: f64,
    /// Experience granted on success.
    #[serde(default, deserialize_with = "null_as_default")]
    pub xp: u64,
    /// Variance of `xp`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub xp_variation: f64,
    /// Minimum effective stats below which failure risk climbs steeply.
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: StatBlock,
    /// Base failure probability as a fraction (`0.30` = 30%).
    #[serde(default, deserialize_with = "null_as_default")]
    pub failure_chance: f64,
    /// Whether a failed attempt raises the wanted level.
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_be_arrested: bool,
    /// Life lost on a failed attempt, before the risk multiplier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lost_hp_failure: u32,
    /// Variance of `lost_hp_failure`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lost_hp_failure_variation: f64,
    /// Temporary stat deltas granted on success.
    #[serde(default, deserialize_with = "null_as_default")]
    pub temporary: StatBlock,
    /// Effect that replaces the normal pipeline, if any.
    #[serde(default)]
    pub special_effect: Option<SpecialEffect>,
    /// Level above which the action is no longer worth doing (display hint).
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_max_level: u32,
}

impl ActionDefinition {
    /// A blank action of the given category: every delta zero, no effect.
    ///
    /// Mostly useful as a base for struct-update syntax.
    pub fn blank(id: impl Into<ActionId>, category: ActionCategory, title: &str) -> Self {
        Self {
            id: id.into(),
            category,
            title: String::from(title),
            stamina: 0,
            hp: 0,
            hp_variation: 0.0,
            money: Decimal::ZERO,
            money_variation: 0.0,
            xp: 0,
            xp_variation: 0.0,
            requirements: StatBlock::ZERO,
            failure_chance: 0.0,
            can_be_arrested: false,
            lost_hp_failure: 0,
            lost_hp_failure_variation: 0.0,
            temporary: StatBlock::ZERO,
            special_effect: None,
            recommended_max_level: 0,
        }
    }

    /// Stamina the avatar must hold before attempting (0 for stamina gains).
    pub fn stamina_cost(&self) -> u32 {
        if self.stamina < 0 {
            self.stamina.unsigned_abs()
        } else {
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Views and reports
// ---------------------------------------------------------------------------

/// A catalog entry as seen by one avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionView {
    /// The static catalog entry.
    pub action: ActionDefinition,
    /// Failure probability for this avatar right now (0--1).
    pub failure_chance: f64,
    /// Money delta this avatar would pay or earn, dynamic for purchases.
    #[ts(as = "String")]
    pub price: Decimal,
}

/// Net change of every tracked resource across a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDeltas {
    /// Lifetime experience gained (negative after voluntary work).
    pub experience: i64,
    /// Levels gained.
    pub level: i64,
    /// Life change.
    pub life: i64,
    /// Stamina change.
    pub stamina: i64,
    /// Money change.
    #[ts(as = "String")]
    pub money: Decimal,
    /// Temporary stat changes.
    pub temporary: StatBlock,
    /// Wanted level change.
    pub wanted_level: i64,
}

impl ResourceDeltas {
    /// Compute the deltas between two snapshots of the same avatar.
    pub fn between(before: &Avatar, after: &Avatar) -> Self {
        Self {
            experience: signed_delta(before.total_experience, after.total_experience),
            level: i64::from(after.level).saturating_sub(i64::from(before.level)),
            life: i64::from(after.life).saturating_sub(i64::from(before.life)),
            stamina: i64::from(after.stamina).saturating_sub(i64::from(before.stamina)),
            money: after
                .money
                .checked_sub(before.money)
                .unwrap_or(Decimal::ZERO),
            temporary: after.temporary.saturating_sub(before.temporary),
            wanted_level: i64::from(after.wanted_level)
                .saturating_sub(i64::from(before.wanted_level)),
        }
    }
}

/// `after - before` for unsigned counters, saturating into `i64`.
fn signed_delta(before: u64, after: u64) -> i64 {
    let before = i64::try_from(before).unwrap_or(i64::MAX);
    let after = i64::try_from(after).unwrap_or(i64::MAX);
    after.saturating_sub(before)
}

/// Result of a `perform_action` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionReport {
    /// The action that was run.
    pub action_id: ActionId,
    /// Whether the last executed attempt succeeded.
    pub success: bool,
    /// How the last executed attempt ended.
    pub outcome: AttemptOutcome,
    /// Attempts actually executed (at most the requested repeat count).
    pub attempts_executed: u32,
    /// Net resource changes across every executed attempt.
    pub deltas: ResourceDeltas,
    /// Avatar state after the request.
    pub avatar: Avatar,
    /// Restriction state after the request.
    pub timeout_state: TimeoutState,
    /// Money delta of the next attempt of the same action.
    #[ts(as = "String")]
    pub next_price: Decimal,
    /// Failure chance of the next attempt of the same action.
    pub next_failure_chance: f64,
}

/// Result of a `leave_timeout` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaveReport {
    /// Always `true`; rejections are returned as errors.
    pub success: bool,
    /// Money paid for early release (zero when the timeout had expired).
    #[ts(as = "String")]
    pub paid: Decimal,
    /// Avatar state after release.
    pub avatar: Avatar,
}
