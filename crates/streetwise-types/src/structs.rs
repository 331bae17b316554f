//! Core entity structs: avatars, stat blocks, timeouts and purchase records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{StatKind, TimeoutKind};
use crate::ids::{ActionId, ActorId, AvatarId};
use crate::serde_util::null_as_default;

// ---------------------------------------------------------------------------
// StatBlock
// ---------------------------------------------------------------------------

/// One signed value per attribute.
///
/// Used for permanent stats, temporary deltas, catalog requirements and
/// temporary grants alike. Missing or `null` entries deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatBlock {
    /// Strength value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub strength: i32,
    /// Intelligence value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub intelligence: i32,
    /// Charisma value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub charisma: i32,
    /// Stealth value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stealth: i32,
}

impl StatBlock {
    /// A block with every stat at zero.
    pub const ZERO: Self = Self {
        strength: 0,
        intelligence: 0,
        charisma: 0,
        stealth: 0,
    };

    /// Read one stat.
    pub const fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Intelligence => self.intelligence,
            StatKind::Charisma => self.charisma,
            StatKind::Stealth => self.stealth,
        }
    }

    /// Mutable access to one stat.
    pub const fn get_mut(&mut self, kind: StatKind) -> &mut i32 {
        match kind {
            StatKind::Strength => &mut self.strength,
            StatKind::Intelligence => &mut self.intelligence,
            StatKind::Charisma => &mut self.charisma,
            StatKind::Stealth => &mut self.stealth,
        }
    }

    /// Whether every stat is zero.
    pub const fn is_zero(&self) -> bool {
        self.strength == 0 && self.intelligence == 0 && self.charisma == 0 && self.stealth == 0
    }

    /// Per-stat saturating sum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            strength: self.strength.saturating_add(other.strength),
            intelligence: self.intelligence.saturating_add(other.intelligence),
            charisma: self.charisma.saturating_add(other.charisma),
            stealth: self.stealth.saturating_add(other.stealth),
        }
    }

    /// Per-stat saturating difference (`self - other`).
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self {
            strength: self.strength.saturating_sub(other.strength),
            intelligence: self.intelligence.saturating_sub(other.intelligence),
            charisma: self.charisma.saturating_sub(other.charisma),
            stealth: self.stealth.saturating_sub(other.stealth),
        }
    }

    /// Iterate `(kind, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i32)> + '_ {
        StatKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

// ---------------------------------------------------------------------------
// Timeout
// ---------------------------------------------------------------------------

/// An active (or not yet cleared) hospital or jail restriction.
///
/// Kind and expiry live in one value so "expiry set" and "kind set" can
/// never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Timeout {
    /// Hospital or jail.
    pub kind: TimeoutKind,
    /// Instant at which the restriction lapses on its own.
    pub until: DateTime<Utc>,
    /// Money required to leave before `until`.
    #[ts(as = "String")]
    pub cost: Decimal,
}

// ---------------------------------------------------------------------------
// Avatar
// ---------------------------------------------------------------------------

/// The player's persistent character.
///
/// Mutated only by the action processor, the timeout state machine, and
/// the background regeneration and cooldown jobs. Every mutation path runs
/// under the store's per-avatar lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Avatar {
    /// Unique avatar identifier.
    pub id: AvatarId,
    /// Actor that owns this avatar.
    pub actor_id: ActorId,
    /// Display name, unique among active avatars.
    pub name: String,
    /// `false` once soft-deleted.
    pub active: bool,
    /// Current level (starts at 1).
    pub level: u32,
    /// Experience accumulated inside the current level.
    pub experience: u64,
    /// Lifetime experience.
    pub total_experience: u64,
    /// Experience needed inside the current level to reach the next one.
    pub next_level_experience: u64,
    /// Stamina (0--100).
    pub stamina: u32,
    /// Life (0--100). Reaching 0 hospitalizes the avatar.
    pub life: u32,
    /// Money on hand, never negative.
    #[ts(as = "String")]
    pub money: Decimal,
    /// Permanent stats.
    pub stats: StatBlock,
    /// Unallocated skill points earned on level-up.
    pub skill_points: u32,
    /// Temporary stat deltas, all cleared together when `status_cooldown` passes.
    pub temporary: StatBlock,
    /// Expiry of the temporary deltas, if any are active.
    pub status_cooldown: Option<DateTime<Utc>>,
    /// Current hospital or jail restriction.
    pub timeout: Option<Timeout>,
    /// Accumulated heat from failed arrestable actions.
    pub wanted_level: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PurchaseRecord
// ---------------------------------------------------------------------------

/// Escalating price state for one (avatar, action) pair.
///
/// Created on the first purchase of a `SPECIAL_STATUS_SELLER` action and
/// updated on every later purchase. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseRecord {
    /// Buyer.
    pub avatar_id: AvatarId,
    /// Purchased action.
    pub action_id: ActionId,
    /// Number of completed purchases.
    pub purchase_count: u32,
    /// Price of the next purchase (negative: a cost).
    #[ts(as = "String")]
    pub current_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_block_accessors_round_trip() {
        let mut block = StatBlock::ZERO;
        for (offset, kind) in (1..).zip(StatKind::ALL) {
            *block.get_mut(kind) = offset;
        }
        assert_eq!(block.strength, 1);
        assert_eq!(block.intelligence, 2);
        assert_eq!(block.charisma, 3);
        assert_eq!(block.stealth, 4);
        assert_eq!(block.get(StatKind::Charisma), 3);
        assert!(!block.is_zero());
    }

    #[test]
    fn stat_block_missing_and_null_fields_are_zero() {
        let block: StatBlock =
            serde_json::from_str(r#"{"strength": 3, "charisma": null}"#).unwrap_or_default();
        assert_eq!(block.strength, 3);
        assert_eq!(block.charisma, 0);
        assert_eq!(block.intelligence, 0);
        assert_eq!(block.stealth, 0);
    }

    #[test]
    fn stat_block_saturating_math() {
        let a = StatBlock {
            strength: i32::MAX,
            intelligence: 2,
            charisma: -1,
            stealth: 0,
        };
        let b = StatBlock {
            strength: 1,
            intelligence: 3,
            charisma: -2,
            stealth: 5,
        };
        let sum = a.saturating_add(b);
        assert_eq!(sum.strength, i32::MAX);
        assert_eq!(sum.intelligence, 5);
        assert_eq!(sum.charisma, -3);
        assert_eq!(sum.saturating_sub(b).stealth, 0);
    }
}
