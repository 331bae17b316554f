//! Avatar state rules: creation, effective stats, the experience ladder,
//! temporary status grants and skill point allocation.

use chrono::{DateTime, TimeDelta, Utc};
use streetwise_types::{ActorId, Avatar, AvatarId, StatBlock, StatKind};
use tracing::debug;

use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::formulas::required_experience;

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Validate and normalize an avatar name.
///
/// Surrounding whitespace is trimmed. Empty names and names longer than
/// [`RulesConfig::max_name_len`] characters are rejected.
pub fn normalize_name(name: &str, rules: &RulesConfig) -> Result<String, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > rules.max_name_len {
        return Err(EngineError::InvalidName(String::from(name)));
    }
    Ok(String::from(trimmed))
}

/// Build a fresh level-1 avatar with starting resources and zero stats.
///
/// Name uniqueness is the store's concern and is not checked here.
pub fn new_avatar(
    actor_id: ActorId,
    name: &str,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Result<Avatar, EngineError> {
    let name = normalize_name(name, rules)?;
    Ok(Avatar {
        id: AvatarId::new(),
        actor_id,
        name,
        active: true,
        level: 1,
        experience: 0,
        total_experience: 0,
        next_level_experience: required_experience(2),
        stamina: rules.starting_stamina.min(rules.max_resource),
        life: rules.starting_life.min(rules.max_resource),
        money: rules.starting_money,
        stats: StatBlock::ZERO,
        skill_points: 0,
        temporary: StatBlock::ZERO,
        status_cooldown: None,
        timeout: None,
        wanted_level: 0,
        created_at: now,
    })
}

// ---------------------------------------------------------------------------
// Effective stats and temporary status
// ---------------------------------------------------------------------------

/// Clear temporary deltas whose cooldown has passed.
///
/// Returns `true` if anything was cleared.
pub fn expire_temporary(avatar: &mut Avatar, now: DateTime<Utc>) -> bool {
    match avatar.status_cooldown {
        Some(until) if now >= until => {
            clear_temporary(avatar);
            true
        }
        _ => false,
    }
}

/// Drop every temporary delta and the cooldown.
pub const fn clear_temporary(avatar: &mut Avatar) {
    avatar.temporary = StatBlock::ZERO;
    avatar.status_cooldown = None;
}

/// Permanent plus temporary value of one stat.
///
/// Expired temporary deltas are cleared first, so a read never observes a
/// stale buff.
pub fn effective_stat(avatar: &mut Avatar, kind: StatKind, now: DateTime<Utc>) -> i32 {
    expire_temporary(avatar, now);
    avatar
        .stats
        .get(kind)
        .saturating_add(avatar.temporary.get(kind))
}

/// All four effective stats (see [`effective_stat`]).
pub fn effective_stats(avatar: &mut Avatar, now: DateTime<Utc>) -> StatBlock {
    expire_temporary(avatar, now);
    avatar.stats.saturating_add(avatar.temporary)
}

/// Add temporary deltas and restart the shared cooldown.
///
/// Returns `false` (and changes nothing) when `grant` is all zeros.
pub fn grant_temporary(
    avatar: &mut Avatar,
    grant: &StatBlock,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> bool {
    if grant.is_zero() {
        return false;
    }
    expire_temporary(avatar, now);
    avatar.temporary = avatar.temporary.saturating_add(*grant);
    let window = TimeDelta::try_hours(i64::from(rules.temporary_status_hours))
        .unwrap_or(TimeDelta::MAX);
    avatar.status_cooldown = Some(
        now.checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    );
    true
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// Credit experience and process every level-up it triggers.
///
/// Each level-up carries the overflow into the new level, awards one skill
/// point and recomputes the requirement from the curve. Returns the number
/// of levels gained.
pub fn increase_experience(avatar: &mut Avatar, amount: u64) -> u32 {
    avatar.experience = avatar.experience.saturating_add(amount);
    avatar.total_experience = avatar.total_experience.saturating_add(amount);

    if avatar.next_level_experience == 0 {
        avatar.next_level_experience = required_experience(avatar.level.saturating_add(1));
    }

    let mut gained: u32 = 0;
    while avatar.experience >= avatar.next_level_experience && avatar.level < u32::MAX {
        avatar.experience = avatar.experience.saturating_sub(avatar.next_level_experience);
        avatar.level = avatar.level.saturating_add(1);
        avatar.skill_points = avatar.skill_points.saturating_add(1);
        avatar.next_level_experience = required_experience(avatar.level.saturating_add(1));
        gained = gained.saturating_add(1);
        debug!(avatar_id = %avatar.id, level = avatar.level, "level up");
    }
    gained
}

/// Remove experience from both the in-level and lifetime counters.
///
/// Never removes a level; both counters floor at zero.
pub const fn reduce_experience(avatar: &mut Avatar, amount: u64) {
    avatar.experience = avatar.experience.saturating_sub(amount);
    avatar.total_experience = avatar.total_experience.saturating_sub(amount);
}

// ---------------------------------------------------------------------------
// Skill allocation
// ---------------------------------------------------------------------------

/// Raise permanent stats to `targets`, spending one skill point per point.
///
/// Returns the number of points spent. Rejected without any change if a
/// target lies below the current value or the total exceeds the available
/// points.
pub fn allocate_points(avatar: &mut Avatar, targets: &StatBlock) -> Result<u32, EngineError> {
    if avatar.skill_points == 0 {
        return Err(EngineError::NoSkillPoints);
    }

    let mut requested: u32 = 0;
    for (stat, target) in targets.iter() {
        let current = avatar.stats.get(stat);
        if target < current {
            return Err(EngineError::StatDecrease {
                stat,
                current,
                requested: target,
            });
        }
        let step = u32::try_from(i64::from(target).saturating_sub(i64::from(current)))
            .unwrap_or(u32::MAX);
        requested = requested
            .checked_add(step)
            .ok_or_else(|| EngineError::overflow("skill allocation total"))?;
    }

    if requested > avatar.skill_points {
        return Err(EngineError::NotEnoughSkillPoints {
            requested,
            available: avatar.skill_points,
        });
    }

    avatar.stats = *targets;
    avatar.skill_points = avatar.skill_points.saturating_sub(requested);
    Ok(requested)
}

/// Spend `points` skill points on a single permanent stat.
///
/// Same rejections as [`allocate_points`] with every other stat unchanged.
pub fn raise_stat(avatar: &mut Avatar, stat: StatKind, points: u32) -> Result<u32, EngineError> {
    let mut targets = avatar.stats;
    let value = targets.get_mut(stat);
    *value = i32::try_from(points)
        .ok()
        .and_then(|points| value.checked_add(points))
        .ok_or_else(|| EngineError::overflow("stat raise"))?;
    allocate_points(avatar, &targets)
}
