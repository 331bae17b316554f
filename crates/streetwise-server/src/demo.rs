//! Demo avatars created at startup so a fresh server has a populated
//! leaderboard.

use streetwise_core::{GameService, ServiceError};
use streetwise_engine::required_experience;
use rust_decimal::Decimal;
use streetwise_types::{ActorId, Avatar, StatBlock};
use tracing::info;

/// Names of the demo avatars, in ascending level order.
pub const DEMO_NAMES: [&str; 5] = [
    "ByteSurfer",
    "CodeNinja",
    "GlitchGhost",
    "NullPointer",
    "RootOverlord",
];

/// Levels gained per position in [`DEMO_NAMES`].
const LEVEL_STEP: u32 = 5;

/// Money granted per position in [`DEMO_NAMES`].
const MONEY_STEP: u32 = 1000;

/// Lifetime experience credited per level.
const EXPERIENCE_PER_LEVEL: u64 = 1000;

/// Create one active avatar per demo name, each owned by its own
/// `demo-<name>` actor, at levels 5, 10, 15 and so on.
///
/// A demo avatar at level `L` in position `n` (from 1) gets intelligence
/// `2L`, every other stat `L`, `L` skill points, `1000 n` money and
/// `1000 L` lifetime experience. Returns how many avatars were created.
pub async fn seed_demo_avatars(service: &GameService) -> Result<usize, ServiceError> {
    let mut created: usize = 0;
    for (position, name) in (1u32..).zip(DEMO_NAMES) {
        let actor = ActorId::from(format!("demo-{}", name.to_lowercase()));
        let avatar = service.create_avatar(&actor, name).await?;
        if let Some(handle) = service.store().handle(&avatar.id).await {
            let mut record = handle.lock().await;
            apply_profile(&mut record.avatar, position);
        }
        created = created.saturating_add(1);
    }
    info!(count = created, "demo avatars seeded");
    Ok(created)
}

fn apply_profile(avatar: &mut Avatar, position: u32) {
    let level = position.saturating_mul(LEVEL_STEP);
    let stat = i32::try_from(level).unwrap_or(i32::MAX);
    avatar.level = level;
    avatar.experience = 0;
    avatar.next_level_experience = required_experience(level.saturating_add(1));
    avatar.total_experience = u64::from(level).saturating_mul(EXPERIENCE_PER_LEVEL);
    avatar.skill_points = level;
    avatar.money = Decimal::from(position.saturating_mul(MONEY_STEP));
    avatar.stats = StatBlock {
        strength: stat,
        intelligence: stat.saturating_mul(2),
        charisma: stat,
        stealth: stat,
    };
}
