//! Periodic background jobs: regeneration and temporary status sweeps.
//!
//! Each job is a tokio task ticking on a fixed interval. The first tick
//! fires one full interval after spawning. Dropping or aborting the
//! returned [`JoinHandle`] stops the job.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::service::GameService;

/// Handles of the running background jobs.
#[derive(Debug)]
pub struct JobHandles {
    /// Regeneration loop.
    pub regeneration: JoinHandle<()>,
    /// Temporary status sweep loop.
    pub cooldown_sweep: JoinHandle<()>,
}

impl JobHandles {
    /// Abort both jobs.
    pub fn abort(&self) {
        self.regeneration.abort();
        self.cooldown_sweep.abort();
    }
}

/// Spawn both jobs with the given intervals.
pub fn spawn_all(
    service: &Arc<GameService>,
    regen_every: Duration,
    sweep_every: Duration,
) -> JobHandles {
    JobHandles {
        regeneration: spawn_regeneration(Arc::clone(service), regen_every),
        cooldown_sweep: spawn_cooldown_sweep(Arc::clone(service), sweep_every),
    }
}

/// Restore stamina and life on every eligible avatar once per `every`.
pub fn spawn_regeneration(service: Arc<GameService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ticker(every);
        loop {
            ticker.tick().await;
            let touched = service.regenerate_all_active().await;
            debug!(touched, "regeneration tick");
        }
    })
}

/// Clear expired temporary stats on every active avatar once per `every`.
pub fn spawn_cooldown_sweep(service: Arc<GameService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ticker(every);
        loop {
            ticker.tick().await;
            let cleared = service.sweep_expired_cooldowns().await;
            debug!(cleared, "temporary status sweep");
        }
    })
}

fn ticker(every: Duration) -> tokio::time::Interval {
    let every = every.max(Duration::from_millis(1));
    let start = Instant::now().checked_add(every).unwrap_or_else(Instant::now);
    let mut ticker = interval_at(start, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::DateTime;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use streetwise_engine::RulesConfig;
    use streetwise_types::{ActionId, ActorId};

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::builtin_catalog;

    #[tokio::test(start_paused = true)]
    async fn regeneration_job_ticks_on_interval() {
        let clock = Arc::new(FixedClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let service = Arc::new(GameService::with_rng(
            builtin_catalog().unwrap(),
            RulesConfig::default(),
            clock,
            Box::new(SmallRng::seed_from_u64(42)),
        ));
        let actor = ActorId::from("actor");
        service.create_avatar(&actor, "Mouse").await.unwrap();
        service
            .perform_action(&actor, &ActionId::from("tune-tv-channels"), 3)
            .await
            .unwrap();
        let before = service.avatar_snapshot(&actor).await.unwrap().stamina;
        assert!(before < 100);

        let handle = spawn_regeneration(Arc::clone(&service), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        let after = service.avatar_snapshot(&actor).await.unwrap().stamina;
        handle.abort();
        assert_eq!(after, before + 1);
    }
}
