//! The game service: every operation a player or a background job can
//! invoke.
//!
//! [`GameService`] ties the avatar store, the catalog, the rules, a clock
//! and a random generator together. Each mutating operation locks one
//! avatar, works on a copy of its record, and writes the copy back only
//! when the engine succeeds. A rejected request therefore leaves the avatar
//! exactly as it was.

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use streetwise_engine::{ActionCatalog, EngineError, RulesConfig, avatar, execution, timeout, vitals};
use streetwise_types::{
    ActionCategory, ActionId, ActionReport, ActionView, ActorId, Avatar, AvatarId, LeaveReport,
    PurchaseRecord, StatBlock, StatKind,
};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::store::{AvatarStore, StoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Coarse classification of a [`ServiceError`] for transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A business rule refused the request. Nothing changed.
    Rejected,
    /// The actor has no active avatar, or the action does not exist.
    NotFound,
    /// An unexpected internal fault.
    Internal,
}

/// Errors returned by [`GameService`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The actor has no active avatar.
    #[error("no active avatar for actor {0}")]
    AvatarNotFound(ActorId),

    /// The catalog has no action with this id.
    #[error("unknown action: {0}")]
    ActionNotFound(ActionId),

    /// The engine refused or failed the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NameTaken(name) => Self::Engine(EngineError::NameTaken(name)),
        }
    }
}

impl ServiceError {
    /// Classify the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AvatarNotFound(_) | Self::ActionNotFound(_) => ErrorKind::NotFound,
            Self::Engine(err) if err.is_rejection() => ErrorKind::Rejected,
            Self::Engine(_) => ErrorKind::Internal,
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Entry point for every avatar operation.
pub struct GameService {
    store: AvatarStore,
    catalog: ActionCatalog,
    rules: RulesConfig,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl core::fmt::Debug for GameService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameService")
            .field("catalog_actions", &self.catalog.len())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl GameService {
    /// Build a service with a seeded (or OS-seeded) standard generator.
    pub fn new(
        catalog: ActionCatalog,
        rules: RulesConfig,
        clock: Arc<dyn Clock>,
        seed: Option<u64>,
    ) -> Self {
        let rng: StdRng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(catalog, rules, clock, Box::new(rng))
    }

    /// Build a service around an arbitrary random generator.
    pub fn with_rng(
        catalog: ActionCatalog,
        rules: RulesConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            store: AvatarStore::new(),
            catalog,
            rules,
            clock,
            rng: Mutex::new(rng),
        }
    }

    /// The loaded catalog.
    pub const fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// The rules in force.
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// The underlying store.
    pub const fn store(&self) -> &AvatarStore {
        &self.store
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Create a fresh active avatar for `actor`, replacing any previous one.
    pub async fn create_avatar(&self, actor: &ActorId, name: &str) -> Result<Avatar, ServiceError> {
        let avatar = avatar::new_avatar(actor.clone(), name, &self.rules, self.clock.now())?;
        let snapshot = avatar.clone();
        let replaced = self.store.insert_active(avatar).await?;
        info!(
            actor = %actor,
            avatar_id = %snapshot.id,
            name = %snapshot.name,
            replaced = ?replaced,
            "avatar created"
        );
        Ok(snapshot)
    }

    /// Soft-delete the actor's active avatar.
    pub async fn deactivate_avatar(&self, actor: &ActorId) -> Result<AvatarId, ServiceError> {
        let id = self
            .store
            .deactivate(actor)
            .await
            .ok_or_else(|| ServiceError::AvatarNotFound(actor.clone()))?;
        info!(actor = %actor, avatar_id = %id, "avatar deactivated");
        Ok(id)
    }

    /// Current state of the actor's avatar.
    ///
    /// Expired timeouts and temporary stats are cleared first.
    pub async fn avatar_snapshot(&self, actor: &ActorId) -> Result<Avatar, ServiceError> {
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let now = self.clock.now();
        timeout::clear_if_expired(&mut record.avatar, &self.rules, now);
        avatar::expire_temporary(&mut record.avatar, now);
        Ok(record.avatar.clone())
    }

    /// Special status purchase records of the actor's avatar.
    pub async fn purchase_records(
        &self,
        actor: &ActorId,
    ) -> Result<Vec<PurchaseRecord>, ServiceError> {
        let handle = self.active_handle(actor).await?;
        let record = handle.lock().await;
        Ok(record.purchases.records().cloned().collect())
    }

    /// Spend skill points to raise permanent stats to `targets`.
    pub async fn allocate_points(
        &self,
        actor: &ActorId,
        targets: &StatBlock,
    ) -> Result<Avatar, ServiceError> {
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let mut updated = record.avatar.clone();
        let spent = avatar::allocate_points(&mut updated, targets)?;
        record.avatar = updated;
        info!(actor = %actor, avatar_id = %record.avatar.id, spent, "skill points allocated");
        Ok(record.avatar.clone())
    }

    /// Spend `points` skill points on the stat named `stat`.
    ///
    /// The stat name is matched case-insensitively.
    pub async fn allocate_stat(
        &self,
        actor: &ActorId,
        stat: &str,
        points: u32,
    ) -> Result<Avatar, ServiceError> {
        let stat: StatKind = stat.parse().map_err(EngineError::from)?;
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let mut updated = record.avatar.clone();
        let spent = avatar::raise_stat(&mut updated, stat, points)?;
        record.avatar = updated;
        info!(
            actor = %actor,
            avatar_id = %record.avatar.id,
            stat = %stat,
            spent,
            "skill points allocated"
        );
        Ok(record.avatar.clone())
    }

    // -- Actions ------------------------------------------------------------

    /// Actions of `category` as seen by the actor's avatar.
    ///
    /// The category name is matched case-insensitively.
    pub async fn list_actions_for_avatar(
        &self,
        actor: &ActorId,
        category: &str,
    ) -> Result<Vec<ActionView>, ServiceError> {
        let category: ActionCategory = category.parse().map_err(EngineError::from)?;
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let now = self.clock.now();
        let record = &mut *record;
        Ok(self
            .catalog
            .by_category(category)
            .map(|action| execution::view(&mut record.avatar, &record.purchases, action, now))
            .collect())
    }

    /// Run an action up to `repeat` times.
    pub async fn perform_action(
        &self,
        actor: &ActorId,
        action_id: &ActionId,
        repeat: u32,
    ) -> Result<ActionReport, ServiceError> {
        let action = self
            .catalog
            .get(action_id)
            .ok_or_else(|| ServiceError::ActionNotFound(action_id.clone()))?;
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let now = self.clock.now();

        let mut working = record.clone();
        let report = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            execution::perform(
                &mut working.avatar,
                &mut working.purchases,
                action,
                repeat,
                &self.rules,
                now,
                &mut *rng,
            )
        };
        let report = match report {
            Ok(report) => report,
            Err(err) => {
                if !err.is_rejection() {
                    warn!(actor = %actor, action_id = %action_id, error = %err, "action failed internally");
                }
                return Err(err.into());
            }
        };
        *record = working;

        info!(
            actor = %actor,
            avatar_id = %report.avatar.id,
            action_id = %action_id,
            attempts = report.attempts_executed,
            outcome = ?report.outcome,
            "action performed"
        );
        Ok(report)
    }

    /// Leave the hospital or jail, paying for an early release if `pay`.
    pub async fn leave_timeout(&self, actor: &ActorId, pay: bool) -> Result<LeaveReport, ServiceError> {
        let handle = self.active_handle(actor).await?;
        let mut record = handle.lock().await;
        let now = self.clock.now();

        let mut updated = record.avatar.clone();
        let paid = timeout::leave(&mut updated, pay, &self.rules, now)?;
        record.avatar = updated;

        Ok(LeaveReport {
            success: true,
            paid,
            avatar: record.avatar.clone(),
        })
    }

    // -- Background jobs ----------------------------------------------------

    /// Clear temporary stats whose cooldown has passed on every active
    /// avatar. Returns how many avatars changed.
    pub async fn sweep_expired_cooldowns(&self) -> usize {
        let now = self.clock.now();
        let mut cleared: usize = 0;
        for handle in self.store.active_handles().await {
            let mut record = handle.lock().await;
            if record.avatar.active && avatar::expire_temporary(&mut record.avatar, now) {
                debug!(avatar_id = %record.avatar.id, "temporary status expired");
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }

    /// Run one regeneration tick on every active avatar outside a timeout.
    /// Returns how many avatars changed.
    pub async fn regenerate_all_active(&self) -> usize {
        let now = self.clock.now();
        let mut touched: usize = 0;
        for handle in self.store.active_handles().await {
            let mut record = handle.lock().await;
            if vitals::regenerate(&mut record.avatar, &self.rules, now) {
                touched = touched.saturating_add(1);
            }
        }
        touched
    }

    async fn active_handle(
        &self,
        actor: &ActorId,
    ) -> Result<crate::store::AvatarHandle, ServiceError> {
        self.store
            .active_handle(actor)
            .await
            .ok_or_else(|| ServiceError::AvatarNotFound(actor.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::DateTime;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::builtin_catalog;

    fn service() -> GameService {
        let clock = Arc::new(FixedClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        GameService::with_rng(
            builtin_catalog().unwrap(),
            RulesConfig::default(),
            clock,
            Box::new(SmallRng::seed_from_u64(42)),
        )
    }

    #[tokio::test]
    async fn error_kinds() {
        let svc = service();
        let ghost = ActorId::from("ghost");
        let missing = svc.avatar_snapshot(&ghost).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        svc.create_avatar(&ghost, "Ghost").await.unwrap();
        let unknown = svc
            .perform_action(&ghost, &ActionId::from("nope"), 1)
            .await
            .unwrap_err();
        assert_eq!(unknown, ServiceError::ActionNotFound(ActionId::from("nope")));

        let rejected = svc.leave_timeout(&ghost, true).await.unwrap_err();
        assert_eq!(rejected.kind(), ErrorKind::Rejected);

        let internal = ServiceError::from(EngineError::overflow("x"));
        assert_eq!(internal.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn duplicate_active_name_is_rejected() {
        let svc = service();
        svc.create_avatar(&ActorId::from("a"), "Dozer").await.unwrap();
        let clash = svc.create_avatar(&ActorId::from("b"), "Dozer").await;
        assert_eq!(
            clash,
            Err(ServiceError::Engine(EngineError::NameTaken(String::from("Dozer"))))
        );
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let svc = service();
        let actor = ActorId::from("a");
        svc.create_avatar(&actor, "Apoc").await.unwrap();
        let result = svc.list_actions_for_avatar(&actor, "casino").await;
        assert_eq!(
            result,
            Err(ServiceError::Engine(EngineError::UnknownCategory(String::from("casino"))))
        );
        let market = svc.list_actions_for_avatar(&actor, "market").await.unwrap();
        assert_eq!(market.len(), 2);
    }
}
