//! In-memory avatar store with per-avatar serialization.
//!
//! Each avatar lives behind its own [`tokio::sync::Mutex`] together with
//! its purchase ledger, so operations on one avatar run one at a time while
//! different avatars proceed in parallel. A shared index maps actors and
//! names to avatar ids.
//!
//! # Lock order
//!
//! Index first, avatar second. Code holding an avatar lock never touches
//! the index, so the index lock is always released (or never taken) before
//! waiting on an avatar from a request path.

use std::collections::BTreeMap;
use std::sync::Arc;

use streetwise_engine::PurchaseLedger;
use streetwise_types::{ActorId, Avatar, AvatarId};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// One avatar together with its special status purchase records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRecord {
    /// The avatar.
    pub avatar: Avatar,
    /// Escalating price state of the avatar's special status purchases.
    pub purchases: PurchaseLedger,
}

/// Shared, lockable handle to one avatar.
pub type AvatarHandle = Arc<Mutex<AvatarRecord>>;

/// Errors raised by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Another active avatar already uses the name.
    #[error("avatar name already in use: {0}")]
    NameTaken(String),
}

#[derive(Debug, Default)]
struct Index {
    avatars: BTreeMap<AvatarId, AvatarHandle>,
    active_by_actor: BTreeMap<ActorId, AvatarId>,
    active_names: BTreeMap<String, AvatarId>,
}

/// Every avatar ever created, active or not.
#[derive(Debug, Default)]
pub struct AvatarStore {
    index: RwLock<Index>,
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl AvatarStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new active avatar for its actor.
    ///
    /// The actor's previous active avatar, if any, is deactivated and its
    /// id returned. Fails if another active avatar uses the same name
    /// (compared case-insensitively).
    pub async fn insert_active(&self, avatar: Avatar) -> Result<Option<AvatarId>, StoreError> {
        let mut index = self.index.write().await;
        let key = name_key(&avatar.name);
        if index.active_names.contains_key(&key) {
            return Err(StoreError::NameTaken(avatar.name));
        }

        let previous = index.active_by_actor.get(&avatar.actor_id).copied();
        if let Some(previous_id) = previous
            && let Some(handle) = index.avatars.get(&previous_id).cloned()
        {
            let mut record = handle.lock().await;
            record.avatar.active = false;
            index.active_names.remove(&name_key(&record.avatar.name));
            info!(avatar_id = %previous_id, "previous avatar deactivated");
        }

        let id = avatar.id;
        index.active_by_actor.insert(avatar.actor_id.clone(), id);
        index.active_names.insert(key, id);
        index.avatars.insert(
            id,
            Arc::new(Mutex::new(AvatarRecord {
                avatar,
                purchases: PurchaseLedger::new(),
            })),
        );
        Ok(previous)
    }

    /// Soft-delete the actor's active avatar, returning its id.
    pub async fn deactivate(&self, actor: &ActorId) -> Option<AvatarId> {
        let mut index = self.index.write().await;
        let id = index.active_by_actor.remove(actor)?;
        let handle = index.avatars.get(&id).cloned()?;
        let mut record = handle.lock().await;
        record.avatar.active = false;
        index.active_names.remove(&name_key(&record.avatar.name));
        Some(id)
    }

    /// Handle to the actor's active avatar.
    pub async fn active_handle(&self, actor: &ActorId) -> Option<AvatarHandle> {
        let index = self.index.read().await;
        let id = index.active_by_actor.get(actor)?;
        index.avatars.get(id).cloned()
    }

    /// Handle to any avatar by id.
    pub async fn handle(&self, id: &AvatarId) -> Option<AvatarHandle> {
        self.index.read().await.avatars.get(id).cloned()
    }

    /// Handles to every active avatar, ordered by id.
    ///
    /// A snapshot: the index lock is released before the caller locks any
    /// avatar.
    pub async fn active_handles(&self) -> Vec<AvatarHandle> {
        let index = self.index.read().await;
        index
            .active_by_actor
            .values()
            .filter_map(|id| index.avatars.get(id).cloned())
            .collect()
    }

    /// Total number of avatars, active or not.
    pub async fn len(&self) -> usize {
        self.index.read().await.avatars.len()
    }

    /// Whether the store holds no avatars.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.avatars.is_empty()
    }
}
