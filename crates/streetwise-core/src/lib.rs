//! Service layer for the Streetwise action resolution engine.
//!
//! This crate wraps the pure engine with everything a host process needs:
//! configuration, a clock, an in-memory avatar store that serializes
//! operations per avatar, the [`GameService`] operations, and the periodic
//! background jobs.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait with system and fixed implementations
//! - [`config`] -- Loading `streetwise-config.yaml` and the action catalog
//! - [`jobs`] -- Regeneration and temporary status sweep tasks
//! - [`service`] -- [`GameService`] operations and [`ServiceError`]
//! - [`store`] -- [`AvatarStore`] with per-avatar locking

pub mod clock;
pub mod config;
pub mod jobs;
pub mod service;
pub mod store;

// Re-export primary types at crate root for convenience.
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, StreetwiseConfig, builtin_catalog};
pub use jobs::{JobHandles, spawn_all};
pub use service::{ErrorKind, GameService, ServiceError};
pub use store::{AvatarHandle, AvatarRecord, AvatarStore, StoreError};
