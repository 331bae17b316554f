//! Shared type definitions for the Streetwise action resolution engine.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types flow downstream to `TypeScript` via `ts-rs` for the
//! game client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers for avatars, actors and actions
//! - [`enums`] -- Categories, stats, timeout kinds, special effects, outcomes
//! - [`structs`] -- The [`Avatar`] entity, [`StatBlock`], [`Timeout`], [`PurchaseRecord`]
//! - [`actions`] -- Catalog entries plus the views and reports built from them
//! - [`serde_util`] -- Deserialization helpers for sparse catalog files

pub mod actions;
pub mod enums;
pub mod ids;
pub mod serde_util;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionDefinition, ActionReport, ActionView, LeaveReport, ResourceDeltas};
pub use enums::{
    ActionCategory, AttemptOutcome, SpecialEffect, StatKind, TimeoutKind, TimeoutState,
    UnknownVariant,
};
pub use ids::{ActionId, ActorId, AvatarId};
pub use structs::{Avatar, PurchaseRecord, StatBlock, Timeout};
