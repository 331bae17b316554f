//! Action resolution engine for the Streetwise game.
//!
//! This crate holds every game rule that operates on avatar state without
//! touching I/O. It sits between `streetwise-types` (the data model) and
//! `streetwise-core` (storage, serialization of requests, background jobs).
//! Randomness and the current time are always passed in.
//!
//! # Modules
//!
//! - [`avatar`] -- Avatar creation, effective stats, experience, skill allocation
//! - [`catalog`] -- Parsed, validated action catalog ([`ActionCatalog`])
//! - [`config`] -- Tunable game rules ([`RulesConfig`])
//! - [`error`] -- Business rejections and internal faults ([`EngineError`])
//! - [`execution`] -- Affordability checks and the repeat loop
//! - [`formulas`] -- Experience curve, variance, failure chance, timeout sizing
//! - [`pricing`] -- Escalating special status prices ([`PurchaseLedger`])
//! - [`processor`] -- Resolution of a single attempt
//! - [`timeout`] -- Hospital and jail state machine
//! - [`vitals`] -- Bounded stamina and life, regeneration

pub mod avatar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod execution;
pub mod formulas;
pub mod pricing;
pub mod processor;
pub mod timeout;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use catalog::{ActionCatalog, CatalogError};
pub use config::RulesConfig;
pub use error::EngineError;
pub use execution::{check_affordable, perform, view};
pub use formulas::required_experience;
pub use pricing::PurchaseLedger;
pub use processor::resolve;
