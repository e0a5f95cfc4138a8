//! Shared types used across the blockyard crates.
//!
//! # Invariants
//! - Types here carry no behavior beyond identity and coordinate math.

pub mod types;

pub use types::{BlockCoord, ColliderType, EntityId};
