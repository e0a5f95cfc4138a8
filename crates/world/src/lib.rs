//! World subsystems that own collision geometry.
//!
//! # Invariants
//! - Each subsystem is attached at most once; absent subsystems contribute no colliders.
//! - Every edit applied through [`World`] is appended to its event log.
//! - Ground blocks are keyed by cell, so there is at most one block per cell.

mod chamber;
mod factory;
mod ground;
mod props;
mod world;

pub use chamber::{Chamber, ChamberSet};
pub use factory::{Subsystem, WorldConfig, build_subsystem};
pub use ground::GroundGrid;
pub use props::{Prop, PropSet};
pub use world::{World, WorldEvent};

use blockyard_collision::CollisionError;
use blockyard_common::{ColliderType, EntityId};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f32),
    #[error("wall thickness must be finite and positive, got {0}")]
    InvalidWallThickness(f32),
    #[error("prop not found: {0:?}")]
    PropNotFound(EntityId),
    #[error("{0} subsystem is not attached")]
    SubsystemAbsent(ColliderType),
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

pub fn crate_info() -> &'static str {
    "blockyard-world v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("world"));
    }

    #[test]
    fn absent_error_names_the_subsystem() {
        let msg = WorldError::SubsystemAbsent(ColliderType::Chamber).to_string();
        assert!(msg.contains("chamber"));
    }
}
