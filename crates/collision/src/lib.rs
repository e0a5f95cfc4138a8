//! Collision queries: box colliders, raycasting, and collider aggregation.
//!
//! # Invariants
//! - Collider half extents are strictly positive; construction rejects anything else.
//! - Ray directions are non-zero; `Raycaster` normalizes at construction.
//! - The registry borrows colliders from world subsystems and never caches them.

mod collider;
mod raycast;
mod registry;

pub use collider::{BoxCollider, CollisionError, RayHit};
pub use raycast::{FACE_EPSILON, HitSide, Raycaster, TargetHit};
pub use registry::{
    Collidable, CollidableView, ColliderCollection, ColliderEntry, ColliderRegistry,
    ColliderSource, CollisionInfo, CollisionResponse, FlatCollider,
};

pub fn crate_info() -> &'static str {
    "blockyard-collision v0.1.0"
}
