use glam::Vec3;

use crate::collider::{BoxCollider, CollisionError, RayHit};
use crate::registry::Collidable;

/// Tolerance used when matching a face normal against a unit axis.
///
/// Shared by every hit-side classification (block editing and weapon feedback).
pub const FACE_EPSILON: f32 = 1e-4;

/// Semantic face of a block, as seen by gameplay.
///
/// Front/back are the +Z/-Z faces, right/left the +X/-X faces. Top and bottom
/// faces, and anything that is not a clean axis normal, classify as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitSide {
    Front,
    Left,
    Right,
    Back,
    Unknown,
}

impl HitSide {
    pub fn label(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Left => "left",
            Self::Right => "right",
            Self::Back => "back",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HitSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The nearest collidable along a ray and where it was hit.
pub struct TargetHit<'c, C: ?Sized> {
    pub target: &'c C,
    pub hit: RayHit,
}

impl<C: ?Sized> Clone for TargetHit<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for TargetHit<'_, C> {}

/// A ray with a normalized direction and an optional range limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycaster {
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
}

impl Raycaster {
    /// Build a ray. `direction` must be finite and non-zero; it is normalized here.
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Self, CollisionError> {
        if !origin.is_finite() {
            return Err(CollisionError::InvalidOrigin(origin));
        }
        let Some(direction) = direction.try_normalize() else {
            return Err(CollisionError::DegenerateRay(direction));
        };
        Ok(Self {
            origin,
            direction,
            max_distance: f32::INFINITY,
        })
    }

    /// Ignore hits further than `max_distance` from the origin.
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance.max(0.0);
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Intersect with a single box.
    pub fn intersect_box(&self, collider: &BoxCollider) -> Option<RayHit> {
        collider
            .ray_intersect(self.origin, self.direction)
            .filter(|hit| hit.distance <= self.max_distance)
    }

    /// Closest hit among `candidates`. Ties keep the earlier candidate.
    pub fn nearest_hit<'c, C, I>(&self, candidates: I) -> Option<TargetHit<'c, C>>
    where
        C: Collidable + ?Sized + 'c,
        I: IntoIterator<Item = &'c C>,
    {
        let mut best: Option<TargetHit<'c, C>> = None;
        for target in candidates {
            let Some(hit) = self.intersect_box(target.collider()) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| hit.distance < b.hit.distance) {
                best = Some(TargetHit { target, hit });
            }
        }
        best
    }

    /// Classify a face normal into a gameplay side using [`FACE_EPSILON`].
    pub fn hit_side(face_normal: Vec3) -> HitSide {
        let near = |value: f32, target: f32| (value - target).abs() < FACE_EPSILON;
        let flat = |value: f32| value.abs() < FACE_EPSILON;
        let Vec3 { x, y, z } = face_normal;

        if !flat(y) {
            return HitSide::Unknown;
        }
        if flat(x) && near(z, 1.0) {
            HitSide::Front
        } else if flat(x) && near(z, -1.0) {
            HitSide::Back
        } else if flat(z) && near(x, 1.0) {
            HitSide::Right
        } else if flat(z) && near(x, -1.0) {
            HitSide::Left
        } else {
            HitSide::Unknown
        }
    }
}
