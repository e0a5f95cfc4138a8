use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Errors from constructing collision primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollisionError {
    #[error("collider half extents must be finite and strictly positive, got {0:?}")]
    InvalidHalfExtents(Vec3),
    #[error("collider center must be finite, got {0:?}")]
    InvalidCenter(Vec3),
    #[error("ray direction must be finite and non-zero, got {0:?}")]
    DegenerateRay(Vec3),
    #[error("ray origin must be finite, got {0:?}")]
    InvalidOrigin(Vec3),
    #[error("collider rotation must be finite and non-zero, got {0:?}")]
    InvalidRotation(Quat),
}

/// Result of a ray hitting a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parametric distance along the ray (world units for a normalized ray).
    pub distance: f32,
    /// World-space hit point, `origin + direction * distance`.
    pub point: Vec3,
    /// Signed unit axis of the face the ray entered through.
    pub face_normal: Vec3,
}

/// A box collider: half extents around a world-space center, optionally rotated.
///
/// Every collider in the world today is axis-aligned; the rotation exists so an
/// oriented box can be expressed without a separate shape type.
///
/// Deserialization goes through the same validation as [`BoxCollider::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxColliderRepr", into = "BoxColliderRepr")]
pub struct BoxCollider {
    half_extents: Vec3,
    center: Vec3,
    rotation: Quat,
}

/// Unvalidated serialized form of [`BoxCollider`].
#[derive(Serialize, Deserialize)]
struct BoxColliderRepr {
    half_extents: Vec3,
    center: Vec3,
    #[serde(default)]
    rotation: Quat,
}

impl TryFrom<BoxColliderRepr> for BoxCollider {
    type Error = CollisionError;

    fn try_from(repr: BoxColliderRepr) -> Result<Self, Self::Error> {
        Self::new(repr.half_extents, repr.center)?.with_rotation(repr.rotation)
    }
}

impl From<BoxCollider> for BoxColliderRepr {
    fn from(collider: BoxCollider) -> Self {
        Self {
            half_extents: collider.half_extents,
            center: collider.center,
            rotation: collider.rotation,
        }
    }
}

impl BoxCollider {
    /// Create an axis-aligned box. Half extents must be finite and > 0.
    pub fn new(half_extents: Vec3, center: Vec3) -> Result<Self, CollisionError> {
        if !half_extents.is_finite() || half_extents.min_element() <= 0.0 {
            return Err(CollisionError::InvalidHalfExtents(half_extents));
        }
        if !center.is_finite() {
            return Err(CollisionError::InvalidCenter(center));
        }
        Ok(Self {
            half_extents,
            center,
            rotation: Quat::IDENTITY,
        })
    }

    /// Create a cube with edge length `size`.
    pub fn cube(size: f32, center: Vec3) -> Result<Self, CollisionError> {
        Self::new(Vec3::splat(size * 0.5), center)
    }

    /// Orient the box. The rotation is normalized; a zero-length or
    /// non-finite quaternion is rejected.
    pub fn with_rotation(mut self, rotation: Quat) -> Result<Self, CollisionError> {
        if !rotation.is_finite() || rotation.length_squared() <= f32::EPSILON {
            return Err(CollisionError::InvalidRotation(rotation));
        }
        self.rotation = rotation.normalize();
        Ok(self)
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Move the box to a new world-space center.
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.rotation == Quat::IDENTITY
    }

    /// Half extents of the world-space bounding box.
    fn world_half_extents(&self) -> Vec3 {
        if self.is_axis_aligned() {
            return self.half_extents;
        }
        let m = Mat3::from_quat(self.rotation);
        m.x_axis.abs() * self.half_extents.x
            + m.y_axis.abs() * self.half_extents.y
            + m.z_axis.abs() * self.half_extents.z
    }

    /// Minimum corner of the world-space bounding box.
    pub fn min(&self) -> Vec3 {
        self.center - self.world_half_extents()
    }

    /// Maximum corner of the world-space bounding box.
    pub fn max(&self) -> Vec3 {
        self.center + self.world_half_extents()
    }

    fn to_local(&self, v: Vec3) -> Vec3 {
        if self.is_axis_aligned() {
            v
        } else {
            self.rotation.inverse() * v
        }
    }

    fn to_world(&self, v: Vec3) -> Vec3 {
        if self.is_axis_aligned() {
            v
        } else {
            self.rotation * v
        }
    }

    /// Whether a world-space point lies inside or on the box.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.to_local(point - self.center);
        local.abs().cmple(self.half_extents).all()
    }

    /// Bounding-box overlap test. Touching faces do not count as overlap.
    pub fn overlaps(&self, other: &BoxCollider) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.cmplt(b_max).all() && b_min.cmplt(a_max).all()
    }

    /// Exact ray/box intersection using the slab method.
    ///
    /// Returns `None` on a miss, when the box lies entirely behind the origin,
    /// or when `direction` is the zero vector or either input is non-finite.
    /// A ray starting inside the box reports distance 0 at the origin.
    pub fn ray_intersect(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        if !origin.is_finite() || !direction.is_finite() {
            return None;
        }
        let local_origin = self.to_local(origin - self.center);
        let local_dir = self.to_local(direction);

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let mut entry_axis = None;

        for axis in 0..3 {
            let o = local_origin[axis];
            let d = local_dir[axis];
            let h = self.half_extents[axis];

            // Parallel to this slab: no plane crossing, origin must already be inside it.
            if d == 0.0 {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t0 = (-h - o) * inv_d;
            let mut t1 = (h - o) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_min {
                t_min = t0;
                entry_axis = Some(axis);
            }
            if t1 < t_max {
                t_max = t1;
            }
        }

        if t_min > t_max || t_max < 0.0 {
            return None;
        }
        let axis = entry_axis?;

        let mut local_normal = Vec3::ZERO;
        local_normal[axis] = -local_dir[axis].signum();

        let distance = t_min.max(0.0);
        Some(RayHit {
            distance,
            point: origin + direction * distance,
            face_normal: self.to_world(local_normal),
        })
    }
}
