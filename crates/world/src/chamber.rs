use blockyard_collision::{BoxCollider, ColliderEntry, ColliderSource};
use blockyard_common::ColliderType;
use glam::Vec3;

use crate::WorldError;

/// A closed room: floor, ceiling and four side walls around an interior volume.
#[derive(Debug, Clone)]
pub struct Chamber {
    center: Vec3,
    half_size: Vec3,
    walls: Vec<BoxCollider>,
}

impl Chamber {
    /// Build the six walls enclosing `center ± half_size`, each `wall_thickness` thick.
    pub fn new(center: Vec3, half_size: Vec3, wall_thickness: f32) -> Result<Self, WorldError> {
        if !wall_thickness.is_finite() || wall_thickness <= 0.0 {
            return Err(WorldError::InvalidWallThickness(wall_thickness));
        }
        let t = wall_thickness;
        let h = half_size;
        let half_t = t * 0.5;

        let slab_y = Vec3::new(h.x + t, half_t, h.z + t);
        let slab_x = Vec3::new(half_t, h.y, h.z);
        let slab_z = Vec3::new(h.x, h.y, half_t);

        let walls = vec![
            BoxCollider::new(slab_y, center - Vec3::Y * (h.y + half_t))?,
            BoxCollider::new(slab_y, center + Vec3::Y * (h.y + half_t))?,
            BoxCollider::new(slab_x, center - Vec3::X * (h.x + half_t))?,
            BoxCollider::new(slab_x, center + Vec3::X * (h.x + half_t))?,
            BoxCollider::new(slab_z, center - Vec3::Z * (h.z + half_t))?,
            BoxCollider::new(slab_z, center + Vec3::Z * (h.z + half_t))?,
        ];

        Ok(Self {
            center,
            half_size,
            walls,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_size(&self) -> Vec3 {
        self.half_size
    }

    pub fn walls(&self) -> &[BoxCollider] {
        &self.walls
    }

    /// Whether a point is inside the open interior.
    pub fn interior_contains(&self, point: Vec3) -> bool {
        (point - self.center).abs().cmplt(self.half_size).all()
    }
}

/// Every structural chamber in the level.
#[derive(Debug, Clone, Default)]
pub struct ChamberSet {
    chambers: Vec<Chamber>,
}

impl ChamberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chamber and return its index.
    pub fn add_chamber(
        &mut self,
        center: Vec3,
        half_size: Vec3,
        wall_thickness: f32,
    ) -> Result<usize, WorldError> {
        self.chambers
            .push(Chamber::new(center, half_size, wall_thickness)?);
        Ok(self.chambers.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&Chamber> {
        self.chambers.get(index)
    }

    pub fn len(&self) -> usize {
        self.chambers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chambers.is_empty()
    }

    /// Chamber whose interior contains `point`, if any.
    pub fn chamber_at(&self, point: Vec3) -> Option<usize> {
        self.chambers
            .iter()
            .position(|c| c.interior_contains(point))
    }
}

impl ColliderSource for ChamberSet {
    fn collider_type(&self) -> ColliderType {
        ColliderType::Chamber
    }

    fn all_colliders(&self) -> Vec<ColliderEntry<'_>> {
        self.chambers
            .iter()
            .flat_map(|c| c.walls.iter().map(|w| ColliderEntry::new(w, c.center)))
            .collect()
    }
}
