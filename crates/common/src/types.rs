use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a dynamic entity (props, bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag identifying which world subsystem produced a collider.
///
/// Also the key for subsystem factories; there is no runtime type lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColliderType {
    /// Editable block grid the player stands on.
    Ground,
    /// Static structural rooms (walls, floors, ceilings).
    Chamber,
    /// Dynamic props that can be spawned and moved.
    Prop,
}

impl ColliderType {
    /// Every tag, in registry order.
    pub const ALL: [ColliderType; 3] = [Self::Ground, Self::Chamber, Self::Prop];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Chamber => "chamber",
            Self::Prop => "prop",
        }
    }
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer cell coordinate of a block in the ground grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing a world-space point for the given cell size.
    pub fn from_world(pos: Vec3, cell_size: f32) -> Self {
        let c = (pos / cell_size).floor();
        Self::new(c.x as i32, c.y as i32, c.z as i32)
    }

    /// World-space center of this cell.
    pub fn center(self, cell_size: f32) -> Vec3 {
        (Vec3::new(self.x as f32, self.y as f32, self.z as f32) + Vec3::splat(0.5)) * cell_size
    }

    /// Neighbouring cell one step along `offset` (expected to be a unit axis step).
    pub fn offset(self, offset: IVec3) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn collider_type_labels() {
        assert_eq!(ColliderType::Ground.label(), "ground");
        assert_eq!(ColliderType::Chamber.to_string(), "chamber");
        assert_eq!(ColliderType::ALL.len(), 3);
    }

    #[test]
    fn block_coord_round_trips_through_center() {
        let c = BlockCoord::new(2, -1, 0);
        let center = c.center(1.0);
        assert_eq!(center, Vec3::new(2.5, -0.5, 0.5));
        assert_eq!(BlockCoord::from_world(center, 1.0), c);
    }

    #[test]
    fn negative_positions_floor_correctly() {
        let c = BlockCoord::from_world(Vec3::new(-0.1, 0.0, -3.9), 2.0);
        assert_eq!(c, BlockCoord::new(-1, 0, -2));
    }

    #[test]
    fn offset_moves_one_cell() {
        let c = BlockCoord::new(0, 0, 0).offset(IVec3::new(0, 1, 0));
        assert_eq!(c, BlockCoord::new(0, 1, 0));
    }
}
