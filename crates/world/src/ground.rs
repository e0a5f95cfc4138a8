use blockyard_collision::{BoxCollider, ColliderEntry, ColliderSource};
use blockyard_common::{BlockCoord, ColliderType};
use glam::Vec3;
use std::collections::BTreeMap;

use crate::WorldError;

/// Editable grid of cube blocks.
///
/// Blocks are keyed by cell coordinate in a BTreeMap so collider order is
/// stable across runs.
#[derive(Debug, Clone)]
pub struct GroundGrid {
    cell_size: f32,
    blocks: BTreeMap<BlockCoord, BoxCollider>,
}

impl GroundGrid {
    pub fn new(cell_size: f32) -> Result<Self, WorldError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(WorldError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            blocks: BTreeMap::new(),
        })
    }

    /// A square floor of `(2 * half_width + 1)^2` blocks whose top face is y = 0.
    pub fn flat(cell_size: f32, half_width: i32) -> Result<Self, WorldError> {
        let mut grid = Self::new(cell_size)?;
        for x in -half_width..=half_width {
            for z in -half_width..=half_width {
                grid.place(BlockCoord::new(x, -1, z))?;
            }
        }
        Ok(grid)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, coord: BlockCoord) -> bool {
        self.blocks.contains_key(&coord)
    }

    pub fn block(&self, coord: BlockCoord) -> Option<&BoxCollider> {
        self.blocks.get(&coord)
    }

    /// Occupied coordinates in ascending order.
    pub fn coords(&self) -> impl Iterator<Item = BlockCoord> + '_ {
        self.blocks.keys().copied()
    }

    /// Collider a block at `coord` would have, whether or not it exists.
    pub fn collider_for(&self, coord: BlockCoord) -> Result<BoxCollider, WorldError> {
        Ok(BoxCollider::cube(self.cell_size, coord.center(self.cell_size))?)
    }

    /// Cell containing a world-space point.
    pub fn coord_at(&self, point: Vec3) -> BlockCoord {
        BlockCoord::from_world(point, self.cell_size)
    }

    /// The block occupying the cell that contains `point`, if any.
    pub fn block_at_point(&self, point: Vec3) -> Option<(BlockCoord, &BoxCollider)> {
        let coord = self.coord_at(point);
        self.blocks.get(&coord).map(|b| (coord, b))
    }

    /// Coordinate of the block a collider belongs to, if it is one of ours.
    pub fn coord_of(&self, collider: &BoxCollider) -> Option<BlockCoord> {
        let coord = self.coord_at(collider.center());
        self.blocks
            .get(&coord)
            .filter(|b| *b == collider)
            .map(|_| coord)
    }

    /// Place a block. Returns `false` if the cell was already occupied.
    pub fn place(&mut self, coord: BlockCoord) -> Result<bool, WorldError> {
        if self.blocks.contains_key(&coord) {
            return Ok(false);
        }
        let collider = self.collider_for(coord)?;
        self.blocks.insert(coord, collider);
        Ok(true)
    }

    /// Remove a block. Returns `false` if the cell was empty.
    pub fn remove(&mut self, coord: BlockCoord) -> bool {
        self.blocks.remove(&coord).is_some()
    }
}

impl ColliderSource for GroundGrid {
    fn collider_type(&self) -> ColliderType {
        ColliderType::Ground
    }

    fn all_colliders(&self) -> Vec<ColliderEntry<'_>> {
        self.blocks
            .values()
            .map(|b| ColliderEntry::new(b, b.center()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_floor_has_top_at_zero() {
        let grid = GroundGrid::flat(1.0, 2).unwrap();
        assert_eq!(grid.len(), 25);
        let b = grid.block(BlockCoord::new(0, -1, 0)).unwrap();
        assert_eq!(b.max().y, 0.0);
        assert_eq!(b.min().y, -1.0);
    }

    #[test]
    fn place_and_remove() {
        let mut grid = GroundGrid::new(1.0).unwrap();
        let c = BlockCoord::new(3, 0, -2);
        assert!(grid.place(c).unwrap());
        assert!(!grid.place(c).unwrap());
        assert!(grid.contains(c));
        assert_eq!(grid.all_colliders().len(), 1);
        assert!(grid.remove(c));
        assert!(!grid.remove(c));
        assert!(grid.is_empty());
    }

    #[test]
    fn coord_of_finds_own_blocks() {
        let mut grid = GroundGrid::new(2.0).unwrap();
        let c = BlockCoord::new(1, 0, 1);
        grid.place(c).unwrap();
        let collider = *grid.block(c).unwrap();
        assert_eq!(grid.coord_of(&collider), Some(c));

        let stranger = BoxCollider::cube(0.5, collider.center()).unwrap();
        assert_eq!(grid.coord_of(&stranger), None);
    }

    #[test]
    fn block_at_point_uses_containing_cell() {
        let grid = GroundGrid::flat(1.0, 1).unwrap();
        let (coord, block) = grid.block_at_point(Vec3::new(-0.5, -0.25, 0.9)).unwrap();
        assert_eq!(coord, BlockCoord::new(-1, -1, 0));
        assert!(block.contains_point(Vec3::new(-0.5, -0.25, 0.9)));
        assert!(grid.block_at_point(Vec3::new(0.5, 0.5, 0.5)).is_none());
    }

    #[test]
    fn rejects_bad_cell_size() {
        assert!(matches!(
            GroundGrid::new(0.0),
            Err(WorldError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn entries_are_ordered_by_coordinate() {
        let mut grid = GroundGrid::new(1.0).unwrap();
        grid.place(BlockCoord::new(5, 0, 0)).unwrap();
        grid.place(BlockCoord::new(-5, 0, 0)).unwrap();
        let entries = grid.all_colliders();
        assert!(entries[0].position.x < entries[1].position.x);
    }
}
