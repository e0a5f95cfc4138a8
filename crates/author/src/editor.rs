use blockyard_collision::{BoxCollider, HitSide, RayHit, Raycaster};
use blockyard_common::{BlockCoord, ColliderType, EntityId};
use blockyard_world::{World, WorldError};
use glam::Vec3;

/// An edit that can be applied to the world and reversed.
///
/// Each command carries enough context to undo itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditCommand {
    /// Place a ground block. Undo = remove it.
    PlaceBlock { coord: BlockCoord },
    /// Remove a ground block. Undo = place it again.
    RemoveBlock { coord: BlockCoord },
    /// Spawn a prop. Undo = despawn it.
    SpawnProp {
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    },
    /// Despawn a prop. Undo = respawn it with the same id.
    DespawnProp {
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    },
    /// Move a prop. Undo = restore the old position.
    MoveProp { id: EntityId, old: Vec3, new: Vec3 },
}

impl EditCommand {
    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        match *self {
            Self::PlaceBlock { coord } => Self::RemoveBlock { coord },
            Self::RemoveBlock { coord } => Self::PlaceBlock { coord },
            Self::SpawnProp {
                id,
                half_extents,
                position,
            } => Self::DespawnProp {
                id,
                half_extents,
                position,
            },
            Self::DespawnProp {
                id,
                half_extents,
                position,
            } => Self::SpawnProp {
                id,
                half_extents,
                position,
            },
            Self::MoveProp { id, old, new } => Self::MoveProp {
                id,
                old: new,
                new: old,
            },
        }
    }
}

/// Errors from edit operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("ray hit nothing")]
    NoTarget,
    #[error("target is a {0} collider, not a ground block")]
    NotGround(ColliderType),
    #[error("cell {0:?} is already occupied")]
    Occupied(BlockCoord),
    #[error("cell {0:?} is blocked")]
    Blocked(BlockCoord),
    #[error(transparent)]
    World(#[from] WorldError),
}

/// What a ray is pointing at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub kind: ColliderType,
    pub hit: RayHit,
    pub side: HitSide,
    /// Set when the target is a ground block.
    pub coord: Option<BlockCoord>,
}

impl Pick {
    fn ground_coord(&self) -> Result<BlockCoord, EditError> {
        self.coord.ok_or(EditError::NotGround(self.kind))
    }

    /// The cell on the far side of the hit face.
    pub fn adjacent(&self) -> Option<BlockCoord> {
        let step = self.hit.face_normal.round().as_ivec3();
        self.coord.map(|c| c.offset(step))
    }
}

/// Raycast-driven block editor with undo/redo.
///
/// Edits are applied to the `World` passed in, so its event log records them.
/// An optional blocker box (usually the player's collider) keeps blocks from
/// being placed on top of it.
#[derive(Debug, Default)]
pub struct BlockEditor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
    blocker: Option<BoxCollider>,
}

impl BlockEditor {
    /// Create an editor with empty undo/redo stacks and no blocker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the box new blocks may not overlap.
    pub fn set_blocker(&mut self, blocker: Option<BoxCollider>) {
        self.blocker = blocker;
    }

    /// The box new blocks may not overlap, if set.
    pub fn blocker(&self) -> Option<&BoxCollider> {
        self.blocker.as_ref()
    }

    /// Nearest collider of any type along `ray`.
    pub fn pick(&self, world: &World, ray: &Raycaster) -> Option<Pick> {
        let registry = world.registry();
        let views = registry.collidables();
        let target = ray.nearest_hit(views.iter())?;
        let kind = target.target.kind();
        let coord = match kind {
            ColliderType::Ground => world
                .ground()
                .and_then(|g| g.coord_of(target.target.collider_ref())),
            _ => None,
        };
        Some(Pick {
            kind,
            hit: target.hit,
            side: Raycaster::hit_side(target.hit.face_normal),
            coord,
        })
    }

    /// Place a block against the face of the ground block `ray` points at.
    pub fn place_adjacent(
        &mut self,
        world: &mut World,
        ray: &Raycaster,
    ) -> Result<BlockCoord, EditError> {
        let pick = self.pick(world, ray).ok_or(EditError::NoTarget)?;
        let coord = pick.adjacent().ok_or(EditError::NotGround(pick.kind))?;
        self.place_block(world, coord)?;
        tracing::debug!(?coord, side = %pick.side, "placed block");
        Ok(coord)
    }

    /// Remove the ground block `ray` points at.
    pub fn remove_targeted(
        &mut self,
        world: &mut World,
        ray: &Raycaster,
    ) -> Result<BlockCoord, EditError> {
        let pick = self.pick(world, ray).ok_or(EditError::NoTarget)?;
        let coord = pick.ground_coord()?;
        world.remove_block(coord)?;
        self.record(EditCommand::RemoveBlock { coord });
        tracing::debug!(?coord, "removed block");
        Ok(coord)
    }

    /// Place a block at an explicit cell.
    pub fn place_block(&mut self, world: &mut World, coord: BlockCoord) -> Result<(), EditError> {
        let ground = world
            .ground()
            .ok_or(WorldError::SubsystemAbsent(ColliderType::Ground))?;
        let candidate = ground.collider_for(coord)?;
        if self.blocker.is_some_and(|b| b.overlaps(&candidate)) {
            return Err(EditError::Blocked(coord));
        }
        if !world.place_block(coord)? {
            return Err(EditError::Occupied(coord));
        }
        self.record(EditCommand::PlaceBlock { coord });
        Ok(())
    }

    /// Spawn a prop and push to the undo stack.
    pub fn spawn_prop(
        &mut self,
        world: &mut World,
        half_extents: Vec3,
        position: Vec3,
    ) -> Result<EntityId, EditError> {
        let id = world.spawn_prop(half_extents, position)?;
        self.record(EditCommand::SpawnProp {
            id,
            half_extents,
            position,
        });
        Ok(id)
    }

    /// Despawn a prop and push to the undo stack.
    pub fn despawn_prop(&mut self, world: &mut World, id: EntityId) -> Result<(), EditError> {
        let prop = world.despawn_prop(id)?;
        self.record(EditCommand::DespawnProp {
            id,
            half_extents: prop.collider.half_extents(),
            position: prop.position,
        });
        Ok(())
    }

    /// Move a prop and push to the undo stack.
    pub fn move_prop(&mut self, world: &mut World, id: EntityId, new: Vec3) -> Result<(), EditError> {
        let old = world
            .props()
            .and_then(|p| p.get(id))
            .ok_or(WorldError::PropNotFound(id))?
            .position;
        world.move_prop(id, new)?;
        self.record(EditCommand::MoveProp { id, old, new });
        Ok(())
    }

    fn record(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }

    /// Undo the last edit. Returns `Ok(false)` if there was nothing to undo.
    ///
    /// If the world no longer accepts the inverse, the command stays on the
    /// undo stack.
    pub fn undo(&mut self, world: &mut World) -> Result<bool, EditError> {
        let Some(cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = apply_command(world, &cmd.inverse()) {
            self.undo_stack.push(cmd);
            return Err(e);
        }
        self.redo_stack.push(cmd);
        Ok(true)
    }

    /// Redo the last undone edit. Returns `Ok(false)` if there was nothing to redo.
    pub fn redo(&mut self, world: &mut World) -> Result<bool, EditError> {
        let Some(cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = apply_command(world, &cmd) {
            self.redo_stack.push(cmd);
            return Err(e);
        }
        self.undo_stack.push(cmd);
        Ok(true)
    }

    /// Number of operations on the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of operations on the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether there are operations that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there are operations that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

fn apply_command(world: &mut World, cmd: &EditCommand) -> Result<(), EditError> {
    match *cmd {
        EditCommand::PlaceBlock { coord } => {
            if !world.place_block(coord)? {
                return Err(EditError::Occupied(coord));
            }
        }
        EditCommand::RemoveBlock { coord } => {
            world.remove_block(coord)?;
        }
        EditCommand::SpawnProp {
            id,
            half_extents,
            position,
        } => {
            world.spawn_prop_with_id(id, half_extents, position)?;
        }
        EditCommand::DespawnProp { id, .. } => {
            world.despawn_prop(id)?;
        }
        EditCommand::MoveProp { id, new, .. } => {
            world.move_prop(id, new)?;
        }
    }
    Ok(())
}
