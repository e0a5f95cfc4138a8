use blockyard_collision::{ColliderRegistry, ColliderSource};
use blockyard_common::{BlockCoord, ColliderType, EntityId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::WorldError;
use crate::chamber::ChamberSet;
use crate::factory::{Subsystem, WorldConfig, build_subsystem};
use crate::ground::GroundGrid;
use crate::props::{Prop, PropSet};

/// A record of every edit applied to world geometry.
///
/// Each event carries enough to reverse the edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A subsystem became available.
    Attached { kind: ColliderType },
    /// A subsystem was taken out of the world.
    Detached { kind: ColliderType },
    BlockPlaced { coord: BlockCoord },
    BlockRemoved { coord: BlockCoord },
    PropSpawned {
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    },
    PropDespawned {
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    },
    PropMoved { id: EntityId, old: Vec3, new: Vec3 },
}

/// The level: whichever subsystems are currently attached, plus an edit log.
///
/// Subsystems start absent and are attached as they finish initializing.
/// Collider queries go through [`World::registry`], which treats an absent
/// subsystem as having no colliders.
#[derive(Debug, Clone, Default)]
pub struct World {
    ground: Option<GroundGrid>,
    chambers: Option<ChamberSet>,
    props: Option<PropSet>,
    event_log: Vec<WorldEvent>,
}

impl World {
    /// A world with no subsystems attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and attach the subsystems for `kinds` through the factory.
    pub fn from_config(config: &WorldConfig, kinds: &[ColliderType]) -> Result<Self, WorldError> {
        let mut world = Self::new();
        for &kind in kinds {
            world.attach(build_subsystem(kind, config)?);
        }
        Ok(world)
    }

    /// Attach a subsystem, returning the one it replaced.
    pub fn attach(&mut self, subsystem: Subsystem) -> Option<Subsystem> {
        let kind = subsystem.kind();
        let replaced = match subsystem {
            Subsystem::Ground(g) => self.ground.replace(g).map(Subsystem::Ground),
            Subsystem::Chambers(c) => self.chambers.replace(c).map(Subsystem::Chambers),
            Subsystem::Props(p) => self.props.replace(p).map(Subsystem::Props),
        };
        tracing::debug!(%kind, replaced = replaced.is_some(), "subsystem attached");
        self.event_log.push(WorldEvent::Attached { kind });
        replaced
    }

    /// Remove a subsystem from the world.
    pub fn detach(&mut self, kind: ColliderType) -> Option<Subsystem> {
        let removed = match kind {
            ColliderType::Ground => self.ground.take().map(Subsystem::Ground),
            ColliderType::Chamber => self.chambers.take().map(Subsystem::Chambers),
            ColliderType::Prop => self.props.take().map(Subsystem::Props),
        };
        if removed.is_some() {
            self.event_log.push(WorldEvent::Detached { kind });
        }
        removed
    }

    pub fn is_present(&self, kind: ColliderType) -> bool {
        self.source(kind).is_some()
    }

    pub fn ground(&self) -> Option<&GroundGrid> {
        self.ground.as_ref()
    }

    pub fn chambers(&self) -> Option<&ChamberSet> {
        self.chambers.as_ref()
    }

    pub fn props(&self) -> Option<&PropSet> {
        self.props.as_ref()
    }

    fn source(&self, kind: ColliderType) -> Option<&dyn ColliderSource> {
        match kind {
            ColliderType::Ground => self.ground.as_ref().map(|g| g as &dyn ColliderSource),
            ColliderType::Chamber => self.chambers.as_ref().map(|c| c as &dyn ColliderSource),
            ColliderType::Prop => self.props.as_ref().map(|p| p as &dyn ColliderSource),
        }
    }

    /// Registry over the current state, one slot per collider type.
    ///
    /// Cheap to build; callers rebuild it every frame.
    pub fn registry(&self) -> ColliderRegistry<'_> {
        let mut registry = ColliderRegistry::new();
        for kind in ColliderType::ALL {
            registry.register_slot(kind, self.source(kind));
        }
        registry
    }

    /// Read-only access to the edit log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the edit log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn ground_mut(&mut self) -> Result<&mut GroundGrid, WorldError> {
        self.ground
            .as_mut()
            .ok_or(WorldError::SubsystemAbsent(ColliderType::Ground))
    }

    fn props_mut(&mut self) -> Result<&mut PropSet, WorldError> {
        self.props
            .as_mut()
            .ok_or(WorldError::SubsystemAbsent(ColliderType::Prop))
    }

    /// Place a ground block. Returns `false` (and logs nothing) if occupied.
    pub fn place_block(&mut self, coord: BlockCoord) -> Result<bool, WorldError> {
        let placed = self.ground_mut()?.place(coord)?;
        if placed {
            self.event_log.push(WorldEvent::BlockPlaced { coord });
        }
        Ok(placed)
    }

    /// Remove a ground block. Returns `false` (and logs nothing) if empty.
    pub fn remove_block(&mut self, coord: BlockCoord) -> Result<bool, WorldError> {
        let removed = self.ground_mut()?.remove(coord);
        if removed {
            self.event_log.push(WorldEvent::BlockRemoved { coord });
        }
        Ok(removed)
    }

    pub fn spawn_prop(&mut self, half_extents: Vec3, position: Vec3) -> Result<EntityId, WorldError> {
        let id = EntityId::new();
        self.spawn_prop_with_id(id, half_extents, position)?;
        Ok(id)
    }

    pub fn spawn_prop_with_id(
        &mut self,
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    ) -> Result<(), WorldError> {
        self.props_mut()?
            .spawn_with_id(id, half_extents, position)?;
        self.event_log.push(WorldEvent::PropSpawned {
            id,
            half_extents,
            position,
        });
        Ok(())
    }

    pub fn despawn_prop(&mut self, id: EntityId) -> Result<Prop, WorldError> {
        let prop = self
            .props_mut()?
            .despawn(id)
            .ok_or(WorldError::PropNotFound(id))?;
        self.event_log.push(WorldEvent::PropDespawned {
            id,
            half_extents: prop.collider.half_extents(),
            position: prop.position,
        });
        Ok(prop)
    }

    pub fn move_prop(&mut self, id: EntityId, new: Vec3) -> Result<(), WorldError> {
        let old = self.props_mut()?.set_position(id, new)?;
        self.event_log.push(WorldEvent::PropMoved { id, old, new });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_world() -> World {
        let config = WorldConfig {
            cell_size: 1.0,
            ground_half_width: 1,
        };
        World::from_config(&config, &ColliderType::ALL).unwrap()
    }

    #[test]
    fn world_starts_without_subsystems() {
        let world = World::new();
        for kind in ColliderType::ALL {
            assert!(!world.is_present(kind));
        }
        let registry = world.registry();
        assert_eq!(registry.slot_count(), 3);
        assert!(registry.flat_colliders().is_empty());
        assert!(
            registry
                .colliders_by_type()
                .iter()
                .all(|c| c.is_empty())
        );
    }

    #[test]
    fn registry_counts_every_subsystem() {
        let mut world = full_world();
        world.spawn_prop(Vec3::splat(0.25), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let mut chambers = ChamberSet::new();
        chambers
            .add_chamber(Vec3::new(20.0, 3.0, 0.0), Vec3::splat(2.0), 0.5)
            .unwrap();
        world.attach(Subsystem::Chambers(chambers));

        let registry = world.registry();
        let by_type = registry.colliders_by_type();
        assert_eq!(by_type[0].kind, ColliderType::Ground);
        assert_eq!(by_type[0].len(), 9);
        assert_eq!(by_type[1].len(), 6);
        assert_eq!(by_type[2].len(), 1);
        assert_eq!(registry.flat_colliders().len(), 16);
        assert_eq!(registry.collidables().len(), 16);
    }

    #[test]
    fn edits_are_visible_on_next_registry() {
        let mut world = full_world();
        let before = world.registry().flat_colliders().len();

        world.place_block(BlockCoord::new(0, 0, 0)).unwrap();
        assert_eq!(world.registry().flat_colliders().len(), before + 1);

        world.remove_block(BlockCoord::new(0, -1, 0)).unwrap();
        world.remove_block(BlockCoord::new(1, -1, 0)).unwrap();
        assert_eq!(world.registry().flat_colliders().len(), before - 1);
    }

    #[test]
    fn edits_are_logged() {
        let mut world = full_world();
        world.drain_events();

        let c = BlockCoord::new(0, 0, 0);
        assert!(world.place_block(c).unwrap());
        assert!(!world.place_block(c).unwrap());
        let id = world.spawn_prop(Vec3::splat(0.5), Vec3::ZERO).unwrap();
        world.move_prop(id, Vec3::X).unwrap();
        world.despawn_prop(id).unwrap();

        let events = world.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], WorldEvent::BlockPlaced { coord: c });
        assert_eq!(
            events[2],
            WorldEvent::PropMoved {
                id,
                old: Vec3::ZERO,
                new: Vec3::X
            }
        );
        assert!(matches!(events[3], WorldEvent::PropDespawned { .. }));
    }

    #[test]
    fn edits_on_absent_subsystem_fail() {
        let mut world = World::new();
        assert!(matches!(
            world.place_block(BlockCoord::new(0, 0, 0)),
            Err(WorldError::SubsystemAbsent(ColliderType::Ground))
        ));
        assert!(matches!(
            world.spawn_prop(Vec3::ONE, Vec3::ZERO),
            Err(WorldError::SubsystemAbsent(ColliderType::Prop))
        ));
        assert!(world.events().is_empty());
    }

    #[test]
    fn attach_replaces_and_detach_removes() {
        let mut world = full_world();
        let replaced = world.attach(Subsystem::Props(PropSet::new()));
        assert!(matches!(replaced, Some(Subsystem::Props(_))));

        assert!(world.detach(ColliderType::Ground).is_some());
        assert!(world.detach(ColliderType::Ground).is_none());
        assert!(!world.is_present(ColliderType::Ground));
        assert!(world.registry().colliders_by_type()[0].is_empty());
    }
}
