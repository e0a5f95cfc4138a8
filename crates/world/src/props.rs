use blockyard_collision::{BoxCollider, ColliderEntry, ColliderSource};
use blockyard_common::{ColliderType, EntityId};
use glam::Vec3;
use std::collections::BTreeMap;

use crate::WorldError;

/// A dynamic object with a box collider that follows its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub collider: BoxCollider,
    pub position: Vec3,
}

/// All dynamic props, keyed by entity id.
#[derive(Debug, Clone, Default)]
pub struct PropSet {
    props: BTreeMap<EntityId, Prop>,
}

impl PropSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Prop> {
        self.props.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.props.keys().copied()
    }

    /// Spawn a prop centered on `position`.
    pub fn spawn(&mut self, half_extents: Vec3, position: Vec3) -> Result<EntityId, WorldError> {
        let id = EntityId::new();
        self.spawn_with_id(id, half_extents, position)?;
        Ok(id)
    }

    /// Spawn with a known id (used when undoing a despawn).
    pub fn spawn_with_id(
        &mut self,
        id: EntityId,
        half_extents: Vec3,
        position: Vec3,
    ) -> Result<(), WorldError> {
        let collider = BoxCollider::new(half_extents, position)?;
        self.props.insert(id, Prop { collider, position });
        Ok(())
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Prop> {
        self.props.remove(&id)
    }

    /// Move a prop; its collider moves with it. Returns the old position.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<Vec3, WorldError> {
        let prop = self
            .props
            .get_mut(&id)
            .ok_or(WorldError::PropNotFound(id))?;
        let old = prop.position;
        prop.position = position;
        prop.collider.set_center(position);
        Ok(old)
    }

    /// Id of the prop owning `collider`, if any.
    pub fn id_of(&self, collider: &BoxCollider) -> Option<EntityId> {
        self.props
            .iter()
            .find(|(_, p)| std::ptr::eq(&p.collider, collider))
            .map(|(id, _)| *id)
    }
}

impl ColliderSource for PropSet {
    fn collider_type(&self) -> ColliderType {
        ColliderType::Prop
    }

    fn all_colliders(&self) -> Vec<ColliderEntry<'_>> {
        self.props
            .values()
            .map(|p| ColliderEntry::new(&p.collider, p.position))
            .collect()
    }
}
