use blockyard_common::ColliderType;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collider::BoxCollider;

/// How a collider reacts when something runs into it.
///
/// Every collider currently blocks. Further kinds (trigger volumes, ignored
/// geometry) slot in here as new variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum CollisionResponse {
    #[default]
    Block,
}

/// A collider borrowed from its owning subsystem, paired with the owner's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderEntry<'a> {
    pub collider: &'a BoxCollider,
    pub position: Vec3,
}

impl<'a> ColliderEntry<'a> {
    pub fn new(collider: &'a BoxCollider, position: Vec3) -> Self {
        Self { collider, position }
    }
}

/// Implemented by each world subsystem that owns colliders.
///
/// `all_colliders` is called on every registry query, so it must reflect the
/// subsystem's state at call time.
pub trait ColliderSource {
    /// Tag reported for this subsystem's colliders.
    fn collider_type(&self) -> ColliderType;

    /// Current colliders, in the subsystem's own stable order.
    fn all_colliders(&self) -> Vec<ColliderEntry<'_>>;

    /// Response applied to every collider of this subsystem.
    fn collision_response(&self) -> CollisionResponse {
        CollisionResponse::Block
    }
}

/// Colliders of one subsystem, tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderCollection<'w> {
    pub kind: ColliderType,
    pub entries: Vec<ColliderEntry<'w>>,
}

impl ColliderCollection<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render/physics agnostic flat record used by movement resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCollider<'w> {
    pub collider: &'w BoxCollider,
    pub position: Vec3,
    pub kind: ColliderType,
}

/// Summary of a collidable handed to collision hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub kind: ColliderType,
    pub min: Vec3,
    pub max: Vec3,
}

/// Uniform, read-only query surface over anything that can be collided with.
pub trait Collidable {
    fn collider(&self) -> &BoxCollider;

    fn position(&self) -> Vec3;

    fn collision_info(&self) -> CollisionInfo;

    fn collision_response(&self) -> CollisionResponse;

    /// Called by movement resolution when `other` runs into this collidable.
    fn on_collision(&self, other: &CollisionInfo);
}

/// Registry-produced [`Collidable`] over a borrowed collider.
///
/// Built fresh for each query; has no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollidableView<'w> {
    entry: ColliderEntry<'w>,
    kind: ColliderType,
    response: CollisionResponse,
}

impl<'w> CollidableView<'w> {
    pub fn kind(&self) -> ColliderType {
        self.kind
    }

    /// The underlying collider with the registry's lifetime.
    pub fn collider_ref(&self) -> &'w BoxCollider {
        self.entry.collider
    }
}

impl Collidable for CollidableView<'_> {
    fn collider(&self) -> &BoxCollider {
        self.entry.collider
    }

    fn position(&self) -> Vec3 {
        self.entry.position
    }

    fn collision_info(&self) -> CollisionInfo {
        CollisionInfo {
            kind: self.kind,
            min: self.entry.collider.min(),
            max: self.entry.collider.max(),
        }
    }

    fn collision_response(&self) -> CollisionResponse {
        self.response
    }

    fn on_collision(&self, other: &CollisionInfo) {
        tracing::trace!(kind = %self.kind, other = %other.kind, "collision");
    }
}

struct Slot<'w> {
    kind: ColliderType,
    source: Option<&'w dyn ColliderSource>,
}

/// Aggregates colliders from independent world subsystems.
///
/// The registry only borrows its sources. Every query walks the sources again,
/// so cost is linear in the total collider count and results are never stale.
#[derive(Default)]
pub struct ColliderRegistry<'w> {
    slots: Vec<Slot<'w>>,
}

impl<'w> ColliderRegistry<'w> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a subsystem under its own type tag.
    pub fn register(&mut self, source: &'w dyn ColliderSource) {
        self.register_slot(source.collider_type(), Some(source));
    }

    /// Declare a slot whose subsystem may not exist yet.
    ///
    /// An absent subsystem contributes an empty collection to every query.
    pub fn register_slot(&mut self, kind: ColliderType, source: Option<&'w dyn ColliderSource>) {
        self.slots.push(Slot { kind, source });
    }

    /// Number of declared slots, present or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Colliders grouped by subsystem, in registration order.
    pub fn colliders_by_type(&self) -> Vec<ColliderCollection<'w>> {
        self.slots
            .iter()
            .map(|slot| {
                let entries = match slot.source {
                    Some(source) => source.all_colliders(),
                    None => {
                        tracing::trace!(kind = %slot.kind, "subsystem absent, contributing nothing");
                        Vec::new()
                    }
                };
                ColliderCollection {
                    kind: slot.kind,
                    entries,
                }
            })
            .collect()
    }

    /// Every collider wrapped in the [`Collidable`] surface.
    pub fn collidables(&self) -> Vec<CollidableView<'w>> {
        let mut out = Vec::new();
        for slot in &self.slots {
            let Some(source) = slot.source else {
                continue;
            };
            let response = source.collision_response();
            out.extend(
                source
                    .all_colliders()
                    .into_iter()
                    .map(|entry| CollidableView {
                        entry,
                        kind: slot.kind,
                        response,
                    }),
            );
        }
        tracing::trace!(count = out.len(), "collidables view built");
        out
    }

    /// Flat list of every collider with its position and type tag.
    pub fn flat_colliders(&self) -> Vec<FlatCollider<'w>> {
        self.colliders_by_type()
            .into_iter()
            .flat_map(|collection| {
                let kind = collection.kind;
                collection
                    .entries
                    .into_iter()
                    .map(move |entry| FlatCollider {
                        collider: entry.collider,
                        position: entry.position,
                        kind,
                    })
            })
            .collect()
    }

    /// Total colliders across all present subsystems.
    pub fn total_colliders(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.source)
            .map(|source| source.all_colliders().len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Boxes {
        kind: ColliderType,
        boxes: Vec<BoxCollider>,
    }

    impl Boxes {
        fn new(kind: ColliderType, count: usize) -> Self {
            let boxes = (0..count)
                .map(|i| BoxCollider::cube(1.0, Vec3::new(i as f32 * 2.0, 0.0, 0.0)).unwrap())
                .collect();
            Self { kind, boxes }
        }
    }

    impl ColliderSource for Boxes {
        fn collider_type(&self) -> ColliderType {
            self.kind
        }

        fn all_colliders(&self) -> Vec<ColliderEntry<'_>> {
            self.boxes
                .iter()
                .map(|b| ColliderEntry::new(b, b.center()))
                .collect()
        }
    }

    /// Source whose visible collider count changes behind a shared reference.
    struct Toggling {
        boxes: Vec<BoxCollider>,
        active: Cell<usize>,
    }

    impl ColliderSource for Toggling {
        fn collider_type(&self) -> ColliderType {
            ColliderType::Prop
        }

        fn all_colliders(&self) -> Vec<ColliderEntry<'_>> {
            self.boxes[..self.active.get()]
                .iter()
                .map(|b| ColliderEntry::new(b, b.center()))
                .collect()
        }
    }

    #[test]
    fn by_type_keeps_registration_order_and_tags() {
        let ground = Boxes::new(ColliderType::Ground, 3);
        let chambers = Boxes::new(ColliderType::Chamber, 2);
        let mut registry = ColliderRegistry::new();
        registry.register(&ground);
        registry.register(&chambers);

        let collections = registry.colliders_by_type();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].kind, ColliderType::Ground);
        assert_eq!(collections[0].len(), 3);
        assert_eq!(collections[1].kind, ColliderType::Chamber);
        assert_eq!(collections[1].len(), 2);
    }

    #[test]
    fn flat_length_is_sum_of_sources() {
        let ground = Boxes::new(ColliderType::Ground, 4);
        let chambers = Boxes::new(ColliderType::Chamber, 6);
        let props = Boxes::new(ColliderType::Prop, 1);
        let mut registry = ColliderRegistry::new();
        registry.register(&ground);
        registry.register(&chambers);
        registry.register(&props);

        let flat = registry.flat_colliders();
        assert_eq!(flat.len(), 11);
        assert_eq!(registry.total_colliders(), 11);
        assert_eq!(flat[0].kind, ColliderType::Ground);
        assert_eq!(flat[10].kind, ColliderType::Prop);
    }

    #[test]
    fn absent_subsystem_contributes_empty_collection() {
        let ground = Boxes::new(ColliderType::Ground, 2);
        let mut registry = ColliderRegistry::new();
        registry.register(&ground);
        registry.register_slot(ColliderType::Chamber, None);

        let collections = registry.colliders_by_type();
        assert_eq!(collections.len(), 2);
        assert!(collections[1].is_empty());
        assert_eq!(registry.flat_colliders().len(), 2);
        assert_eq!(registry.collidables().len(), 2);
    }

    #[test]
    fn empty_registry_is_not_an_error() {
        let registry = ColliderRegistry::new();
        assert!(registry.colliders_by_type().is_empty());
        assert!(registry.collidables().is_empty());
        assert_eq!(registry.total_colliders(), 0);
    }

    #[test]
    fn changes_show_up_on_next_query() {
        let source = Toggling {
            boxes: Boxes::new(ColliderType::Prop, 3).boxes,
            active: Cell::new(1),
        };
        let mut registry = ColliderRegistry::new();
        registry.register(&source);
        assert_eq!(registry.flat_colliders().len(), 1);

        source.active.set(3);
        assert_eq!(registry.flat_colliders().len(), 3);
        assert_eq!(registry.collidables().len(), 3);

        source.active.set(0);
        assert!(registry.flat_colliders().is_empty());
        assert!(registry.colliders_by_type()[0].is_empty());
    }

    #[test]
    fn collidable_view_exposes_block_response_and_bounds() {
        let props = Boxes::new(ColliderType::Prop, 1);
        let mut registry = ColliderRegistry::new();
        registry.register(&props);

        let views = registry.collidables();
        let view = &views[0];
        assert_eq!(view.collision_response(), CollisionResponse::Block);
        let info = view.collision_info();
        assert_eq!(info.kind, ColliderType::Prop);
        assert_eq!(info.min, Vec3::splat(-0.5));
        assert_eq!(info.max, Vec3::splat(0.5));
        assert_eq!(view.position(), Vec3::ZERO);
        view.on_collision(&info);
    }
}
