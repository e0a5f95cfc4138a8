use blockyard_collision::{
    BoxCollider, Collidable, CollidableView, CollisionError, CollisionInfo, CollisionResponse,
};
use blockyard_common::ColliderType;
use blockyard_kernel::Rigidbody;
use blockyard_world::{ChamberSet, Subsystem, World, WorldConfig, WorldError};
use glam::Vec3;

/// Half extents of the simulated player body.
pub const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.3, 0.9, 0.3);

/// How far below the body we look for support.
const CONTACT_SKIN: f32 = 1e-3;

/// A 9x9 floor, one chamber off to the side, and a crate on the floor.
pub fn demo_world() -> Result<World, WorldError> {
    let config = WorldConfig {
        cell_size: 1.0,
        ground_half_width: 4,
    };
    let mut world = World::from_config(&config, &[ColliderType::Ground, ColliderType::Prop])?;

    let mut chambers = ChamberSet::new();
    chambers.add_chamber(Vec3::new(20.0, 3.0, 0.0), Vec3::new(4.0, 3.0, 4.0), 0.5)?;
    world.attach(Subsystem::Chambers(chambers));
    world.spawn_prop(Vec3::splat(0.5), Vec3::new(2.5, 0.5, 2.5))?;
    Ok(world)
}

/// Vertical-only contact resolution for a body standing on blocking colliders.
///
/// Pushes the body up out of anything it has sunk into from above, reports
/// contact to the body, and notifies every collidable it touched. Returns the
/// number of contacts.
pub fn resolve_contacts(
    views: &[CollidableView<'_>],
    body: &mut Rigidbody,
    position: &mut Vec3,
) -> Result<usize, CollisionError> {
    let mut contacts = 0;
    for view in views {
        match view.collision_response() {
            CollisionResponse::Block => {}
            _ => continue,
        }
        let probe = BoxCollider::new(BODY_HALF_EXTENTS, *position - Vec3::Y * CONTACT_SKIN)?;
        let target = view.collider();
        if !probe.overlaps(target) || position.y < target.center().y {
            continue;
        }

        let top = target.max().y;
        if position.y - BODY_HALF_EXTENTS.y < top {
            position.y = top + BODY_HALF_EXTENTS.y;
        }
        let v = body.velocity();
        if v.y < 0.0 {
            body.set_velocity(Vec3::new(v.x, 0.0, v.z));
        }

        view.on_collision(&CollisionInfo {
            kind: view.kind(),
            min: probe.min(),
            max: probe.max(),
        });
        contacts += 1;
    }
    body.set_colliding(contacts > 0);
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockyard_kernel::RigidbodyConfig;

    #[test]
    fn demo_world_has_every_subsystem() {
        let world = demo_world().unwrap();
        let registry = world.registry();
        let by_type = registry.colliders_by_type();
        assert_eq!(by_type[0].len(), 81);
        assert_eq!(by_type[1].len(), 6);
        assert_eq!(by_type[2].len(), 1);
    }

    #[test]
    fn falling_body_comes_to_rest_on_floor() {
        let world = demo_world().unwrap();
        let registry = world.registry();
        let views = registry.collidables();

        let mut body = Rigidbody::new(RigidbodyConfig::default()).unwrap();
        let mut position = Vec3::new(-1.5, 4.0, -1.5);
        for _ in 0..300 {
            body.update(1.0 / 60.0, &mut position);
            resolve_contacts(&views, &mut body, &mut position).unwrap();
        }

        assert!((position.y - BODY_HALF_EXTENTS.y).abs() < 0.05);
        assert!(body.velocity().y.abs() < 1e-3);
        assert!(body.is_colliding());
    }

    #[test]
    fn no_contact_in_open_air() {
        let world = demo_world().unwrap();
        let registry = world.registry();
        let views = registry.collidables();
        let mut body = Rigidbody::new(RigidbodyConfig::default()).unwrap();
        let mut position = Vec3::new(0.5, 10.0, 0.5);
        assert_eq!(resolve_contacts(&views, &mut body, &mut position).unwrap(), 0);
        assert!(!body.is_colliding());
    }
}
