use blockyard_common::{ColliderType, EntityId};
use blockyard_kernel::Clock;
use blockyard_world::World;

/// World inspector for developer tooling.
///
/// Provides read-only queries against world state for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Collider counts per subsystem, taken from a fresh registry.
    pub fn summary(world: &World) -> WorldSummary {
        let registry = world.registry();
        let counts = registry
            .colliders_by_type()
            .iter()
            .map(|c| (c.kind, world.is_present(c.kind), c.len()))
            .collect();
        WorldSummary {
            counts,
            total: registry.total_colliders(),
            pending_events: world.events().len(),
        }
    }

    /// Position and size of a single prop.
    pub fn inspect_prop(world: &World, id: EntityId) -> Option<PropInfo> {
        let prop = world.props()?.get(id)?;
        let p = prop.position;
        let h = prop.collider.half_extents();
        Some(PropInfo {
            id,
            position: [p.x, p.y, p.z],
            half_extents: [h.x, h.y, h.z],
        })
    }

    /// List all prop ids in the world.
    pub fn list_props(world: &World) -> Vec<EntityId> {
        world
            .props()
            .map(|p| p.ids().collect())
            .unwrap_or_default()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    /// `(type, attached, collider count)` in registry order.
    pub counts: Vec<(ColliderType, bool, usize)>,
    pub total: usize,
    pub pending_events: usize,
}

impl WorldSummary {
    /// Collider count for one type; absent subsystems count as zero.
    pub fn count(&self, kind: ColliderType) -> usize {
        self.counts
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map_or(0, |(_, _, n)| *n)
    }
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "World: colliders={}", self.total)?;
        for (kind, attached, n) in &self.counts {
            if *attached {
                write!(f, " {kind}={n}")?;
            } else {
                write!(f, " {kind}=absent")?;
            }
        }
        write!(f, " pending_events={}", self.pending_events)
    }
}

/// Detailed info about a single prop.
#[derive(Debug, Clone)]
pub struct PropInfo {
    pub id: EntityId,
    pub position: [f32; 3],
    pub half_extents: [f32; 3],
}

impl std::fmt::Display for PropInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Prop [{:.8}] pos=({:.2}, {:.2}, {:.2}) half=({:.2}, {:.2}, {:.2})",
            &self.id.0.to_string()[..8],
            self.position[0],
            self.position[1],
            self.position[2],
            self.half_extents[0],
            self.half_extents[1],
            self.half_extents[2],
        )
    }
}

/// Clock inspector for developer tooling.
pub struct ClockInspector;

impl ClockInspector {
    /// Produce a summary of the clock state.
    pub fn summary(clock: &Clock) -> ClockSummary {
        ClockSummary {
            tick_count: clock.tick_count(),
            paused: clock.is_paused(),
            time_scale: clock.time_scale(),
            alpha: clock.interpolation_alpha(),
            paused_total_ms: clock.paused_total_ms(),
        }
    }
}

/// Summary of clock state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSummary {
    pub tick_count: u64,
    pub paused: bool,
    pub time_scale: f64,
    pub alpha: f64,
    pub paused_total_ms: f64,
}

impl std::fmt::Display for ClockSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Clock: ticks={} paused={} scale={:.2} alpha={:.3} paused_total={:.1}ms",
            self.tick_count, self.paused, self.time_scale, self.alpha, self.paused_total_ms
        )
    }
}
