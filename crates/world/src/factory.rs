use blockyard_common::ColliderType;
use serde::{Deserialize, Serialize};

use crate::WorldError;
use crate::chamber::ChamberSet;
use crate::ground::GroundGrid;
use crate::props::PropSet;

/// Settings used when building subsystems at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of one ground block.
    pub cell_size: f32,
    /// Starting floor spans `-half_width..=half_width` cells on X and Z.
    pub ground_half_width: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            ground_half_width: 8,
        }
    }
}

/// One world subsystem, as produced by [`build_subsystem`].
#[derive(Debug, Clone)]
pub enum Subsystem {
    Ground(GroundGrid),
    Chambers(ChamberSet),
    Props(PropSet),
}

impl Subsystem {
    pub fn kind(&self) -> ColliderType {
        match self {
            Self::Ground(_) => ColliderType::Ground,
            Self::Chambers(_) => ColliderType::Chamber,
            Self::Props(_) => ColliderType::Prop,
        }
    }
}

/// Build the subsystem registered under `kind`.
pub fn build_subsystem(kind: ColliderType, config: &WorldConfig) -> Result<Subsystem, WorldError> {
    let subsystem = match kind {
        ColliderType::Ground => Subsystem::Ground(GroundGrid::flat(
            config.cell_size,
            config.ground_half_width,
        )?),
        ColliderType::Chamber => Subsystem::Chambers(ChamberSet::new()),
        ColliderType::Prop => Subsystem::Props(PropSet::new()),
    };
    tracing::debug!(%kind, "built subsystem");
    Ok(subsystem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_is_keyed_by_type() {
        let config = WorldConfig {
            cell_size: 1.0,
            ground_half_width: 1,
        };
        for kind in ColliderType::ALL {
            let built = build_subsystem(kind, &config).unwrap();
            assert_eq!(built.kind(), kind);
        }
        match build_subsystem(ColliderType::Ground, &config).unwrap() {
            Subsystem::Ground(grid) => assert_eq!(grid.len(), 9),
            other => panic!("expected ground, got {:?}", other.kind()),
        }
    }

    #[test]
    fn invalid_cell_size_fails_ground() {
        let config = WorldConfig {
            cell_size: -1.0,
            ..WorldConfig::default()
        };
        assert!(build_subsystem(ColliderType::Ground, &config).is_err());
        assert!(build_subsystem(ColliderType::Prop, &config).is_ok());
    }
}
