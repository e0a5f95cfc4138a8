//! Simulation kernel: fixed-timestep clock and per-entity rigidbody integration.
//!
//! # Invariants
//! - The clock's accumulator is below one tick length whenever `update` returns.
//! - Rigidbodies advance once per fixed tick, never once per render frame.
//! - A body's grounding timer stays within `[0, tolerance]`.

pub mod clock;
pub mod config;
pub mod rigidbody;

pub use clock::{Clock, ClockConfig};
pub use config::{ConfigError, SimConfig};
pub use rigidbody::{Rigidbody, RigidbodyConfig};

use glam::Vec3;

/// Errors from constructing or reconfiguring kernel state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("tick length must be finite and positive, got {0} ms")]
    InvalidTickLength(f64),
    #[error("time scale must be finite and non-negative, got {0}")]
    InvalidTimeScale(f64),
    #[error("max frame delta must be finite and positive, got {0} ms")]
    InvalidMaxFrameDelta(f64),
    #[error("mass must be finite and positive, got {0}")]
    InvalidMass(f32),
    #[error("drag must be finite and non-negative, got {0}")]
    InvalidDrag(f32),
    #[error("grounding tolerance must be finite and non-negative, got {0} s")]
    InvalidGroundingTolerance(f32),
    #[error("gravity must be finite, got {0:?}")]
    InvalidGravity(Vec3),
}

pub fn crate_info() -> &'static str {
    "blockyard-kernel v0.1.0"
}
