use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Longest step a body will integrate; longer hitches are truncated.
pub const MAX_STEP_SECONDS: f32 = 0.1;

/// Conventional grace period after a contact during which gravity is off.
pub const DEFAULT_GROUNDING_TOLERANCE: f32 = 0.5;

/// Remaining grounding time below this is treated as expired.
const TIMER_SNAP: f32 = 1e-6;

/// Physical parameters for a [`Rigidbody`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidbodyConfig {
    pub mass: f32,
    /// Linear drag coefficient, per second.
    pub drag: f32,
    /// Gravitational acceleration.
    pub gravity: Vec3,
    /// Seconds gravity stays suppressed after the last reported contact.
    pub grounding_tolerance: f32,
}

impl Default for RigidbodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            drag: 1.5,
            gravity: Vec3::new(0.0, -20.0, 0.0),
            grounding_tolerance: DEFAULT_GROUNDING_TOLERANCE,
        }
    }
}

impl RigidbodyConfig {
    pub fn validate(&self) -> Result<(), KernelError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(KernelError::InvalidMass(self.mass));
        }
        if !self.drag.is_finite() || self.drag < 0.0 {
            return Err(KernelError::InvalidDrag(self.drag));
        }
        if !self.gravity.is_finite() {
            return Err(KernelError::InvalidGravity(self.gravity));
        }
        if !self.grounding_tolerance.is_finite() || self.grounding_tolerance < 0.0 {
            return Err(KernelError::InvalidGroundingTolerance(self.grounding_tolerance));
        }
        Ok(())
    }
}

/// Velocity/acceleration integrator for one entity.
///
/// The body does not own its position: [`Rigidbody::update`] writes into the
/// caller's storage. Forces only act for the step they were added in.
///
/// Grounding is tracked with a grace timer rather than the instantaneous
/// contact state, so a body bouncing in and out of contact on alternate ticks
/// does not accumulate gravity and jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    velocity: Vec3,
    acceleration: Vec3,
    mass: f32,
    drag: f32,
    gravity: Vec3,
    grounding_timer: f32,
    grounding_tolerance: f32,
    /// Contact reported for the upcoming step; cleared after each update.
    in_contact: bool,
}

impl Rigidbody {
    pub fn new(config: RigidbodyConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass: config.mass,
            drag: config.drag,
            gravity: config.gravity,
            grounding_timer: 0.0,
            grounding_tolerance: config.grounding_tolerance,
            in_contact: false,
        })
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Acceleration accumulated for the next step.
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn grounding_timer(&self) -> f32 {
        self.grounding_timer
    }

    pub fn grounding_tolerance(&self) -> f32 {
        self.grounding_tolerance
    }

    /// Apply a force for the next step only.
    pub fn add_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// Report contact state from movement resolution.
    ///
    /// `true` refills the grounding timer and holds it for the next step.
    pub fn set_colliding(&mut self, colliding: bool) {
        self.in_contact = colliding;
        if colliding {
            self.grounding_timer = self.grounding_tolerance;
        }
    }

    /// Whether the body has been in contact within the grounding tolerance.
    pub fn is_colliding(&self) -> bool {
        self.grounding_timer > 0.0
    }

    /// Integrate one step of `delta_time` seconds, moving `position` in place.
    pub fn update(&mut self, delta_time: f32, position: &mut Vec3) {
        let dt = if delta_time.is_finite() {
            delta_time.clamp(0.0, MAX_STEP_SECONDS)
        } else {
            0.0
        };

        let grounded = self.grounding_timer > 0.0;
        if !self.in_contact {
            self.grounding_timer -= dt;
            if self.grounding_timer <= TIMER_SNAP {
                self.grounding_timer = 0.0;
            }
        }
        if !grounded {
            self.acceleration += self.gravity;
        }

        // Semi-implicit Euler: velocity first, then position with the new velocity.
        self.velocity += self.acceleration * dt;
        *position += self.velocity * dt;

        // Clamped so a large drag * dt stops the body instead of reversing it.
        self.velocity *= (1.0 - self.drag * dt).max(0.0);

        self.acceleration = Vec3::ZERO;
        self.in_contact = false;

        tracing::trace!(
            dt,
            grounded,
            velocity = ?self.velocity,
            position = ?*position,
            "rigidbody step"
        );
    }
}
