//! Physics collaborator surface
//!
//! The experiment driver treats the physics engine as an opaque collaborator:
//! create bodies, step the world by a fixed time step, read positions back.
//! The built-in [`RigidWorld`] backend implements just enough rigid-body
//! motion for the drop experiment; tests substitute scripted worlds.

pub mod world;

pub use world::RigidWorld;

use glam::{Quat, Vec3};

/// Opaque handle to a body in a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Collision shapes understood by the collaborator.
///
/// Both shapes extend along their local x axis; the body's orientation
/// rotates that axis into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cylinder { radius: f32, half_length: f32 },
    Capsule { radius: f32, half_length: f32 },
}

impl Shape {
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Cylinder { radius, .. } | Shape::Capsule { radius, .. } => radius,
        }
    }

    pub fn half_length(&self) -> f32 {
        match *self {
            Shape::Cylinder { half_length, .. } | Shape::Capsule { half_length, .. } => half_length,
        }
    }
}

/// Errors surfaced by a physics backend. Every one of them is fatal to the
/// run that triggered it; callers propagate, never retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// Handle does not name a live body
    UnknownBody(BodyHandle),
    /// Shape parameters the backend cannot place
    InvalidShape(&'static str),
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicsError::UnknownBody(handle) => write!(f, "unknown body handle {}", handle.0),
            PhysicsError::InvalidShape(reason) => write!(f, "invalid shape: {reason}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Capability set the experiment driver consumes.
///
/// One world is one execution context: single-threaded, stepped in a
/// blocking loop, exclusively owned by its caller. Lifecycle is
/// `create -> use -> reset/drop`, so tests can run several independent
/// worlds side by side.
pub trait PhysicsWorld {
    /// Remove every body from the world
    fn reset(&mut self);

    /// Create an immovable, collision-only body
    fn create_static_body(
        &mut self,
        shape: Shape,
        position: Vec3,
        orientation: Quat,
    ) -> Result<BodyHandle>;

    /// Create a dynamic body with the given mass
    fn create_dynamic_body(
        &mut self,
        shape: Shape,
        mass: f32,
        position: Vec3,
        orientation: Quat,
    ) -> Result<BodyHandle>;

    /// Exempt this body from collisions with other dynamic bodies
    fn set_no_self_collision(&mut self, body: BodyHandle) -> Result<()>;

    /// Advance the world by one fixed step
    fn step(&mut self) -> Result<()>;

    /// Current position of a body's center
    fn position(&self, body: BodyHandle) -> Result<Vec3>;

    /// Remove a body from the world
    fn remove_body(&mut self, body: BodyHandle) -> Result<()>;

    /// Duration of one fixed step in seconds
    fn fixed_step_duration(&self) -> f32;
}
