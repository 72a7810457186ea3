//! Built-in rigid-body backend
//!
//! Just enough dynamics for the drop experiment: semi-implicit Euler gravity
//! integration of falling bodies, contact against static horizontal cylinders
//! and the ground plane. A body that touches a bar or the ground comes to
//! rest where it hit. No restitution, no friction, no dynamic-dynamic
//! contacts - the experiment disables pencil-pencil collisions anyway.
//!
//! Everything is pure f32 arithmetic with a stable body iteration order, so
//! a world stepped from the same inputs always produces the same positions.

use glam::{Quat, Vec2, Vec3};

use super::{BodyHandle, PhysicsError, PhysicsWorld, Result, Shape};
use crate::consts::FIXED_STEP;

#[derive(Debug, Clone, Copy)]
enum Motion {
    Static,
    Dynamic { velocity: Vec3, resting: bool },
}

#[derive(Debug, Clone)]
struct Body {
    shape: Shape,
    position: Vec3,
    orientation: Quat,
    motion: Motion,
}

/// Horizontal bar a falling body can land on
#[derive(Debug, Clone, Copy)]
struct Obstacle {
    center: Vec2,
    axis: Vec2,
    half_length: f32,
    radius: f32,
    height: f32,
}

/// Simplified rigid-body world with a fixed step and uniform gravity
#[derive(Debug)]
pub struct RigidWorld {
    gravity: f32,
    dt: f32,
    bodies: Vec<Option<Body>>,
    next_id: u32,
    /// First id of the current world generation; `bodies[id - base]`
    base: u32,
}

impl RigidWorld {
    /// New empty world. `gravity` is the z acceleration (negative = down).
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            dt: FIXED_STEP,
            bodies: Vec::new(),
            next_id: 0,
            base: 0,
        }
    }

    /// Slot index for a handle, if it belongs to the current generation
    fn index(&self, handle: BodyHandle) -> Option<usize> {
        handle.0.checked_sub(self.base).map(|i| i as usize)
    }

    fn slot(&self, handle: BodyHandle) -> Result<&Body> {
        self.index(handle)
            .and_then(|i| self.bodies.get(i))
            .and_then(|slot| slot.as_ref())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn slot_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.index(handle)
            .and_then(|i| self.bodies.get_mut(i))
            .and_then(|slot| slot.as_mut())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn insert(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.push(Some(body));
        handle
    }

    fn validate(shape: Shape) -> Result<()> {
        if shape.radius() <= 0.0 {
            return Err(PhysicsError::InvalidShape("non-positive radius"));
        }
        if shape.half_length() < 0.0 {
            return Err(PhysicsError::InvalidShape("negative half length"));
        }
        Ok(())
    }

    /// Unit direction of a body's axis projected into the xy plane, or zero
    /// when the axis points straight up.
    fn horizontal_axis(orientation: Quat) -> Vec2 {
        let axis = orientation * Vec3::X;
        let flat = Vec2::new(axis.x, axis.y);
        if flat.length_squared() > 1e-8 {
            flat.normalize()
        } else {
            Vec2::ZERO
        }
    }

    fn obstacles(&self) -> Vec<Obstacle> {
        self.bodies
            .iter()
            .flatten()
            .filter(|body| matches!(body.motion, Motion::Static))
            .map(|body| Obstacle {
                center: Vec2::new(body.position.x, body.position.y),
                axis: Self::horizontal_axis(body.orientation),
                half_length: body.shape.half_length(),
                radius: body.shape.radius(),
                height: body.position.z,
            })
            .collect()
    }
}

impl PhysicsWorld for RigidWorld {
    fn reset(&mut self) {
        // Handles stay monotonic across resets so a stale handle from a
        // previous world generation can never alias a new body. The base
        // moves with the counter to keep slot indices starting at 0.
        self.bodies.clear();
        self.base = self.next_id;
    }

    fn create_static_body(
        &mut self,
        shape: Shape,
        position: Vec3,
        orientation: Quat,
    ) -> Result<BodyHandle> {
        Self::validate(shape)?;
        Ok(self.insert(Body {
            shape,
            position,
            orientation,
            motion: Motion::Static,
        }))
    }

    fn create_dynamic_body(
        &mut self,
        shape: Shape,
        mass: f32,
        position: Vec3,
        orientation: Quat,
    ) -> Result<BodyHandle> {
        Self::validate(shape)?;
        if mass <= 0.0 {
            return Err(PhysicsError::InvalidShape("non-positive mass"));
        }
        Ok(self.insert(Body {
            shape,
            position,
            orientation,
            motion: Motion::Dynamic {
                velocity: Vec3::ZERO,
                resting: false,
            },
        }))
    }

    fn set_no_self_collision(&mut self, body: BodyHandle) -> Result<()> {
        // Dynamic bodies never collide with one another in this backend, so
        // the call only has to validate the handle.
        self.slot(body).map(|_| ())
    }

    fn step(&mut self) -> Result<()> {
        let obstacles = self.obstacles();
        let dt = self.dt;
        let gravity = self.gravity;

        for slot in self.bodies.iter_mut() {
            let Some(body) = slot else { continue };
            let Motion::Dynamic {
                ref mut velocity,
                ref mut resting,
            } = body.motion
            else {
                continue;
            };
            if *resting {
                continue;
            }

            velocity.z += gravity * dt;
            let next = body.position + *velocity * dt;

            let radius = body.shape.radius();
            let half_length = body.shape.half_length();
            let axis = Self::horizontal_axis(body.orientation);
            let center = Vec2::new(next.x, next.y);

            // Contact against a bar: the axes are both horizontal, so the
            // two surfaces touch when the xy separation of the axis segments
            // drops below the radius sum and the body's height crosses the
            // contact surface z = bar.z + sqrt(sum^2 - d^2).
            let mut landed = None;
            if velocity.z < 0.0 {
                for bar in &obstacles {
                    let sum = radius + bar.radius;
                    let d = segment_distance(
                        center,
                        axis,
                        half_length,
                        bar.center,
                        bar.axis,
                        bar.half_length,
                    );
                    if d >= sum {
                        continue;
                    }
                    let contact_z = bar.height + (sum * sum - d * d).sqrt();
                    if body.position.z >= contact_z && next.z <= contact_z {
                        landed = Some(contact_z);
                        break;
                    }
                }
            }

            if let Some(contact_z) = landed {
                body.position = Vec3::new(next.x, next.y, contact_z);
                *velocity = Vec3::ZERO;
                *resting = true;
                log::trace!("body at rest on a bar, z = {contact_z:.4}");
            } else if next.z <= radius {
                // Ground plane at z = 0
                body.position = Vec3::new(next.x, next.y, radius);
                *velocity = Vec3::ZERO;
                *resting = true;
                log::trace!("body at rest on the ground at ({:.3}, {:.3})", next.x, next.y);
            } else {
                body.position = next;
            }
        }
        Ok(())
    }

    fn position(&self, body: BodyHandle) -> Result<Vec3> {
        self.slot(body).map(|b| b.position)
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<()> {
        self.slot_mut(body)?;
        let index = self.index(body).ok_or(PhysicsError::UnknownBody(body))?;
        self.bodies[index] = None;
        Ok(())
    }

    fn fixed_step_duration(&self) -> f32 {
        self.dt
    }
}

/// Minimum distance between two 2-D segments, each given as center +- half_len * axis.
fn segment_distance(c1: Vec2, a1: Vec2, h1: f32, c2: Vec2, a2: Vec2, h2: f32) -> f32 {
    let (p1, q1) = endpoints(c1, a1, h1);
    let (p2, q2) = endpoints(c2, a2, h2);

    if segments_intersect(p1, q1, p2, q2) {
        return 0.0;
    }

    point_segment_distance(p1, p2, q2)
        .min(point_segment_distance(q1, p2, q2))
        .min(point_segment_distance(p2, p1, q1))
        .min(point_segment_distance(q2, p1, q1))
}

fn endpoints(center: Vec2, axis: Vec2, half_len: f32) -> (Vec2, Vec2) {
    let offset = axis * half_len;
    (center - offset, center + offset)
}

fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn segments_intersect(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> bool {
    let d1 = orient(p2, q2, p1);
    let d2 = orient(p2, q2, q1);
    let d3 = orient(p1, q1, p2);
    let d4 = orient(p1, q1, q2);
    // Proper crossings only; touching and collinear overlap are handled by
    // the endpoint distances going to ~0.
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0)
}
