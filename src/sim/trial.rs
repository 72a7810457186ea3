//! Timed drop batches
//!
//! One trial: staggered drops of capsule bodies through the polarizer,
//! classification of each body a fixed observation delay after its drop,
//! one pass-rate scalar out. The loop owns every body it creates from drop
//! until classification, tracked in the Pending Set.

use glam::{Quat, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::polarizer::{build_polarizer, PolarizerSpec};
use crate::consts::DROP_REGION_HALF;
use crate::physics::{BodyHandle, PhysicsWorld, Result, Shape};

/// Parameters for one trial batch
#[derive(Debug, Clone, Copy)]
pub struct TrialParams {
    pub num_bodies: u32,
    /// Simulated seconds between consecutive drops
    pub drop_interval: f32,
    /// Simulated seconds after a drop before the body is classified
    pub observation_delay: f32,
    pub drop_height: f32,
    pub pencil_radius: f32,
    pub pencil_half_length: f32,
    pub pencil_mass: f32,
    /// Height at or below which a classified body counts as passed
    pub ground_threshold: f32,
}

impl Default for TrialParams {
    fn default() -> Self {
        Self {
            num_bodies: 100,
            drop_interval: 0.1,
            observation_delay: 3.0,
            drop_height: 10.0,
            pencil_radius: 0.02,
            pencil_half_length: 0.2,
            pencil_mass: 1.0,
            ground_threshold: crate::consts::GROUND_THRESHOLD,
        }
    }
}

/// Outcome counters for one batch.
///
/// Invariant: `successful_passes <= total_classified <= num_bodies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub successful_passes: u32,
    pub total_classified: u32,
}

impl BatchResult {
    /// Percentage of classified bodies that reached the ground. Defined as
    /// 0 for an empty batch.
    pub fn pass_rate(&self) -> f32 {
        if self.total_classified == 0 {
            0.0
        } else {
            self.successful_passes as f32 / self.total_classified as f32 * 100.0
        }
    }
}

/// Observer notified once per classified body. Must not touch the world or
/// the trial loop; it only watches the counters go by.
pub trait TrialObserver {
    fn on_outcome(&mut self, successful_passes: u32, total_classified: u32);
}

/// No-op observer
impl TrialObserver for () {
    fn on_outcome(&mut self, _: u32, _: u32) {}
}

/// A body in flight: dropped but not yet classified
#[derive(Debug, Clone, Copy)]
struct PendingDrop {
    body: BodyHandle,
    dropped_at: f32,
}

/// Run one timed batch and return its outcome counters.
///
/// Builds the polarizer, then loops: drop a body whenever the interval has
/// elapsed and the quota remains, step the world, classify every pending
/// body whose observation delay is up. Terminates when all bodies are
/// dropped and the Pending Set is empty, so every dropped body is classified
/// exactly once.
///
/// Drop pacing is quantized to the step grid: at least `drop_interval` of
/// simulated time passes between drops, possibly a fraction of a step more.
pub fn run_trial(
    world: &mut impl PhysicsWorld,
    polarizer: &PolarizerSpec,
    params: &TrialParams,
    rng: &mut Pcg32,
    observer: &mut impl TrialObserver,
) -> Result<BatchResult> {
    build_polarizer(world, polarizer)?;

    let dt = world.fixed_step_duration();
    let shape = Shape::Capsule {
        radius: params.pencil_radius,
        half_length: params.pencil_half_length,
    };

    let mut result = BatchResult::default();
    let mut pending: Vec<PendingDrop> = Vec::new();
    let mut dropped: u32 = 0;
    let mut last_drop: f32 = 0.0;
    let mut steps: u64 = 0;

    while dropped < params.num_bodies || !pending.is_empty() {
        let now = steps as f32 * dt;

        if dropped < params.num_bodies && now - last_drop >= params.drop_interval {
            let x = rng.random_range(-DROP_REGION_HALF..DROP_REGION_HALF);
            let y = rng.random_range(-DROP_REGION_HALF..DROP_REGION_HALF);
            let yaw = rng.random_range(0.0..std::f32::consts::PI);
            let body = world.create_dynamic_body(
                shape,
                params.pencil_mass,
                Vec3::new(x, y, params.drop_height),
                Quat::from_rotation_z(yaw),
            )?;
            world.set_no_self_collision(body)?;
            pending.push(PendingDrop {
                body,
                dropped_at: now,
            });
            dropped += 1;
            last_drop = now;
        }

        world.step()?;
        steps += 1;

        // Classify due bodies by rebuilding the retained set instead of
        // removing in place mid-iteration.
        let mut retained = Vec::with_capacity(pending.len());
        for drop in pending.drain(..) {
            if now - drop.dropped_at >= params.observation_delay {
                let pos = world.position(drop.body)?;
                result.total_classified += 1;
                if pos.z <= params.ground_threshold {
                    result.successful_passes += 1;
                }
                observer.on_outcome(result.successful_passes, result.total_classified);
                world.remove_body(drop.body)?;
            } else {
                retained.push(drop);
            }
        }
        pending = retained;
    }

    log::debug!(
        "batch done: {}/{} passed ({:.2}%) in {} steps",
        result.successful_passes,
        result.total_classified,
        result.pass_rate(),
        steps
    );
    Ok(result)
}
