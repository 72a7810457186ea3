//! Static barrier construction
//!
//! A polarizer is a row of parallel static bars, evenly spaced along x
//! around a centered offset, all at the same height.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::{BodyHandle, PhysicsWorld, Result, Shape};

/// Geometry of the bar grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolarizerSpec {
    /// Center-to-center distance between adjacent bars
    pub spacing: f32,
    pub bar_count: u32,
    /// Rotation of each bar about the vertical axis (pi/2 = bars along y)
    pub bar_yaw: f32,
    /// Height of the bar plane above the ground
    pub height: f32,
    pub bar_radius: f32,
    pub bar_half_length: f32,
}

impl Default for PolarizerSpec {
    fn default() -> Self {
        Self {
            spacing: 0.2,
            bar_count: 20,
            bar_yaw: std::f32::consts::FRAC_PI_2,
            height: 5.0,
            bar_radius: 0.05,
            bar_half_length: 2.0,
        }
    }
}

/// Reset the world and place the bar grid.
///
/// Bar `i` sits at `x = -(bar_count * spacing) / 2 + i * spacing`. Failure
/// is not expected here (pure geometry placement); any collaborator error is
/// fatal to the run and propagates unchanged.
pub fn build_polarizer(
    world: &mut impl PhysicsWorld,
    spec: &PolarizerSpec,
) -> Result<Vec<BodyHandle>> {
    world.reset();
    let offset = -(spec.bar_count as f32 * spec.spacing) / 2.0;
    let shape = Shape::Cylinder {
        radius: spec.bar_radius,
        half_length: spec.bar_half_length,
    };
    let orientation = Quat::from_rotation_z(spec.bar_yaw);

    let mut bars = Vec::with_capacity(spec.bar_count as usize);
    for i in 0..spec.bar_count {
        let x = offset + i as f32 * spec.spacing;
        let bar = world.create_static_body(shape, Vec3::new(x, 0.0, spec.height), orientation)?;
        bars.push(bar);
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RigidWorld;

    #[test]
    fn bars_are_centered_and_evenly_spaced() {
        let mut world = RigidWorld::new(-9.8);
        let spec = PolarizerSpec {
            spacing: 0.5,
            bar_count: 4,
            ..Default::default()
        };
        let bars = build_polarizer(&mut world, &spec).unwrap();
        assert_eq!(bars.len(), 4);

        // offset = -(4 * 0.5) / 2 = -1.0
        for (i, bar) in bars.iter().enumerate() {
            let pos = world.position(*bar).unwrap();
            let expected_x = -1.0 + i as f32 * 0.5;
            assert!((pos.x - expected_x).abs() < 1e-6);
            assert_eq!(pos.y, 0.0);
            assert_eq!(pos.z, spec.height);
        }
    }

    #[test]
    fn rebuild_replaces_previous_bars() {
        let mut world = RigidWorld::new(-9.8);
        let spec = PolarizerSpec::default();
        let first = build_polarizer(&mut world, &spec).unwrap();
        let second = build_polarizer(&mut world, &spec).unwrap();

        // Old handles are dead, new grid stands alone
        assert!(world.position(first[0]).is_err());
        assert_eq!(second.len(), spec.bar_count as usize);
        assert!(world.position(second[0]).is_ok());
    }
}
