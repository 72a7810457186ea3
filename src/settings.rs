//! Run configuration
//!
//! Every process parameter of the experiment in one serde struct, loadable
//! from a JSON file. Missing fields fall back to the reference defaults, so
//! a config file only has to name what it changes.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::GROUND_THRESHOLD;
use crate::sim::{PolarizerSpec, SearchParams, TrialParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Drop experiment ===
    pub num_pencils: u32,
    /// Simulated seconds between drops (live-monitor variant)
    pub drop_interval: f32,
    /// Simulated seconds after a drop before classification
    pub observation_delay: f32,
    pub drop_height: f32,
    pub pencil_radius: f32,
    pub pencil_length: f32,
    /// z acceleration, negative is down
    pub gravity: f32,

    // === Polarizer geometry ===
    pub bar_count: u32,
    pub bar_spacing: f32,
    pub bar_radius: f32,
    pub bar_length: f32,
    /// Bar rotation about the vertical axis (pi/2 = bars along y)
    pub bar_yaw: f32,
    pub polarizer_height: f32,

    // === Calibration ===
    /// Target pass rate in percent
    pub target_pass_rate: f32,
    /// Convergence tolerance in percentage points
    pub tolerance: f32,
    /// Pencils per calibration batch
    pub batch_size: u32,
    pub initial_spacing: f32,
    /// Drop pacing during calibration batches
    pub calibration_drop_interval: f32,

    // === Reproducibility ===
    /// RNG seed; None seeds from the clock at startup
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_pencils: 100,
            drop_interval: 0.1,
            observation_delay: 3.0,
            drop_height: 10.0,
            pencil_radius: 0.02,
            pencil_length: 0.4,
            gravity: -9.8,

            bar_count: 20,
            bar_spacing: 0.2,
            bar_radius: 0.05,
            bar_length: 4.0,
            bar_yaw: std::f32::consts::FRAC_PI_2,
            polarizer_height: 5.0,

            target_pass_rate: 50.0,
            tolerance: 1.0,
            batch_size: 50,
            initial_spacing: 0.3,
            calibration_drop_interval: 3.0,

            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Polarizer geometry at the configured spacing
    pub fn polarizer(&self) -> PolarizerSpec {
        PolarizerSpec {
            spacing: self.bar_spacing,
            bar_count: self.bar_count,
            bar_yaw: self.bar_yaw,
            height: self.polarizer_height,
            bar_radius: self.bar_radius,
            bar_half_length: self.bar_length / 2.0,
        }
    }

    fn trial_with(&self, num_bodies: u32, drop_interval: f32) -> TrialParams {
        TrialParams {
            num_bodies,
            drop_interval,
            observation_delay: self.observation_delay,
            drop_height: self.drop_height,
            pencil_radius: self.pencil_radius,
            pencil_half_length: self.pencil_length / 2.0,
            pencil_mass: 1.0,
            ground_threshold: GROUND_THRESHOLD,
        }
    }

    /// Trial parameters for the live-monitor variant
    pub fn trial(&self) -> TrialParams {
        self.trial_with(self.num_pencils, self.drop_interval)
    }

    /// Trial parameters for one calibration batch
    pub fn calibration_trial(&self) -> TrialParams {
        self.trial_with(self.batch_size, self.calibration_drop_interval)
    }

    /// Search knobs for the calibration variant
    pub fn search(&self) -> SearchParams {
        SearchParams {
            target_rate: self.target_pass_rate,
            tolerance: self.tolerance,
            initial_spacing: self.initial_spacing,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_pencils, settings.num_pencils);
        assert_eq!(back.bar_spacing, settings.bar_spacing);
        assert_eq!(back.seed, settings.seed);
    }

    #[test]
    fn partial_config_keeps_defaults_elsewhere() {
        let settings: Settings =
            serde_json::from_str(r#"{"batch_size": 10, "seed": 7}"#).unwrap();
        assert_eq!(settings.batch_size, 10);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.num_pencils, Settings::default().num_pencils);
    }

    #[test]
    fn derived_params_halve_lengths() {
        let settings = Settings::default();
        assert_eq!(settings.polarizer().bar_half_length, 2.0);
        assert_eq!(settings.trial().pencil_half_length, 0.2);
        assert_eq!(settings.calibration_trial().num_bodies, 50);
        assert_eq!(settings.calibration_trial().drop_interval, 3.0);
    }
}
