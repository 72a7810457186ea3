//! Pencil Polarizer - a stochastic filtering experiment
//!
//! Rigid "pencils" are dropped, one at a time on a timer, through a grid of
//! parallel bars and the fraction that reach the ground is measured. Core
//! modules:
//! - `physics`: opaque world collaborator (trait) plus the built-in backend
//! - `sim`: deterministic experiment driver (trial engine, spacing search, live monitor)
//! - `settings`: data-driven run configuration

pub mod physics;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Experiment constants
pub mod consts {
    /// Fixed physics step (240 Hz, the grid the reference engine steps on)
    pub const FIXED_STEP: f32 = 1.0 / 240.0;
    /// A classified body at or below this height counts as passed
    pub const GROUND_THRESHOLD: f32 = 0.1;
    /// Half-extent of the square drop region in x and y
    pub const DROP_REGION_HALF: f32 = 1.0;
}
