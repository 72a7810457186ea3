//! Deterministic experiment driver
//!
//! All experiment logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, taken from the physics collaborator
//! - Seeded RNG only, injected by the caller
//! - Stable iteration order (Pending Set in insertion order)
//! - No rendering or platform dependencies

pub mod calibrate;
pub mod monitor;
pub mod polarizer;
pub mod trial;

pub use calibrate::{find_spacing, SearchOutcome, SearchParams};
pub use monitor::{ConsoleDisplay, DisplaySink, PassRateMonitor};
pub use polarizer::{build_polarizer, PolarizerSpec};
pub use trial::{run_trial, BatchResult, TrialObserver, TrialParams};
