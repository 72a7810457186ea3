//! Running pass-rate display
//!
//! Watches classification outcomes go by and keeps a per-body running
//! success-rate series. Purely observational: the monitor holds no world or
//! engine state and cannot influence the trial loop it observes.

use glam::Vec3;

use super::trial::TrialObserver;

/// Where the monitor draws to
pub trait DisplaySink {
    /// Redraw the full series of running percentages
    fn render_series(&mut self, values: &[f32]);
    /// Place a text label at a world position
    fn overlay_text(&mut self, text: &str, position: Vec3);
}

/// Sink that writes to the log instead of a screen
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn render_series(&mut self, values: &[f32]) {
        if let Some(latest) = values.last() {
            log::debug!("pass-rate series: {} samples, latest {latest:.2}%", values.len());
        }
    }

    fn overlay_text(&mut self, text: &str, _position: Vec3) {
        log::info!("{text}");
    }
}

/// Accumulates outcomes into a running success-rate series and mirrors it to
/// a display sink after every classified body.
#[derive(Debug)]
pub struct PassRateMonitor<S: DisplaySink> {
    sink: S,
    series: Vec<f32>,
    overlay_pos: Vec3,
}

impl<S: DisplaySink> PassRateMonitor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            series: Vec::new(),
            // Off to the side of the drop region, same spot every frame
            overlay_pos: Vec3::new(2.0, 2.0, 3.0),
        }
    }

    /// Running rate after each classification, oldest first
    pub fn series(&self) -> &[f32] {
        &self.series
    }

    pub fn latest(&self) -> Option<f32> {
        self.series.last().copied()
    }
}

impl<S: DisplaySink> TrialObserver for PassRateMonitor<S> {
    fn on_outcome(&mut self, successful_passes: u32, total_classified: u32) {
        let rate = if total_classified == 0 {
            0.0
        } else {
            successful_passes as f32 / total_classified as f32 * 100.0
        };
        self.series.push(rate);
        self.sink.render_series(&self.series);
        self.sink
            .overlay_text(&format!("Pass Rate: {rate:.2}%"), self.overlay_pos);
    }
}
