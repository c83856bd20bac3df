//! # Detector Configuration
//!
//! Tunables for the detection pipeline. The matching thresholds themselves
//! are fixed constants in [`crate::matcher`]; this struct only covers the
//! cadence, the cooldown and which side effects are enabled.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings for the scheduler and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Interval between two scheduler ticks in milliseconds (16 ms ~ 60 Hz).
    /// Also the per-frame duration used for pattern durations.
    pub tick_interval_ms: u64,
    /// Minimum time between two accepted detections, across all patterns.
    pub cooldown_ms: i64,
    /// How many detections the UI shows.
    pub recent_detections: usize,
    /// Send a desktop notification for every accepted detection.
    pub notifications: bool,
    /// Keep the screen awake while listening.
    pub wake_lock: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            cooldown_ms: 5000,
            recent_detections: 10,
            notifications: true,
            wake_lock: true,
        }
    }
}

impl DetectorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
