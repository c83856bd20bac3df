//! Detection debouncing and history.

use serde::{Deserialize, Serialize};

use crate::display_time;

/// An accepted detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Name of the matched pattern.
    pub sound: String,
    /// Acceptance time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Local `HH:MM:SS` rendering of `timestamp`.
    pub display_time: String,
}

/// Suppresses detections that follow the previous one too closely.
///
/// The cooldown is global: a detection of any pattern blocks every other
/// pattern until it has elapsed.
#[derive(Debug, Clone)]
pub struct DetectionDebouncer {
    cooldown_ms: i64,
    history: Vec<Detection>,
}

impl DetectionDebouncer {
    pub fn new(cooldown_ms: i64) -> Self {
        Self {
            cooldown_ms,
            history: Vec::new(),
        }
    }

    /// Records a detection of `sound` at `now` unless still cooling down.
    ///
    /// Rejects when `now - last < cooldown` (so exactly one cooldown later is
    /// still rejected) and when `now` lies before the last detection.
    pub fn try_accept(&mut self, sound: &str, now: i64) -> Option<Detection> {
        if let Some(last) = self.history.last() {
            if now - last.timestamp < self.cooldown_ms {
                log::debug!("Detection of {sound:?} suppressed by cooldown");
                return None;
            }
        }

        let detection = Detection {
            sound: sound.to_string(),
            timestamp: now,
            display_time: display_time(now),
        };
        self.history.push(detection.clone());
        Some(detection)
    }

    pub fn last(&self) -> Option<&Detection> {
        self.history.last()
    }

    pub fn history(&self) -> &[Detection] {
        &self.history
    }

    /// Up to `n` detections, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&Detection> {
        self.history.iter().rev().take(n).collect()
    }
}
