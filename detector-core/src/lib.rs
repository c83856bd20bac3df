// detector-core/src/lib.rs

//! The core logic for the sound detector.
//! This crate is responsible for audio capture, spectral sampling,
//! pattern recording and matching, and detection debouncing. It is
//! completely headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod contacts;
pub mod debouncer;
pub mod error;
pub mod fft;
pub mod matcher;
pub mod notify;
pub mod persistence;
pub mod recorder;
pub mod sampler;
pub mod scheduler;
pub mod store;
pub mod wake;

pub use config::DetectorConfig;
pub use error::{DetectorError, Result};

use serde::{Deserialize, Serialize};

/// One byte-scaled magnitude per frequency bin.
pub type Spectrum = Vec<u8>;

/// Represents one sampled spectrum, produced once per scheduler tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Magnitude per frequency bin, each in [0, 255].
    #[serde(rename = "frequencies")]
    pub spectrum: Spectrum,
    /// Arithmetic mean of `spectrum`.
    pub level: f32,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Frame {
    /// Builds a frame and derives its level from the spectrum.
    pub fn new(spectrum: Spectrum, timestamp: i64) -> Self {
        let level = spectrum_level(&spectrum);
        Self {
            spectrum,
            level,
            timestamp,
        }
    }
}

/// Arithmetic mean of all samples, 0.0 for an empty spectrum.
pub fn spectrum_level(spectrum: &[u8]) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let sum: u64 = spectrum.iter().map(|&s| s as u64).sum();
    sum as f32 / spectrum.len() as f32
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

/// Formats an epoch-millisecond instant as a local `HH:MM:SS` string.
pub fn display_time(timestamp_ms: i64) -> String {
    match jiff::Timestamp::from_millisecond(timestamp_ms) {
        Ok(ts) => ts
            .to_zoned(jiff::tz::TimeZone::system())
            .strftime("%H:%M:%S")
            .to_string(),
        Err(_) => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_mean_of_bins() {
        let frame = Frame::new(vec![0, 10, 20, 30], 0);
        assert_eq!(frame.level, 15.0);
    }

    #[test]
    fn empty_spectrum_has_zero_level() {
        assert_eq!(spectrum_level(&[]), 0.0);
    }

    #[test]
    fn display_time_has_clock_shape() {
        let formatted = display_time(1_700_000_000_000);
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
    }
}
