//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns a block of time-domain samples into the byte-scaled
//! magnitude spectrum the matcher works on.
//!
//! ## Pipeline
//! 1. DC offset removal
//! 2. Hann windowing
//! 3. Forward FFT (RustFFT)
//! 4. Magnitude per bin, normalised by the transform size
//! 5. Temporal smoothing against the previous block
//! 6. Decibel conversion mapped onto [0, 255]

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Fixed transform size. Spectra have `FFT_SIZE / 2` bins.
pub const FFT_SIZE: usize = 2048;

/// Number of frequency bins in every spectrum.
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Weight of the previous block when smoothing magnitudes over time.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// Decibel value mapped to byte 0.
pub const MIN_DECIBELS: f32 = -100.0;

/// Decibel value mapped to byte 255.
pub const MAX_DECIBELS: f32 = -30.0;

/// Removes the DC offset from a signal by making its average value zero.
fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 {
        return;
    }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Applies a Hann window to the input buffer to reduce spectral leakage.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Converts one linear magnitude to a byte on the analyser decibel scale.
pub fn magnitude_to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

/// Stateful spectrum analyser producing fixed-length byte spectra.
///
/// Keeps the FFT plan and the previous smoothed magnitudes between calls,
/// so consecutive blocks fade into each other instead of flickering.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    smoothed: Vec<f32>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("bins", &self.smoothed.len())
            .finish()
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(FFT_SIZE),
            smoothed: vec![0.0; BIN_COUNT],
        }
    }

    /// Analyses one block of exactly `FFT_SIZE` samples.
    ///
    /// Shorter input is zero-padded at the front, longer input keeps only
    /// the most recent `FFT_SIZE` samples. The result always has
    /// `BIN_COUNT` entries.
    pub fn analyze(&mut self, signal: &[f32]) -> Vec<u8> {
        let mut processed = vec![0.0f32; FFT_SIZE];
        let take = signal.len().min(FFT_SIZE);
        processed[FFT_SIZE - take..].copy_from_slice(&signal[signal.len() - take..]);

        remove_dc_offset(&mut processed);
        apply_hann_window(&mut processed);

        let mut buffer: Vec<Complex<f32>> = processed
            .into_iter()
            .map(|sample| Complex { re: sample, im: 0.0 })
            .collect();
        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(BIN_COUNT)
            .zip(self.smoothed.iter_mut())
            .map(|(c, prev)| {
                let magnitude = c.norm() / FFT_SIZE as f32;
                *prev = SMOOTHING_TIME_CONSTANT * *prev
                    + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
                magnitude_to_byte(*prev)
            })
            .collect()
    }

    /// Forgets the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}
