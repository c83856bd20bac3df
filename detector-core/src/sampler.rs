//! Spectrum sampling: one [`Frame`] per tick from the attached signal buffer.

use crate::audio::SignalBuffer;
use crate::error::{DetectorError, Result};
use crate::fft::{BIN_COUNT, SpectrumAnalyzer};
use crate::Frame;

/// Converts the live signal into fixed-size byte spectra.
#[derive(Debug, Default)]
pub struct SpectrumSampler {
    source: Option<SignalBuffer>,
    analyzer: SpectrumAnalyzer,
}

impl SpectrumSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an acquired stream's buffer and clears smoothing history.
    pub fn attach(&mut self, source: SignalBuffer) {
        self.analyzer.reset();
        self.source = Some(source);
    }

    pub fn detach(&mut self) {
        self.source = None;
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Length of every spectrum this sampler produces.
    pub fn bin_count(&self) -> usize {
        BIN_COUNT
    }

    /// Samples the current signal buffer.
    ///
    /// Fails with [`DetectorError::StreamUnavailable`] when no stream is attached.
    pub fn sample(&mut self, timestamp: i64) -> Result<Frame> {
        let source = self.source.as_ref().ok_or(DetectorError::StreamUnavailable)?;
        let signal = source.snapshot();
        let spectrum = self.analyzer.analyze(&signal);
        Ok(Frame::new(spectrum, timestamp))
    }
}
