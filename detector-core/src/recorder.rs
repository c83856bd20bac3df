//! # Pattern Recorder
//!
//! Accumulates sampled frames into a named fingerprint while a recording
//! session is active.

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};
use crate::Frame;

/// A named, recorded sequence of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Creation time in milliseconds, unique within a store.
    pub id: i64,
    pub name: String,
    #[serde(alias = "data")]
    pub frames: Vec<Frame>,
    /// `frames.len() * tick_interval_ms`.
    pub duration: u64,
}

impl Pattern {
    /// Duration in seconds, as shown in pattern lists.
    pub fn duration_secs(&self) -> f64 {
        self.duration as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// `Idle -> Recording -> Idle` state machine around a frame buffer.
#[derive(Debug)]
pub struct PatternRecorder {
    state: RecorderState,
    buffer: Vec<Frame>,
    tick_interval_ms: u64,
}

impl PatternRecorder {
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            state: RecorderState::Idle,
            buffer: Vec::new(),
            tick_interval_ms,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Number of frames captured so far in the current session.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_recording() {
            return Err(DetectorError::AlreadyRecording);
        }
        self.buffer.clear();
        self.state = RecorderState::Recording;
        log::info!("Recording started");
        Ok(())
    }

    /// Appends a frame; ignored while idle.
    pub fn on_tick(&mut self, frame: Frame) {
        if self.is_recording() {
            self.buffer.push(frame);
        }
    }

    /// Ends the session and builds the pattern.
    ///
    /// The recorder is idle afterwards whether or not this succeeds, and a
    /// rejected buffer is discarded.
    pub fn finish(&mut self, name: &str, now: i64) -> Result<Pattern> {
        self.state = RecorderState::Idle;
        let frames = std::mem::take(&mut self.buffer);

        if frames.is_empty() {
            return Err(DetectorError::EmptyRecording);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(DetectorError::InvalidName);
        }

        let duration = frames.len() as u64 * self.tick_interval_ms;
        log::info!("Recorded pattern {name:?}: {} frames, {duration} ms", frames.len());
        Ok(Pattern {
            id: now,
            name: name.to_string(),
            frames,
            duration,
        })
    }

    pub fn cancel(&mut self) {
        if self.is_recording() {
            log::info!("Recording cancelled, {} frames discarded", self.buffer.len());
        }
        self.buffer.clear();
        self.state = RecorderState::Idle;
    }
}
