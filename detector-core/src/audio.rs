//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform Audio Library).
//! The capture callback writes into a [`SignalBuffer`] that always holds the most
//! recent `FFT_SIZE` samples; the spectrum sampler reads snapshots of it.
//!
//! ## Features
//! - Automatic audio device selection
//! - Sample rate closest to 44.1 kHz, any channel count down-mixed to mono
//! - Dedicated audio thread owning the stream, shut down over a channel

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::error::DetectorError;
use crate::fft::FFT_SIZE;

/// Preferred capture rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Shared ring of the most recent mono samples.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    inner: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl Default for SignalBuffer {
    fn default() -> Self {
        Self::new(FFT_SIZE)
    }
}

impl SignalBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Locks the ring, recovering the samples if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, VecDeque<f32>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Signal buffer lock poisoned, recovering");
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }

    /// Appends samples, dropping the oldest ones beyond capacity.
    pub fn push(&self, samples: &[f32]) {
        let mut buffer = self.lock();
        let skip = samples.len().saturating_sub(self.capacity);
        for &sample in &samples[skip..] {
            if buffer.len() == self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(sample);
        }
    }

    /// Copies out the buffered samples, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.lock().iter().copied().collect()
    }
}

/// Source of a live audio signal.
///
/// `acquire` is the one operation that may wait on the outside world
/// (device availability, OS permission).
pub trait AudioInput {
    fn acquire(&mut self) -> crate::Result<SignalBuffer>;

    /// Stops capturing. Dropping the input has the same effect.
    fn release(&mut self) {}
}

/// Audio worker thread management structure.
///
/// Handles the dedicated audio thread and provides a way to shut it down.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

/// Microphone input backed by the default CPAL input device.
#[derive(Debug, Default)]
pub struct CpalInput {
    worker: Option<AudioWorker>,
    buffer: Option<SignalBuffer>,
}

impl CpalInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioInput for CpalInput {
    /// Spawns the audio thread and waits until the stream is playing.
    ///
    /// The stream itself never leaves the audio thread; the thread reports
    /// success or failure back before entering its wait loop.
    fn acquire(&mut self) -> crate::Result<SignalBuffer> {
        if let Some(buffer) = &self.buffer {
            return Ok(buffer.clone());
        }

        let buffer = SignalBuffer::default();
        let thread_buffer = buffer.clone();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<std::result::Result<u32, String>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

        let thread_handle = thread::spawn(move || {
            log::debug!("Audio thread starting");
            let stream = match start_audio_capture(thread_buffer) {
                Ok((stream, sample_rate)) => {
                    let _ = ready_tx.send(Ok(sample_rate));
                    stream
                }
                Err(e) => {
                    log::error!("Error starting audio: {e:#}");
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            wait_for_shutdown(&shutdown_rx);
            log::debug!("Stopping stream and exiting audio thread");
            if let Err(e) = stream.pause() {
                log::warn!("Error pausing stream: {e}");
            }
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => {
                log::info!("Audio capture running at {sample_rate} Hz");
                self.worker = Some(AudioWorker {
                    shutdown_tx,
                    thread_handle: Some(thread_handle),
                });
                self.buffer = Some(buffer.clone());
                Ok(buffer)
            }
            Ok(Err(reason)) => {
                let _ = thread_handle.join();
                Err(DetectorError::PermissionDenied(reason))
            }
            Err(_) => Err(DetectorError::PermissionDenied(
                "audio thread exited before reporting".to_string(),
            )),
        }
    }

    fn release(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            log::info!("Shutting down audio worker");
            let _ = worker.shutdown_tx.send(());
            if let Some(handle) = worker.thread_handle.take() {
                if handle.join().is_err() {
                    log::warn!("Audio thread panicked during shutdown");
                }
            }
        }
        self.buffer = None;
    }
}

impl Drop for CpalInput {
    fn drop(&mut self) {
        self.release();
    }
}

fn wait_for_shutdown(shutdown_rx: &Receiver<()>) {
    // Either an explicit signal or the sender being dropped ends the wait.
    let _ = shutdown_rx.recv();
}

/// Starts audio capture from the default input device.
///
/// Every callback down-mixes the interleaved data to mono and appends it
/// to `buffer`.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
/// * `Err(e)` - Error if no device exists or the stream cannot be started
pub fn start_audio_capture(buffer: SignalBuffer) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate_val = config.sample_rate().0;
    let channels = config.channels().max(1) as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!("Selected sample rate: {sample_rate_val} Hz, {channels} channel(s)");

    let err_fn = |err| log::error!("An error occurred on the audio stream: {err}");
    let mut mono = Vec::with_capacity(FFT_SIZE);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            mono.clear();
            mono.extend(
                data.chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
            );
            buffer.push(&mono);
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate_val))
}

/// Finds the f32 configuration whose rate range lies closest to `target_rate`.
///
/// Mono configurations win ties so no down-mixing is needed.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if (min..=max).contains(&target_rate) {
                0
            } else {
                min.abs_diff(target_rate).min(max.abs_diff(target_rate))
            };
            (distance, c.channels())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_most_recent_samples() {
        let buffer = SignalBuffer::new(4);
        buffer.push(&[1.0, 2.0, 3.0]);
        buffer.push(&[4.0, 5.0]);
        assert_eq!(buffer.snapshot(), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn oversized_push_keeps_tail() {
        let buffer = SignalBuffer::new(3);
        buffer.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buffer.snapshot(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn poisoned_buffer_keeps_samples() {
        let buffer = SignalBuffer::new(4);
        buffer.push(&[1.0]);
        let writer = buffer.clone();
        let _ = thread::spawn(move || {
            let _guard = writer.inner.lock().unwrap();
            panic!("capture callback died");
        })
        .join();
        assert!(buffer.inner.is_poisoned());

        buffer.push(&[2.0]);
        assert_eq!(buffer.snapshot(), vec![1.0, 2.0]);
        assert!(!buffer.inner.is_poisoned());
    }

    #[test]
    fn clones_share_storage() {
        let buffer = SignalBuffer::new(8);
        let writer = buffer.clone();
        writer.push(&[0.5]);
        assert_eq!(buffer.snapshot(), vec![0.5]);
    }
}
