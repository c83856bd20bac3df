//! # Scheduler
//!
//! Owns the whole detector state and drives one tick at a time:
//! sample a frame, hand it to the recorder while recording, and run the
//! matcher and debouncer while listening.
//!
//! Ticks never overlap: `tick` takes `&mut self`, so the recorder, store and
//! detection history are only ever touched from one thread of control.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::audio::AudioInput;
use crate::config::DetectorConfig;
use crate::contacts::EmailList;
use crate::debouncer::{Detection, DetectionDebouncer};
use crate::error::{DetectorError, Result};
use crate::matcher;
use crate::notify::Notifier;
use crate::persistence::AppData;
use crate::recorder::{Pattern, PatternRecorder};
use crate::sampler::SpectrumSampler;
use crate::store::PatternStore;
use crate::wake::{self, WakeLock};
use crate::{Spectrum, now_millis};

/// Cooperative cancellation flag, checked before every tick of [`Scheduler::run`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What one tick produced, for the UI to refresh from.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub level: f32,
    pub spectrum: Spectrum,
    pub detections: Vec<Detection>,
}

impl TickReport {
    /// Level as a 0-100 meter value.
    pub fn level_percent(&self) -> u8 {
        self.level.round().clamp(0.0, 100.0) as u8
    }
}

pub struct Scheduler {
    config: DetectorConfig,
    input: Box<dyn AudioInput>,
    sampler: SpectrumSampler,
    recorder: PatternRecorder,
    store: PatternStore,
    emails: EmailList,
    debouncer: DetectionDebouncer,
    notifiers: Vec<Box<dyn Notifier>>,
    listening: bool,
    wake_lock: Option<WakeLock>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("listening", &self.listening)
            .field("recording", &self.recorder.is_recording())
            .field("patterns", &self.store.len())
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

impl Scheduler {
    /// Builds the scheduler around an audio input and previously saved data.
    pub fn new(config: DetectorConfig, input: Box<dyn AudioInput>, data: AppData) -> Self {
        Self {
            recorder: PatternRecorder::new(config.tick_interval_ms),
            debouncer: DetectionDebouncer::new(config.cooldown_ms),
            store: PatternStore::from_patterns(data.sound_patterns),
            emails: EmailList::from_emails(data.email_list),
            sampler: SpectrumSampler::new(),
            notifiers: Vec::new(),
            listening: false,
            wake_lock: None,
            input,
            config,
        }
    }

    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Whether ticks currently do anything.
    pub fn is_active(&self) -> bool {
        self.listening || self.recorder.is_recording()
    }

    /// Frames captured in the running recording.
    pub fn recorded_frames(&self) -> usize {
        self.recorder.buffered()
    }

    pub fn patterns(&self) -> &[Pattern] {
        self.store.all()
    }

    pub fn emails(&self) -> &[String] {
        self.emails.all()
    }

    pub fn detections(&self) -> &[Detection] {
        self.debouncer.history()
    }

    /// The detections the UI lists, most recent first.
    pub fn recent_detections(&self) -> Vec<&Detection> {
        self.debouncer.recent(self.config.recent_detections)
    }

    fn ensure_stream(&mut self) -> Result<()> {
        if !self.sampler.is_attached() {
            let buffer = self.input.acquire()?;
            self.sampler.attach(buffer);
        }
        Ok(())
    }

    /// Acquires the stream if needed and starts matching on every tick.
    ///
    /// On a permission failure nothing changes.
    pub fn start_listening(&mut self) -> Result<()> {
        if self.recorder.is_recording() {
            return Err(DetectorError::Busy("recording"));
        }
        if self.listening {
            return Ok(());
        }
        self.ensure_stream()?;
        if self.config.wake_lock {
            self.wake_lock = wake::try_acquire();
        }
        self.listening = true;
        log::info!("Listening for {} pattern(s)", self.store.len());
        Ok(())
    }

    pub fn stop_listening(&mut self) {
        if self.listening {
            log::info!("Listening stopped");
        }
        self.listening = false;
        if let Some(lock) = self.wake_lock.take() {
            lock.release();
        }
    }

    /// Acquires the stream if needed and starts buffering frames.
    pub fn start_recording(&mut self) -> Result<()> {
        if self.recorder.is_recording() {
            return Err(DetectorError::AlreadyRecording);
        }
        self.ensure_stream()?;
        self.recorder.start()
    }

    /// Completes the recording under `name` and stores the pattern.
    ///
    /// The recorder is idle afterwards even when the recording is rejected.
    pub fn finish_recording(&mut self, name: &str, now: i64) -> Result<&Pattern> {
        if !self.recorder.is_recording() {
            return Err(DetectorError::NotRecording);
        }
        let pattern = self.recorder.finish(name, now)?;
        Ok(self.store.add(pattern))
    }

    pub fn cancel_recording(&mut self) {
        self.recorder.cancel();
    }

    pub fn remove_pattern(&mut self, id: i64) -> bool {
        self.store.remove(id)
    }

    pub fn add_email(&mut self, email: &str) -> Result<()> {
        self.emails.add(email)
    }

    pub fn remove_email(&mut self, email: &str) -> bool {
        self.emails.remove(email)
    }

    /// The persisted part of the state.
    pub fn snapshot(&self) -> AppData {
        AppData {
            email_list: self.emails.all().to_vec(),
            sound_patterns: self.store.all().to_vec(),
        }
    }

    /// Runs one sampling cycle at `now`.
    ///
    /// Returns `Ok(None)` without sampling when neither listening nor recording.
    pub fn tick(&mut self, now: i64) -> Result<Option<TickReport>> {
        if !self.is_active() {
            return Ok(None);
        }

        let frame = self.sampler.sample(now)?;
        let mut detections = Vec::new();

        if self.recorder.is_recording() {
            self.recorder.on_tick(frame.clone());
        }

        if self.listening && !self.store.is_empty() {
            for name in matcher::evaluate(&frame, self.store.all()) {
                if let Some(detection) = self.debouncer.try_accept(&name, now) {
                    log::info!("Detected {:?} at {}", detection.sound, detection.display_time);
                    for notifier in self.notifiers.iter_mut() {
                        notifier.notify(&detection, self.emails.all());
                    }
                    detections.push(detection);
                }
            }
        }

        Ok(Some(TickReport {
            level: frame.level,
            spectrum: frame.spectrum,
            detections,
        }))
    }

    /// Ticks at the configured interval until `token` is cancelled or the
    /// scheduler becomes inactive.
    pub fn run<F>(&mut self, token: &CancelToken, mut on_tick: F) -> Result<()>
    where
        F: FnMut(&TickReport),
    {
        let interval = self.config.tick_interval();
        while !token.is_cancelled() && self.is_active() {
            let started = Instant::now();
            if let Some(report) = self.tick(now_millis())? {
                on_tick(&report);
            }
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SignalBuffer;

    struct DeniedInput;

    impl AudioInput for DeniedInput {
        fn acquire(&mut self) -> Result<SignalBuffer> {
            Err(DetectorError::PermissionDenied("test".to_string()))
        }
    }

    struct SilentInput;

    impl AudioInput for SilentInput {
        fn acquire(&mut self) -> Result<SignalBuffer> {
            Ok(SignalBuffer::default())
        }
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            wake_lock: false,
            notifications: false,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn denied_permission_leaves_state_unchanged() {
        let mut scheduler = Scheduler::new(config(), Box::new(DeniedInput), AppData::default());
        assert!(matches!(
            scheduler.start_listening(),
            Err(DetectorError::PermissionDenied(_))
        ));
        assert!(!scheduler.is_listening());
        assert!(scheduler.start_recording().is_err());
        assert!(!scheduler.is_recording());
    }

    #[test]
    fn inactive_tick_does_nothing() {
        let mut scheduler = Scheduler::new(config(), Box::new(SilentInput), AppData::default());
        assert!(scheduler.tick(0).unwrap().is_none());
    }

    #[test]
    fn listen_rejected_while_recording() {
        let mut scheduler = Scheduler::new(config(), Box::new(SilentInput), AppData::default());
        scheduler.start_recording().unwrap();
        assert!(matches!(scheduler.start_listening(), Err(DetectorError::Busy(_))));
    }

    #[test]
    fn recording_collects_ticks() {
        let mut scheduler = Scheduler::new(config(), Box::new(SilentInput), AppData::default());
        scheduler.start_recording().unwrap();
        for t in 0..3 {
            assert!(scheduler.tick(t).unwrap().is_some());
        }
        assert_eq!(scheduler.recorded_frames(), 3);
        let pattern = scheduler.finish_recording("Silence", 42).unwrap();
        assert_eq!(pattern.id, 42);
        assert_eq!(pattern.duration, 3 * 16);
        assert_eq!(scheduler.patterns().len(), 1);
        assert!(!scheduler.is_active());
    }

    #[test]
    fn finish_without_recording_fails() {
        let mut scheduler = Scheduler::new(config(), Box::new(SilentInput), AppData::default());
        assert!(matches!(
            scheduler.finish_recording("x", 0),
            Err(DetectorError::NotRecording)
        ));
    }

    #[test]
    fn cancelled_token_stops_run() {
        let mut scheduler = Scheduler::new(config(), Box::new(SilentInput), AppData::default());
        scheduler.start_listening().unwrap();
        let token = CancelToken::new();
        let mut ticks = 0;
        scheduler
            .run(&token, |_| {
                ticks += 1;
                if ticks == 3 {
                    token.cancel();
                }
            })
            .unwrap();
        assert_eq!(ticks, 3);
    }

    #[test]
    fn level_percent_is_capped() {
        let report = TickReport {
            level: 180.4,
            ..TickReport::default()
        };
        assert_eq!(report.level_percent(), 100);
    }
}
