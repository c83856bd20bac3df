use std::cell::RefCell;
use std::rc::Rc;

use detector_core::audio::{AudioInput, SignalBuffer};
use detector_core::debouncer::Detection;
use detector_core::fft::FFT_SIZE;
use detector_core::notify::Notifier;
use detector_core::persistence::{self, AppData};
use detector_core::recorder::Pattern;
use detector_core::scheduler::Scheduler;
use detector_core::{DetectorConfig, Frame};

/// Input handing out a buffer the test keeps writing to.
struct FeedInput(SignalBuffer);

impl AudioInput for FeedInput {
    fn acquire(&mut self) -> detector_core::Result<SignalBuffer> {
        Ok(self.0.clone())
    }
}

#[derive(Clone, Default)]
struct Collect(Rc<RefCell<Vec<(String, Vec<String>)>>>);

impl Notifier for Collect {
    fn notify(&mut self, detection: &Detection, recipients: &[String]) {
        self.0
            .borrow_mut()
            .push((detection.sound.clone(), recipients.to_vec()));
    }
}

/// Deterministic broadband noise so every bin carries energy.
fn noise(seed: u32, len: usize) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
        })
        .collect()
}

fn config() -> DetectorConfig {
    DetectorConfig {
        wake_lock: false,
        notifications: false,
        ..DetectorConfig::default()
    }
}

fn scheduler_with(buffer: &SignalBuffer, data: AppData) -> (Scheduler, Collect) {
    let mut scheduler = Scheduler::new(config(), Box::new(FeedInput(buffer.clone())), data);
    let collect = Collect::default();
    scheduler.add_notifier(Box::new(collect.clone()));
    (scheduler, collect)
}

/// Ticks until the smoothed spectrum has settled on a steady input.
fn settle(scheduler: &mut Scheduler, start: i64) {
    for t in 0..60 {
        scheduler.tick(start + t).unwrap();
    }
}

#[test]
fn recorded_sound_is_detected_and_notified_once() {
    let buffer = SignalBuffer::default();
    buffer.push(&noise(7, FFT_SIZE));
    let (mut scheduler, collect) = scheduler_with(&buffer, AppData::default());
    scheduler.add_email("ops@example.org").unwrap();

    scheduler.start_recording().unwrap();
    settle(&mut scheduler, 0);
    scheduler.cancel_recording();

    scheduler.start_recording().unwrap();
    for t in 0..10 {
        scheduler.tick(100 + t).unwrap();
    }
    scheduler.finish_recording("Kettle", 1_000).unwrap();

    scheduler.start_listening().unwrap();
    let report = scheduler.tick(10_000).unwrap().unwrap();
    assert!(report.level > 20.0, "level {}", report.level);
    assert_eq!(report.detections.len(), 1);
    assert_eq!(report.detections[0].sound, "Kettle");

    // within the cooldown nothing new is dispatched
    for t in [10_016, 12_000, 15_000] {
        let report = scheduler.tick(t).unwrap().unwrap();
        assert!(report.detections.is_empty());
    }
    let calls = collect.0.borrow().clone();
    assert_eq!(calls, vec![("Kettle".to_string(), vec!["ops@example.org".to_string()])]);

    assert!(!scheduler.tick(15_001).unwrap().unwrap().detections.is_empty());
    assert_eq!(scheduler.detections().len(), 2);
    assert_eq!(scheduler.recent_detections()[0].timestamp, 15_001);
}

#[test]
fn silence_does_not_trigger_a_loud_pattern() {
    let buffer = SignalBuffer::default();
    buffer.push(&noise(3, FFT_SIZE));
    let (mut scheduler, collect) = scheduler_with(&buffer, AppData::default());

    scheduler.start_recording().unwrap();
    settle(&mut scheduler, 0);
    scheduler.finish_recording("Alarm", 1).unwrap();

    // let the smoothed spectrum decay before listening
    buffer.push(&vec![0.0; FFT_SIZE]);
    scheduler.start_recording().unwrap();
    settle(&mut scheduler, 10_000);
    scheduler.cancel_recording();

    scheduler.start_listening().unwrap();
    for t in 0..60 {
        let report = scheduler.tick(20_000 + t * 100).unwrap().unwrap();
        assert!(report.detections.is_empty());
    }
    assert!(collect.0.borrow().is_empty());
}

#[test]
fn stopping_listening_stops_matching() {
    let buffer = SignalBuffer::default();
    buffer.push(&noise(11, FFT_SIZE));
    let (mut scheduler, _collect) = scheduler_with(&buffer, AppData::default());

    scheduler.start_recording().unwrap();
    settle(&mut scheduler, 0);
    scheduler.finish_recording("Bell", 1).unwrap();

    scheduler.start_listening().unwrap();
    scheduler.stop_listening();
    assert!(scheduler.tick(50_000).unwrap().is_none());
    assert!(scheduler.detections().is_empty());
}

fn pattern(id: i64, name: &str, frames: usize) -> Pattern {
    Pattern {
        id,
        name: name.to_string(),
        frames: (0..frames)
            .map(|i| Frame::new(vec![(i % 256) as u8; 16], id + i as i64))
            .collect(),
        duration: frames as u64 * 16,
    }
}

#[test]
fn saved_data_round_trips_in_order() {
    let data = AppData {
        email_list: vec![
            "c@example.org".to_string(),
            "a@example.org".to_string(),
            "b@example.org".to_string(),
        ],
        sound_patterns: vec![pattern(2_000, "Doorbell", 12), pattern(1_000, "Whistle", 3)],
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("sound_detector_data.json");
    persistence::save(&path, &data).unwrap();
    let loaded = persistence::load(&path).unwrap();
    assert_eq!(loaded, data);

    let buffer = SignalBuffer::default();
    let (scheduler, _) = scheduler_with(&buffer, loaded);
    assert_eq!(scheduler.snapshot(), data);
}

#[test]
fn removing_patterns_and_emails_updates_snapshot() {
    let data = AppData {
        email_list: vec!["a@example.org".to_string()],
        sound_patterns: vec![pattern(1, "One", 10), pattern(2, "Two", 10)],
    };
    let buffer = SignalBuffer::default();
    let (mut scheduler, _) = scheduler_with(&buffer, data);

    assert!(scheduler.remove_pattern(1));
    assert!(!scheduler.remove_pattern(1));
    assert!(scheduler.remove_email("a@example.org"));

    let snapshot = scheduler.snapshot();
    assert!(snapshot.email_list.is_empty());
    assert_eq!(snapshot.sound_patterns.len(), 1);
    assert_eq!(snapshot.sound_patterns[0].name, "Two");
}
