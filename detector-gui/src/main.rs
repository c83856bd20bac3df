//! # Sound Detector - GUI
//!
//! Main GUI application: listens to the microphone, records sound patterns
//! and reports detections.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application owning the detector [`Scheduler`]
//! - **Audio Thread**: Dedicated CPAL capture thread inside `detector-core`
//! - **Updates**: a timer subscription drives one scheduler tick per interval,
//!   and only exists while listening or recording

mod config;
mod ui;
mod widgets;

use std::path::PathBuf;

use detector_core::audio::CpalInput;
use detector_core::notify::{DesktopNotifier, EmailLogNotifier};
use detector_core::persistence::{self, AppData};
use detector_core::scheduler::Scheduler;
use detector_core::{DetectorError, now_millis};
use iced::{Element, Subscription, Theme};
use ui::main_display::create_main_view;

/// Main entry point for the Sound Detector application.
pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Starting Sound Detector...");
    let result = iced::application("Sound Detector", DetectorApp::update, DetectorApp::view)
        .subscription(DetectorApp::subscription)
        .theme(DetectorApp::theme)
        .run();
    log::info!("Application finished with result: {result:?}");
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    // Mode controls
    ToggleListening,
    ToggleRecording,

    // Naming step shown while recording
    PatternNameChanged(String),
    SavePattern,
    CancelRecording,

    // Collections
    EmailInputChanged(String),
    AddEmail,
    RemoveEmail(String),
    RemovePattern(i64),

    // Timer tick driving the scheduler
    Tick,
}

/// UI-only state that the detector core does not track.
#[derive(Debug, Clone, Default)]
pub struct AppDisplayData {
    /// Latest level, 0-100.
    pub level_percent: u8,
    /// Latest spectrum for the live view.
    pub spectrum: Vec<u8>,
    /// One-line status, also used for error alerts.
    pub status: String,
    pub email_input: String,
    pub pattern_name: String,
}

/// Main application state.
#[derive(Debug)]
struct DetectorApp {
    scheduler: Scheduler,
    data_path: Option<PathBuf>,
    display_data: AppDisplayData,
}

impl Default for DetectorApp {
    /// Loads configuration and saved data and wires the notifiers.
    ///
    /// The microphone is only opened on the first listen or record request.
    fn default() -> Self {
        let gui_config = config::load_or_default();

        let data_path = match gui_config.data_path() {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Saved data disabled: {e:#}");
                None
            }
        };
        let data = data_path
            .as_deref()
            .map(|path| {
                persistence::load(path).unwrap_or_else(|e| {
                    log::error!("Could not load {}: {e}", path.display());
                    AppData::default()
                })
            })
            .unwrap_or_default();
        log::info!(
            "Loaded {} pattern(s) and {} e-mail(s)",
            data.sound_patterns.len(),
            data.email_list.len()
        );

        let detector_config = gui_config.detector;
        let notifications = detector_config.notifications;
        let mut scheduler = Scheduler::new(detector_config, Box::new(CpalInput::new()), data);
        scheduler.add_notifier(Box::new(EmailLogNotifier));
        if notifications {
            scheduler.add_notifier(Box::new(DesktopNotifier));
        }

        Self {
            scheduler,
            data_path,
            display_data: AppDisplayData {
                status: "Idle".to_string(),
                ..AppDisplayData::default()
            },
        }
    }
}

impl DetectorApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::ToggleListening => {
                if self.scheduler.is_listening() {
                    self.scheduler.stop_listening();
                    self.display_data.status = "Idle".to_string();
                } else {
                    match self.scheduler.start_listening() {
                        Ok(()) => self.display_data.status = "Listening...".to_string(),
                        Err(e) => self.alert(e),
                    }
                }
            }
            Message::ToggleRecording => {
                if self.scheduler.is_recording() {
                    self.save_pattern();
                } else {
                    match self.scheduler.start_recording() {
                        Ok(()) => {
                            self.display_data.pattern_name.clear();
                            self.display_data.status = "Recording...".to_string();
                        }
                        Err(e) => self.alert(e),
                    }
                }
            }
            Message::PatternNameChanged(name) => {
                self.display_data.pattern_name = name;
            }
            Message::SavePattern => self.save_pattern(),
            Message::CancelRecording => {
                self.scheduler.cancel_recording();
                self.display_data.pattern_name.clear();
                self.reset_status();
            }
            Message::EmailInputChanged(value) => {
                self.display_data.email_input = value;
            }
            Message::AddEmail => match self.scheduler.add_email(&self.display_data.email_input) {
                Ok(()) => {
                    self.display_data.email_input.clear();
                    self.persist();
                }
                Err(e) => self.alert(e),
            },
            Message::RemoveEmail(email) => {
                if self.scheduler.remove_email(&email) {
                    self.persist();
                }
            }
            Message::RemovePattern(id) => {
                if self.scheduler.remove_pattern(id) {
                    self.persist();
                }
            }
            Message::Tick => self.tick(),
        }
    }

    fn tick(&mut self) {
        match self.scheduler.tick(now_millis()) {
            Ok(Some(report)) => {
                self.display_data.level_percent = report.level_percent();
                self.display_data.spectrum = report.spectrum;
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Tick failed: {e}");
                self.scheduler.stop_listening();
                self.scheduler.cancel_recording();
                self.alert(e);
            }
        }
    }

    /// Completes the running recording with the entered name.
    fn save_pattern(&mut self) {
        let name = std::mem::take(&mut self.display_data.pattern_name);
        match self.scheduler.finish_recording(&name, now_millis()) {
            Ok(pattern) => {
                log::info!("Saved pattern {:?} ({:.1}s)", pattern.name, pattern.duration_secs());
                self.display_data.status = "Pattern saved!".to_string();
                self.persist();
            }
            Err(e) => self.alert(e),
        }
    }

    fn persist(&mut self) {
        let Some(path) = &self.data_path else {
            return;
        };
        if let Err(e) = persistence::save(path, &self.scheduler.snapshot()) {
            log::error!("Error saving data: {e}");
            self.display_data.status = format!("Could not save: {e}");
        }
    }

    fn reset_status(&mut self) {
        self.display_data.status = if self.scheduler.is_listening() {
            "Listening...".to_string()
        } else {
            "Idle".to_string()
        };
    }

    /// Shows an error once in the status line.
    fn alert(&mut self, error: DetectorError) {
        log::warn!("{error}");
        self.display_data.status = match &error {
            DetectorError::EmptyRecording | DetectorError::InvalidName => {
                format!("Invalid recording: {error}")
            }
            other => other.to_string(),
        };
    }

    /// Renders the main application interface.
    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.scheduler, &self.display_data)
    }

    /// Ticks at the configured interval, only while listening or recording.
    ///
    /// Dropping the subscription cancels the next pending tick.
    fn subscription(&self) -> Subscription<Message> {
        if self.scheduler.is_active() {
            iced::time::every(self.scheduler.config().tick_interval()).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
