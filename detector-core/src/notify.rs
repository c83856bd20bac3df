//! # Notifiers
//!
//! Side effects fired once for every accepted detection: a desktop
//! notification and the simulated e-mail dispatch.

use crate::debouncer::Detection;

/// Notification title for every detection.
pub const NOTIFICATION_TITLE: &str = "Sound detected";

/// Receives every accepted detection exactly once.
pub trait Notifier {
    /// `recipients` is the current e-mail list.
    fn notify(&mut self, detection: &Detection, recipients: &[String]);
}

/// Body text shown for a detection.
pub fn notification_body(detection: &Detection) -> String {
    format!("Detected: {}", detection.sound)
}

/// Shows a desktop notification.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&mut self, detection: &Detection, _recipients: &[String]) {
        platform::notify(NOTIFICATION_TITLE, &notification_body(detection));
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use std::process::{Command, Stdio};

    /// Uses `notify-send`, which talks to whatever notification daemon runs.
    pub fn notify(title: &str, body: &str) {
        let child = Command::new("notify-send")
            .args(["--app-name=sound-detector", title, body])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match child {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => log::warn!("Desktop notification failed: {e}"),
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub fn notify(title: &str, body: &str) {
        log::info!("{title}: {body}");
    }
}

/// Stand-in for e-mail delivery: logs one line per recipient.
#[derive(Debug, Default)]
pub struct EmailLogNotifier;

impl Notifier for EmailLogNotifier {
    fn notify(&mut self, detection: &Detection, recipients: &[String]) {
        for email in recipients {
            log::info!(
                "Email sent to {email}: detected {:?} at {}",
                detection.sound,
                detection.display_time
            );
        }
    }
}
