//! Wake lock for keeping the machine awake while listening.

use crate::error::{DetectorError, Result};

pub use platform::WakeLock;

#[cfg(target_os = "linux")]
mod platform {
    use std::process::{Child, Command, Stdio};

    use super::{DetectorError, Result};

    /// Inhibits idle while held. Released on drop.
    #[derive(Debug)]
    pub struct WakeLock {
        child: Option<Child>,
    }

    impl WakeLock {
        /// Uses `systemd-inhibit`, which blocks idle as long as its child lives.
        pub fn acquire() -> Result<Self> {
            let child = Command::new("systemd-inhibit")
                .args([
                    "--what=idle",
                    "--who=sound-detector",
                    "--why=Listening for sounds",
                    "--mode=block",
                    "sleep",
                    "infinity",
                ])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| {
                    log::debug!("systemd-inhibit unavailable: {e}");
                    DetectorError::WakeLockUnsupported
                })?;

            log::info!("Idle inhibited via systemd-inhibit");
            Ok(Self { child: Some(child) })
        }

        pub fn release(mut self) {
            self.stop();
        }

        fn stop(&mut self) {
            if let Some(mut child) = self.child.take() {
                let _ = child.kill();
                let _ = child.wait();
                log::info!("Idle inhibit released");
            }
        }
    }

    impl Drop for WakeLock {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    use super::{DetectorError, Result};

    #[derive(Debug)]
    pub struct WakeLock {
        _private: (),
    }

    impl WakeLock {
        pub fn acquire() -> Result<Self> {
            Err(DetectorError::WakeLockUnsupported)
        }

        pub fn release(self) {}
    }
}

/// Acquires a wake lock, logging instead of failing when unsupported.
pub fn try_acquire() -> Option<WakeLock> {
    match WakeLock::acquire() {
        Ok(lock) => Some(lock),
        Err(DetectorError::WakeLockUnsupported) => {
            log::info!("Wake lock not supported");
            None
        }
        Err(e) => {
            log::warn!("Wake lock failed: {e}");
            None
        }
    }
}
