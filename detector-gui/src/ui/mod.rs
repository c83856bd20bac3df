//! # UI Module
//!
//! Layout and panels of the Sound Detector window.

pub mod lists;
pub mod main_display;
