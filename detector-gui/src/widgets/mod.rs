//! # Widgets Module
//!
//! Custom canvas widgets.

pub mod spectrum;
