//! # Pattern Matcher
//!
//! Scores a live frame against every stored pattern.
//!
//! The comparison is coarse: only every 10th recorded frame
//! and every 5th frequency bin take part, and bins within ±30 of each other
//! count as equal. Changing these constants changes which sounds match.

use crate::recorder::Pattern;
use crate::Frame;

/// Only one recorded frame out of this many is compared.
pub const FRAME_STRIDE: usize = 10;

/// Only one frequency bin out of this many is compared.
pub const BIN_STRIDE: usize = 5;

/// Two bins match when their difference is strictly below this.
pub const BIN_TOLERANCE: i16 = 30;

/// Average similarity must exceed this for a match.
pub const MATCH_THRESHOLD: f32 = 0.85;

/// Live level must exceed this for a match.
pub const LEVEL_GATE: f32 = 20.0;

/// Fraction of compared bins (every 5th) that lie within tolerance.
///
/// Compares up to the shorter of the two spectra; two empty spectra score 0.
pub fn similarity(a: &[u8], b: &[u8]) -> f32 {
    let len = a.len().min(b.len());
    let (matches, compared) = (0..len)
        .step_by(BIN_STRIDE)
        .fold((0usize, 0usize), |(matches, compared), i| {
            let diff = (a[i] as i16 - b[i] as i16).abs();
            let hit = usize::from(diff < BIN_TOLERANCE);
            (matches + hit, compared + 1)
        });

    if compared == 0 {
        return 0.0;
    }
    matches as f32 / compared as f32
}

/// Recorded frames that take part in the comparison.
///
/// Indices 0, [`FRAME_STRIDE`], 2 * [`FRAME_STRIDE`], ... of the recording.
/// A pattern shorter than one stride contributes nothing.
pub fn comparison_frames(pattern: &Pattern) -> impl Iterator<Item = &Frame> {
    let frames = if pattern.frames.len() < FRAME_STRIDE {
        &pattern.frames[..0]
    } else {
        &pattern.frames[..]
    };
    frames.iter().step_by(FRAME_STRIDE)
}

/// Average similarity of the live frame to the pattern's comparison frames.
///
/// `None` when the pattern has no comparison frames.
pub fn score(pattern: &Pattern, live: &Frame) -> Option<f32> {
    let (total, count) = comparison_frames(pattern).fold((0.0f32, 0usize), |(total, count), f| {
        (total + similarity(&f.spectrum, &live.spectrum), count + 1)
    });
    if count == 0 {
        return None;
    }
    Some(total / count as f32)
}

/// Whether the live frame matches the pattern.
pub fn is_match(pattern: &Pattern, live: &Frame) -> bool {
    match score(pattern, live) {
        Some(avg_match) => avg_match > MATCH_THRESHOLD && live.level > LEVEL_GATE,
        None => false,
    }
}

/// Names of all patterns the live frame matches, in store order.
pub fn evaluate(live: &Frame, patterns: &[Pattern]) -> Vec<String> {
    patterns
        .iter()
        .filter(|pattern| is_match(pattern, live))
        .map(|pattern| pattern.name.clone())
        .collect()
}
