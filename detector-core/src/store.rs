//! In-memory set of saved patterns.

use crate::recorder::Pattern;

/// Owns the saved fingerprints in insertion order.
///
/// Ids are creation timestamps and therefore unique in practice; adding a
/// pattern whose id is already present is a caller error and is not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternStore {
    patterns: Vec<Pattern>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded patterns, skipping any without frames.
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        let mut store = Self::new();
        for pattern in patterns {
            if pattern.frames.is_empty() {
                log::warn!("Skipping stored pattern {:?} with no frames", pattern.name);
                continue;
            }
            store.add(pattern);
        }
        store
    }

    /// Appends `pattern` and returns the stored copy.
    pub fn add(&mut self, pattern: Pattern) -> &Pattern {
        let index = self.patterns.len();
        self.patterns.push(pattern);
        &self.patterns[index]
    }

    /// Removes the pattern with `id`; returns whether one was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.patterns.len();
        self.patterns.retain(|p| p.id != id);
        before != self.patterns.len()
    }

    pub fn all(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;

    fn pattern(id: i64, name: &str) -> Pattern {
        Pattern {
            id,
            name: name.to_string(),
            frames: vec![Frame::new(vec![0; 4], id)],
            duration: 16,
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let mut store = PatternStore::new();
        store.add(pattern(2, "b"));
        store.add(pattern(1, "a"));
        let names: Vec<_> = store.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn add_returns_stored_pattern() {
        let mut store = PatternStore::new();
        store.add(pattern(1, "a"));
        assert_eq!(store.add(pattern(2, "b")).name, "b");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = PatternStore::new();
        store.add(pattern(1, "a"));
        assert!(!store.remove(99));
        assert_eq!(store.len(), 1);
        assert!(store.remove(1));
        assert!(store.is_empty());
    }

    #[test]
    fn frameless_patterns_are_not_loaded() {
        let mut empty = pattern(3, "empty");
        empty.frames.clear();
        let store = PatternStore::from_patterns(vec![pattern(1, "a"), empty]);
        assert_eq!(store.len(), 1);
    }
}
