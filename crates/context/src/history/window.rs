//! Context window: a bounded, privacy-scrubbing history of recent turns.
//!
//! Each turn is reduced to its intent, emotion, a short scrubbed summary and
//! a 3-float meaning vector. The window is a FIFO ring: once full, every
//! insert evicts the oldest entry.
//!
//! - **Bounded**: capacity is clamped to [10, 25] at construction
//! - **Scrubbing**: entries are re-sanitized on insert, whatever their origin
//! - **Session-scoped**: never persisted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use toron_config::{MAX_WINDOW_SIZE, MIN_WINDOW_SIZE, WindowConfig};
use toron_core::{Emotion, Intent, Role, sanitize, score};

/// Summary length at which the length term of the density score saturates.
const DENSITY_SUMMARY_SATURATION: f64 = 120.0;

/// One sanitized turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextWindowEntry {
    pub role: Role,
    pub intent: Intent,
    pub emotion: Emotion,
    pub meaning_vector: [f64; 3],
    /// Scrubbed text, at most 280 characters.
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl ContextWindowEntry {
    /// Build an entry from turn text. The text is scrubbed before anything
    /// is derived from it.
    pub fn new(
        role: Role,
        intent: Intent,
        emotion: Emotion,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let summary = sanitize::summarize(text, sanitize::SUMMARY_LIMIT);
        let meaning_vector = derive_meaning_vector(&summary);
        Self {
            role,
            intent,
            emotion,
            meaning_vector,
            summary,
            timestamp,
        }
    }

    /// Euclidean length of the meaning vector.
    pub fn vector_magnitude(&self) -> f64 {
        self.meaning_vector.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn sanitized(mut self) -> Self {
        self.summary = sanitize::summarize(&self.summary, sanitize::SUMMARY_LIMIT);
        for component in &mut self.meaning_vector {
            *component = score::unit(*component);
        }
        self
    }
}

/// The bounded turn history.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    entries: VecDeque<ContextWindowEntry>,
    max_size: usize,
}

impl ContextWindow {
    /// Create an empty window. `max_size` is clamped to [10, 25].
    pub fn new(max_size: usize) -> Self {
        let clamped = max_size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);
        if clamped != max_size {
            tracing::warn!(
                requested = max_size,
                applied = clamped,
                "Context window size out of range, clamped"
            );
        }
        Self {
            entries: VecDeque::with_capacity(clamped),
            max_size: clamped,
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.max_size)
    }

    /// Sanitize and append an entry, evicting from the front while over
    /// capacity. Returns the most recently evicted entry, if any.
    pub fn add_entry(&mut self, entry: ContextWindowEntry) -> Option<ContextWindowEntry> {
        self.entries.push_back(entry.sanitized());

        let mut evicted = None;
        while self.entries.len() > self.max_size {
            evicted = self.entries.pop_front();
        }
        evicted
    }

    /// A defensive copy of the entries, oldest first.
    pub fn window(&self) -> Vec<ContextWindowEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ContextWindowEntry> {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ContextWindowEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Normalized [0, 1] density across all entries.
    ///
    /// Mean of `0.6 * |vector| + 0.4 * min(summary_len / 120, 1)`, scaled
    /// down by ten and clamped. An empty window scores zero.
    pub fn semantic_density_score(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .entries
            .iter()
            .map(|e| {
                let length = e.summary.chars().count() as f64 / DENSITY_SUMMARY_SATURATION;
                0.6 * e.vector_magnitude() + 0.4 * length.min(1.0)
            })
            .sum();
        score::unit(total / self.entries.len() as f64 / 10.0)
    }

    /// Empty the buffer. Capacity is kept.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(MAX_WINDOW_SIZE)
    }
}

/// Deterministic 3-float fingerprint of a text.
///
/// A rolling hash where each character is weighted by its position modulo
/// seven; three 10-bit slices of the final hash become the components, each
/// in [0, 1]. This is **not** a cryptographic digest and makes no
/// collision-resistance promise. It exists only to feed the density
/// heuristic. Empty text maps to the zero vector.
pub fn derive_meaning_vector(text: &str) -> [f64; 3] {
    if text.is_empty() {
        return [0.0; 3];
    }

    let mut hash: u32 = 0;
    for (i, ch) in text.chars().enumerate() {
        let weight = (i % 7) as u32 + 1;
        hash = hash
            .wrapping_mul(31)
            .wrapping_add((ch as u32).wrapping_mul(weight));
    }

    let slice = |shift: u32| ((hash >> shift) & 0x3ff) as f64 / 1023.0;
    [slice(0), slice(10), slice(20)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(text: &str) -> ContextWindowEntry {
        ContextWindowEntry::new(
            Role::User,
            Intent::Dialogue,
            Emotion::Neutral,
            text,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(ContextWindow::new(3).max_size(), 10);
        assert_eq!(ContextWindow::new(15).max_size(), 15);
        assert_eq!(ContextWindow::new(500).max_size(), 25);
    }

    #[test]
    fn eviction_is_fifo() {
        let mut window = ContextWindow::new(10);
        for i in 0..10 {
            assert!(window.add_entry(entry(&format!("turn {i}"))).is_none());
        }
        let evicted = window.add_entry(entry("turn 10")).unwrap();
        assert_eq!(evicted.summary, "turn 0");
        assert_eq!(window.len(), 10);

        let summaries: Vec<_> = window.entries().map(|e| e.summary.clone()).collect();
        assert_eq!(summaries.first().unwrap(), "turn 1");
        assert_eq!(summaries.last().unwrap(), "turn 10");
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut window = ContextWindow::new(12);
        for i in 0..100 {
            window.add_entry(entry(&format!("message {i}")));
            assert!(window.len() <= 12);
        }
    }

    #[test]
    fn entries_are_scrubbed_on_construction() {
        let e = entry("contact me at test@example.com, call 5551234");
        assert!(e.summary.contains("[redacted]"));
        assert!(e.summary.contains("[num]"));
        assert!(!e.summary.contains("test@example.com"));
        assert!(!e.summary.contains("5551234"));
    }

    #[test]
    fn hand_built_entries_are_scrubbed_on_insert() {
        let mut window = ContextWindow::default();
        let mut raw = entry("placeholder");
        raw.summary = format!("reach jo@x.org {}", "y".repeat(400));
        raw.meaning_vector = [f64::NAN, 4.0, -1.0];
        window.add_entry(raw);

        let stored = &window.window()[0];
        assert!(stored.summary.starts_with("reach [redacted]"));
        assert!(stored.summary.chars().count() <= 280);
        assert_eq!(stored.meaning_vector, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn window_returns_a_copy() {
        let mut window = ContextWindow::default();
        window.add_entry(entry("hello"));
        let mut copy = window.window();
        copy.clear();
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut window = ContextWindow::default();
        for i in 0..5 {
            window.add_entry(entry(&format!("m{i}")));
        }
        let tail: Vec<_> = window.recent(2).map(|e| e.summary.as_str()).collect();
        assert_eq!(tail, vec!["m3", "m4"]);
        assert_eq!(window.recent(50).count(), 5);
    }

    #[test]
    fn meaning_vector_is_deterministic() {
        let a = derive_meaning_vector("plan the rollout");
        let b = derive_meaning_vector("plan the rollout");
        let c = derive_meaning_vector("plan the rollback");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(derive_meaning_vector(""), [0.0; 3]);
    }

    #[test]
    fn density_is_bounded_and_zero_when_empty() {
        let mut window = ContextWindow::default();
        assert_eq!(window.semantic_density_score(), 0.0);

        window.add_entry(entry(&"long summary text ".repeat(20)));
        window.add_entry(entry("short"));
        let density = window.semantic_density_score();
        assert!(density > 0.0);
        assert!(density <= 1.0);
    }

    #[test]
    fn reset_empties_but_keeps_capacity() {
        let mut window = ContextWindow::new(15);
        window.add_entry(entry("a"));
        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.max_size(), 15);
    }
}
