//! Chord modifiers: sevenths, extensions, suspensions, and altered triads.
//!
//! A modifier is a labelled transformation of a chord's interval set.
//! Active modifiers live in a [`ModifierStack`], an insertion-ordered
//! list with toggle semantics, so conflicting replacement rules (sus2 vs
//! sus4, dim vs aug) resolve deterministically: the rule toggled on last
//! is applied last and wins.

use crate::chords::{full_chord_name, ChordQuality};
use crate::pitch::PitchClass;

/// How a modifier transforms an interval set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    /// Insert one interval if absent.
    AddSingle(i32),
    /// Insert several intervals, each if absent.
    AddMultiple(&'static [i32]),
    /// Remove one interval if present.
    RemoveSingle(i32),
    /// Discard the current intervals and substitute this set.
    ReplaceAll(&'static [i32]),
}

/// A labelled modifier rule.
#[derive(Clone, Copy, Debug)]
pub struct ModifierRule {
    pub label: &'static str,
    pub kind: ModifierKind,
}

/// The fixed 12-rule modifier catalogue.
pub const CHORD_MODIFIERS: [ModifierRule; 12] = [
    // Sevenths, sixth, suspensions, diminished
    ModifierRule { label: "7", kind: ModifierKind::AddSingle(10) },
    ModifierRule { label: "maj7", kind: ModifierKind::AddSingle(11) },
    ModifierRule { label: "6", kind: ModifierKind::AddSingle(9) },
    ModifierRule { label: "sus2", kind: ModifierKind::ReplaceAll(&[0, 2, 7]) },
    ModifierRule { label: "sus4", kind: ModifierKind::ReplaceAll(&[0, 5, 7]) },
    ModifierRule { label: "dim", kind: ModifierKind::ReplaceAll(&[0, 3, 6]) },
    // Extended harmony and augmented
    ModifierRule { label: "9", kind: ModifierKind::AddMultiple(&[10, 14]) },
    ModifierRule { label: "maj9", kind: ModifierKind::AddMultiple(&[11, 14]) },
    ModifierRule { label: "11", kind: ModifierKind::AddMultiple(&[10, 14, 17]) },
    ModifierRule { label: "13", kind: ModifierKind::AddMultiple(&[10, 14, 21]) },
    ModifierRule { label: "add9", kind: ModifierKind::AddSingle(14) },
    ModifierRule { label: "aug", kind: ModifierKind::ReplaceAll(&[0, 4, 8]) },
];

/// Look up a catalogue rule by label.
pub fn rule_for(label: &str) -> Option<&'static ModifierRule> {
    CHORD_MODIFIERS.iter().find(|rule| rule.label == label)
}

/// Insertion-ordered set of active modifier labels.
///
/// Toggling an unknown label is ignored (logged, not an error), so
/// callers can forward arbitrary labels safely.
#[derive(Clone, Debug, Default)]
pub struct ModifierStack {
    labels: Vec<&'static str>,
}

impl ModifierStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a modifier on or off. Returns true if it is now active.
    pub fn toggle(&mut self, label: &str) -> bool {
        let Some(rule) = rule_for(label) else {
            log::warn!("Ignoring unknown chord modifier: {label}");
            return false;
        };
        if let Some(pos) = self.labels.iter().position(|&l| l == rule.label) {
            self.labels.remove(pos);
            false
        } else {
            self.labels.push(rule.label);
            true
        }
    }

    /// Whether a label is currently active.
    pub fn is_active(&self, label: &str) -> bool {
        self.labels.iter().any(|&l| l == label)
    }

    /// Active labels in insertion order.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    /// Deactivate all modifiers.
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Resolve a base interval set through the active modifiers.
///
/// Rules apply in insertion order; the result is sorted ascending and
/// deduplicated.
pub fn resolve(base_intervals: &[i32], stack: &ModifierStack) -> Vec<i32> {
    let mut intervals = base_intervals.to_vec();

    for label in stack.labels() {
        let Some(rule) = rule_for(label) else { continue };
        match rule.kind {
            ModifierKind::ReplaceAll(set) => {
                intervals.clear();
                intervals.extend_from_slice(set);
            }
            ModifierKind::AddMultiple(set) => {
                for &interval in set {
                    if !intervals.contains(&interval) {
                        intervals.push(interval);
                    }
                }
            }
            ModifierKind::AddSingle(interval) => {
                if !intervals.contains(&interval) {
                    intervals.push(interval);
                }
            }
            ModifierKind::RemoveSingle(interval) => {
                intervals.retain(|&i| i != interval);
            }
        }
    }

    intervals.sort_unstable();
    intervals.dedup();
    intervals
}

/// Display name for a chord under its active modifiers.
///
/// Precedence, first match wins: dim, aug, sus2/sus4 (with non-sus,
/// non-seventh labels appended), then base quality plus a single
/// extension chosen by 13 > 11 > maj9 > 9 > maj7 > 7 > 6, else add9.
/// A 13th implies the 9th and 11th, so only the highest extension shows.
pub fn display_name(
    root: PitchClass,
    base_quality: ChordQuality,
    base_intervals: &[i32],
    stack: &ModifierStack,
) -> String {
    if stack.is_empty() {
        return full_chord_name(root, base_intervals);
    }

    if stack.is_active("dim") {
        return format!("{root}°");
    }
    if stack.is_active("aug") {
        return format!("{root}+");
    }

    if let Some(sus) = stack.labels().iter().find(|l| l.starts_with("sus")) {
        let mut name = format!("{root}{sus}");
        for label in stack.labels() {
            if !label.starts_with("sus") && !label.contains('7') {
                name.push_str(label);
            }
        }
        return name;
    }

    let mut name = match base_quality {
        ChordQuality::Min => format!("{root}m"),
        ChordQuality::Dim => format!("{root}°"),
        _ => root.to_string(),
    };

    let extension = ["13", "11", "maj9", "9", "maj7", "7", "6"]
        .iter()
        .find(|label| stack.is_active(label));
    match extension {
        Some(label) => name.push_str(label),
        None if stack.is_active("add9") => name.push_str("add9"),
        None => {}
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchClass::*;

    const MAJOR: &[i32] = &[0, 4, 7];
    const MINOR: &[i32] = &[0, 3, 7];

    fn stack(labels: &[&str]) -> ModifierStack {
        let mut stack = ModifierStack::new();
        for label in labels {
            stack.toggle(label);
        }
        stack
    }

    #[test]
    fn test_add_single() {
        assert_eq!(resolve(MAJOR, &stack(&["7"])), vec![0, 4, 7, 10]);
        assert_eq!(resolve(MAJOR, &stack(&["maj7"])), vec![0, 4, 7, 11]);
    }

    #[test]
    fn test_replace_all() {
        assert_eq!(resolve(MAJOR, &stack(&["sus4"])), vec![0, 5, 7]);
        assert_eq!(resolve(MINOR, &stack(&["aug"])), vec![0, 4, 8]);
    }

    #[test]
    fn test_last_replace_wins() {
        assert_eq!(resolve(MAJOR, &stack(&["sus2", "sus4"])), vec![0, 5, 7]);
        assert_eq!(resolve(MAJOR, &stack(&["sus4", "sus2"])), vec![0, 2, 7]);
    }

    #[test]
    fn test_toggle_idempotence() {
        let mut stack = ModifierStack::new();
        stack.toggle("9");
        stack.toggle("9");
        assert!(stack.is_empty());
        assert_eq!(resolve(MAJOR, &stack), MAJOR.to_vec());
    }

    #[test]
    fn test_additive_modifiers_commute() {
        assert_eq!(resolve(MAJOR, &stack(&["7", "9"])), resolve(MAJOR, &stack(&["9", "7"])));
    }

    #[test]
    fn test_unknown_label_ignored() {
        let mut stack = ModifierStack::new();
        assert!(!stack.toggle("sus13"));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_display_name_overrides() {
        assert_eq!(display_name(C, ChordQuality::Maj, MAJOR, &stack(&["dim", "7"])), "C°");
        assert_eq!(display_name(C, ChordQuality::Min, MINOR, &stack(&["aug"])), "C+");
    }

    #[test]
    fn test_display_name_sus() {
        assert_eq!(display_name(G, ChordQuality::Maj, MAJOR, &stack(&["sus4"])), "Gsus4");
        // Extensions append to sus names, sevenths do not
        assert_eq!(display_name(G, ChordQuality::Maj, MAJOR, &stack(&["sus2", "9"])), "Gsus29");
        assert_eq!(display_name(G, ChordQuality::Maj, MAJOR, &stack(&["sus4", "7"])), "Gsus4");
    }

    #[test]
    fn test_display_name_extension_priority() {
        assert_eq!(display_name(D, ChordQuality::Min, MINOR, &stack(&["7", "9"])), "Dm9");
        assert_eq!(display_name(C, ChordQuality::Maj, MAJOR, &stack(&["9", "11"])), "C11");
        assert_eq!(display_name(C, ChordQuality::Maj, MAJOR, &stack(&["13", "9", "11"])), "C13");
        assert_eq!(display_name(C, ChordQuality::Maj, MAJOR, &stack(&["add9"])), "Cadd9");
        assert_eq!(display_name(C, ChordQuality::Maj, MAJOR, &stack(&["add9", "7"])), "C7");
    }

    #[test]
    fn test_display_name_no_modifiers() {
        assert_eq!(display_name(A, ChordQuality::Min, MINOR, &ModifierStack::new()), "Am");
    }
}
