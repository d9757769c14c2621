//! Core data types shared across all modules
//!
//! Health statuses, flash messages and the small selection-list helpers
//! used by the filter and check-selection screens.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of a check on a single host, and the health of any monitored
/// resource. Unrecognized wire values (older servers report `undefined`)
/// collapse into `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Passing,
    Warning,
    Critical,
    Skipped,
    #[serde(other)]
    #[default]
    Unknown,
}

impl HealthStatus {
    /// All statuses, in the order they appear in filter bars.
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Passing,
        HealthStatus::Warning,
        HealthStatus::Critical,
        HealthStatus::Skipped,
        HealthStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Passing => "passing",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::Skipped => "skipped",
            HealthStatus::Unknown => "unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Passing => "✓",
            HealthStatus::Warning => "⚠",
            HealthStatus::Critical => "✗",
            HealthStatus::Skipped => "○",
            HealthStatus::Unknown => "·",
        }
    }
}

/// A temporary UI message shown to the user (success/error notifications)
#[derive(Clone)]
pub struct FlashMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

impl FlashMessage {
    pub fn new(text: String, is_error: bool) -> Self {
        Self {
            text,
            is_error,
            created: Instant::now(),
        }
    }

    pub fn is_expired(&self, seconds: u64) -> bool {
        self.created.elapsed().as_secs() >= seconds
    }
}

/// Expire a flash message after `seconds`
pub fn expire_flash(msg: &mut Option<FlashMessage>, seconds: u64) {
    if let Some(m) = msg {
        if m.is_expired(seconds) {
            *msg = None;
        }
    }
}

// ── Selection-list helpers ──
//
// Small set-like operations over plain Vecs, used by the status filter bar
// and the check-selection screen. Double-toggling leaves the list exactly
// as it was.

/// Add `element` if absent, remove every occurrence if present.
pub fn toggle<T: PartialEq>(element: T, list: &mut Vec<T>) {
    if list.contains(&element) {
        list.retain(|v| *v != element);
    } else {
        list.push(element);
    }
}

/// True if at least one of `elements` is in `list`.
pub fn has_one<T: PartialEq>(elements: &[T], list: &[T]) -> bool {
    elements.iter().any(|e| list.contains(e))
}

/// Remove every element of `elements` from `list`.
pub fn remove_all<T: PartialEq>(elements: &[T], list: &mut Vec<T>) {
    list.retain(|v| !elements.contains(v));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_lowercase() {
        let s: HealthStatus = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(s, HealthStatus::Critical);
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        let s: HealthStatus = serde_json::from_str("\"undefined\"").unwrap();
        assert_eq!(s, HealthStatus::Unknown);
    }

    #[test]
    fn test_toggle_twice_restores_list() {
        let mut list = vec!["a", "b"];
        toggle("c", &mut list);
        assert_eq!(list, vec!["a", "b", "c"]);
        toggle("c", &mut list);
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn test_has_one() {
        let list = vec!["x", "y"];
        assert!(has_one(&["y", "z"], &list));
        assert!(!has_one(&["z"], &list));
        assert!(!has_one::<&str>(&[], &list));
    }

    #[test]
    fn test_remove_all() {
        let mut list = vec!["a", "b", "c", "b"];
        remove_all(&["b", "c"], &mut list);
        assert_eq!(list, vec!["a"]);
    }

    #[test]
    fn test_flash_message_fresh() {
        let msg = FlashMessage::new("saved".into(), false);
        assert!(!msg.is_expired(3));
        assert_eq!(msg.text, "saved");
    }
}
