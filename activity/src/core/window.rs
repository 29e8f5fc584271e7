//! Merge, de-duplication and truncation of the rolling activity window.
//!
//! Fresh events come first so they win over persisted copies of the same id.
//! The pipeline is filter → dedup → truncate, and the persisted projection is
//! taken from the same list that is displayed, so the two never drift apart.

use std::collections::HashSet;

use crate::core::event::{ActivityEvent, RawEvent};

/// Counters describing how the window was built (for logging).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    pub fresh: usize,
    pub persisted: usize,
    pub unsupported: usize,
    pub duplicates: usize,
    pub truncated: usize,
}

/// Result of [`select_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Events to display, newest first, unique by id, at most `max_lines`.
    pub selected: Vec<ActivityEvent>,
    /// Reduced records of `selected`, to be stored for the next run.
    pub to_persist: Vec<RawEvent>,
    pub stats: WindowStats,
}

/// Build the display window from freshly fetched and previously persisted events.
pub fn select_window(fresh: &[RawEvent], persisted: &[RawEvent], max_lines: usize) -> Window {
    let mut stats = WindowStats {
        fresh: fresh.len(),
        persisted: persisted.len(),
        ..WindowStats::default()
    };

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for raw in fresh.iter().chain(persisted) {
        let Some(event) = ActivityEvent::from_raw(raw) else {
            stats.unsupported += 1;
            continue;
        };
        if !seen.insert(event.id.clone()) {
            stats.duplicates += 1;
            continue;
        }
        unique.push(event);
    }

    stats.truncated = unique.len().saturating_sub(max_lines);
    unique.truncate(max_lines);

    let to_persist = unique.iter().map(ActivityEvent::to_reduced).collect();
    Window {
        selected: unique,
        to_persist,
        stats,
    }
}

/// Parse a stored window value; anything unreadable counts as an empty window.
pub fn parse_persisted(value: Option<&str>) -> Result<Vec<RawEvent>, String> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(value).map_err(|err| format!("invalid persisted window: {err}"))
}
