//! Persistence of the rolling event window in a repository variable.
//!
//! The variable lives in the `<username>/<username>` profile repository.
//! A missing or malformed value reads as an empty window.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::event::RawEvent;
use crate::core::window::parse_persisted;
use crate::io::github::VariableStore;

/// Where the window is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowLocation {
    pub owner: String,
    pub repo: String,
    pub name: String,
}

impl WindowLocation {
    /// The profile repository of `username`.
    pub fn profile(username: &str, name: &str) -> Self {
        Self {
            owner: username.to_string(),
            repo: username.to_string(),
            name: name.to_string(),
        }
    }
}

/// Load the persisted window.
///
/// A missing or unparseable value is an empty window. Errors from the store
/// itself propagate: continuing would overwrite the stored history.
pub fn load_window<S: VariableStore>(
    store: &S,
    location: &WindowLocation,
) -> Result<Vec<RawEvent>> {
    let value = store
        .read_variable(&location.owner, &location.repo, &location.name)
        .with_context(|| format!("read persisted window {}", location.name))?;
    match parse_persisted(value.as_deref()) {
        Ok(events) => {
            debug!(count = events.len(), "loaded persisted window");
            Ok(events)
        }
        Err(err) => {
            warn!(%err, name = %location.name, "ignoring persisted window");
            Ok(Vec::new())
        }
    }
}

/// Serialize and store the window.
pub fn save_window<S: VariableStore>(
    store: &S,
    location: &WindowLocation,
    events: &[RawEvent],
) -> Result<()> {
    let value = serde_json::to_string(events).context("serialize persisted window")?;
    store
        .write_variable(&location.owner, &location.repo, &location.name, &value)
        .with_context(|| format!("write variable {}", location.name))?;
    debug!(count = events.len(), "saved persisted window");
    Ok(())
}
