//! Orchestration for a single `activity run`.
//!
//! fetch → merge with persisted window → persist window → render → reconcile
//! README → write → commit and push. Every step runs once; nothing is retried.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::format::Formatter;
use crate::core::reconcile::{Reconciliation, reconcile};
use crate::core::window::select_window;
use crate::exit_codes;
use crate::io::config::ActivityConfig;
use crate::io::git::{PublishOutcome, Publisher};
use crate::io::github::{EventSource, VariableStore};
use crate::io::readme::{read_document, write_document};
use crate::io::window_store::{WindowLocation, load_window, save_window};

/// Per-invocation switches that are not part of the persisted config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute everything but skip the window write, README write and git.
    pub dry_run: bool,
}

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The section was created or filled for the first time.
    Wrote,
    /// An existing section was rewritten.
    Updated,
    /// The section already matched.
    Unchanged,
    /// No supported events were found.
    NoActivity,
    /// The README has no start marker.
    MissingStartMarker,
}

impl RunStatus {
    pub fn message(self) -> &'static str {
        match self {
            Self::Wrote => "Wrote to README",
            Self::Updated => "Updated README with the recent activity",
            Self::Unchanged => "No changes detected",
            Self::NoActivity => "No PullRequest/Issue/IssueComment events found",
            Self::MissingStartMarker => {
                "Couldn't find the <!--START_SECTION:activity--> comment. Exiting!"
            }
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Wrote | Self::Updated | Self::Unchanged => exit_codes::OK,
            Self::NoActivity => exit_codes::NO_ACTIVITY,
            Self::MissingStartMarker => exit_codes::MISSING_START_MARKER,
        }
    }

    pub fn is_success(self) -> bool {
        self.exit_code() == exit_codes::OK
    }
}

/// Result of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Rendered section entries, in display order.
    pub entries: Vec<String>,
    /// False when the window write failed or was skipped.
    pub window_saved: bool,
    /// Set once the README was committed and pushed.
    pub published: Option<PublishOutcome>,
}

/// Execute one update of the activity section under `root`.
#[instrument(skip_all, fields(username = %cfg.username, dry_run = options.dry_run))]
pub fn run_once<E, V, P>(
    root: &Path,
    cfg: &ActivityConfig,
    events: &E,
    store: &V,
    publisher: &P,
    options: RunOptions,
) -> Result<RunOutcome>
where
    E: EventSource,
    V: VariableStore,
    P: Publisher,
{
    cfg.validate()?;

    info!("getting activity for {}", cfg.username);
    let fresh = events
        .fetch_user_events(&cfg.username, cfg.page_size)
        .context("fetch user events")?;
    let location = WindowLocation::profile(&cfg.username, &cfg.variable_name);
    let persisted = load_window(store, &location)?;

    let window = select_window(&fresh, &persisted, cfg.max_lines);
    info!(
        fresh = window.stats.fresh,
        persisted = window.stats.persisted,
        unsupported = window.stats.unsupported,
        duplicates = window.stats.duplicates,
        truncated = window.stats.truncated,
        selected = window.selected.len(),
        "activity window selected"
    );

    let window_saved = if options.dry_run {
        false
    } else {
        match save_window(store, &location, &window.to_persist) {
            Ok(()) => true,
            Err(err) => {
                let err = format!("{err:#}");
                warn!(%err, "failed to persist activity window, continuing");
                false
            }
        }
    };

    let formatter: Formatter = cfg.formatter();
    let entries = formatter.render_events(&window.selected);
    let outcome = |status| RunOutcome {
        status,
        entries: entries.clone(),
        window_saved,
        published: None,
    };

    let readme_path = root.join(&cfg.readme_path);
    let document = read_document(&readme_path)?;
    let reconciliation = match reconcile(&document, &entries) {
        Ok(reconciliation) => reconciliation,
        Err(err) => {
            warn!(%err, path = %readme_path.display(), "start marker missing");
            return Ok(outcome(RunStatus::MissingStartMarker));
        }
    };

    if window.selected.is_empty() {
        warn!("no supported events found");
        return Ok(outcome(RunStatus::NoActivity));
    }
    if window.selected.len() < cfg.max_lines {
        info!("found less than {} activities", cfg.max_lines);
    }

    let status = match &reconciliation {
        Reconciliation::Unchanged => {
            info!("no changes detected");
            return Ok(outcome(RunStatus::Unchanged));
        }
        Reconciliation::Inserted(_) | Reconciliation::Filled(_) => RunStatus::Wrote,
        Reconciliation::Replaced(_) => RunStatus::Updated,
    };
    let Some(updated) = reconciliation.document() else {
        return Ok(outcome(RunStatus::Unchanged));
    };

    if options.dry_run {
        info!(status = status.message(), "dry run, leaving README untouched");
        return Ok(outcome(status));
    }

    write_document(&readme_path, updated)?;
    info!(path = %readme_path.display(), "{}", status.message());

    let published = publisher
        .publish(&cfg.readme_path, &cfg.commit_message)
        .context("commit and push README")?;

    Ok(RunOutcome {
        published: Some(published),
        ..outcome(status)
    })
}
