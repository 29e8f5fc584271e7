//! Test-only helpers: event builders and in-memory adapters.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::core::event::RawEvent;
use crate::io::git::{CommitOutcome, PublishOutcome, Publisher};
use crate::io::github::{EventSource, VariableStore};

fn raw(value: Value) -> RawEvent {
    serde_json::from_value(value).expect("valid raw event")
}

/// `IssuesEvent` with the given action and issue number.
pub fn issue_event(id: &str, repo: &str, action: &str, number: u64) -> RawEvent {
    raw(json!({
        "id": id,
        "type": "IssuesEvent",
        "repo": { "name": repo },
        "payload": { "action": action, "issue": { "number": number } }
    }))
}

/// `IssueCommentEvent` on the given issue.
pub fn comment_event(id: &str, repo: &str, number: u64) -> RawEvent {
    raw(json!({
        "id": id,
        "type": "IssueCommentEvent",
        "repo": { "name": repo },
        "payload": {
            "action": "created",
            "issue": { "number": number, "title": "title" },
            "comment": { "body": "comment body" }
        }
    }))
}

/// `PullRequestEvent` with the given action and merge flag.
pub fn pull_request_event(id: &str, repo: &str, action: &str, number: u64, merged: bool) -> RawEvent {
    raw(json!({
        "id": id,
        "type": "PullRequestEvent",
        "repo": { "name": repo },
        "payload": {
            "action": action,
            "number": number,
            "pull_request": { "number": number, "merged": merged }
        }
    }))
}

/// An event kind that is never rendered.
pub fn push_event(id: &str, repo: &str) -> RawEvent {
    raw(json!({
        "id": id,
        "type": "PushEvent",
        "repo": { "name": repo },
        "payload": { "size": 1 }
    }))
}

/// Event source returning a fixed list.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    pub events: Vec<RawEvent>,
    pub fail: bool,
}

impl ScriptedEvents {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
        }
    }
}

impl EventSource for ScriptedEvents {
    fn fetch_user_events(&self, _username: &str, _page_size: u32) -> Result<Vec<RawEvent>> {
        if self.fail {
            return Err(anyhow!("events api unavailable"));
        }
        Ok(self.events.clone())
    }
}

type VariableKey = (String, String, String);

/// In-memory variable store.
#[derive(Debug, Default)]
pub struct MemoryVariableStore {
    values: RefCell<HashMap<VariableKey, String>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryVariableStore {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn set(&self, owner: &str, repo: &str, name: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key(owner, repo, name), value.to_string());
    }

    pub fn get(&self, owner: &str, repo: &str, name: &str) -> Option<String> {
        self.values.borrow().get(&key(owner, repo, name)).cloned()
    }
}

fn key(owner: &str, repo: &str, name: &str) -> VariableKey {
    (owner.to_string(), repo.to_string(), name.to_string())
}

impl VariableStore for MemoryVariableStore {
    fn read_variable(&self, owner: &str, repo: &str, name: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(anyhow!("variables api unavailable"));
        }
        Ok(self.get(owner, repo, name))
    }

    fn write_variable(&self, owner: &str, repo: &str, name: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("variables api unavailable"));
        }
        self.set(owner, repo, name, value);
        Ok(())
    }
}

/// Publisher that records calls instead of running git.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    pub calls: RefCell<Vec<(PathBuf, String)>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, path: &Path, message: &str) -> Result<PublishOutcome> {
        self.calls
            .borrow_mut()
            .push((path.to_path_buf(), message.to_string()));
        if self.fail {
            return Err(anyhow!("git push failed with status Some(1): rejected"));
        }
        Ok(PublishOutcome {
            commit: CommitOutcome::Committed,
        })
    }
}

/// Temporary directory holding a README.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn with_readme(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("README.md"), contents)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn readme(&self) -> String {
        fs::read_to_string(self.dir.path().join("README.md")).expect("read README")
    }
}
