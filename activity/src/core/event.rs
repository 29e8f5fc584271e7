//! Activity event model.
//!
//! [`RawEvent`] mirrors the wire shape returned by the GitHub events API and is
//! also the record format of the persisted window. [`ActivityEvent`] is the
//! closed, typed view over the event kinds this crate knows how to render.
//! Conversion from raw to typed is the single place where unsupported kinds are
//! dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Repository reference as it appears on an event (`repo.name` is `owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub name: String,
}

/// Event record as fetched from GitHub or read back from the persisted window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: RepoRef,
    #[serde(default)]
    pub payload: Value,
}

/// A supported activity event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub id: String,
    /// `owner/name` of the repository the event happened in.
    pub repo: String,
    pub kind: EventKind,
}

/// The closed set of event kinds that can be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    IssueComment { issue: u64 },
    Issue { action: String, issue: u64 },
    PullRequest { action: String, number: u64, merged: bool },
}

const ISSUE_COMMENT_EVENT: &str = "IssueCommentEvent";
const ISSUES_EVENT: &str = "IssuesEvent";
const PULL_REQUEST_EVENT: &str = "PullRequestEvent";

#[derive(Debug, Serialize, Deserialize)]
struct IssueNumber {
    number: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct IssueCommentPayload {
    issue: IssueNumber,
}

#[derive(Debug, Serialize, Deserialize)]
struct IssuesPayload {
    action: String,
    issue: IssueNumber,
}

#[derive(Debug, Serialize, Deserialize)]
struct PullRequestPayload {
    action: String,
    pull_request: PullRequestFields,
}

#[derive(Debug, Serialize, Deserialize)]
struct PullRequestFields {
    number: u64,
    #[serde(default)]
    merged: bool,
}

impl ActivityEvent {
    /// Convert a raw event into a typed one.
    ///
    /// Returns `None` for unsupported kinds and for supported kinds whose payload
    /// lacks the fields needed for rendering.
    pub fn from_raw(raw: &RawEvent) -> Option<Self> {
        let kind = match raw.kind.as_str() {
            ISSUE_COMMENT_EVENT => {
                let payload: IssueCommentPayload = parse_payload(&raw.payload)?;
                EventKind::IssueComment {
                    issue: payload.issue.number,
                }
            }
            ISSUES_EVENT => {
                let payload: IssuesPayload = parse_payload(&raw.payload)?;
                EventKind::Issue {
                    action: payload.action,
                    issue: payload.issue.number,
                }
            }
            PULL_REQUEST_EVENT => {
                let payload: PullRequestPayload = parse_payload(&raw.payload)?;
                EventKind::PullRequest {
                    action: payload.action,
                    number: payload.pull_request.number,
                    merged: payload.pull_request.merged,
                }
            }
            _ => return None,
        };
        Some(Self {
            id: raw.id.clone(),
            repo: raw.repo.name.clone(),
            kind,
        })
    }

    /// Project back to the reduced record stored in the persisted window.
    ///
    /// Only the fields read by [`ActivityEvent::from_raw`] are kept, so a stored
    /// record always converts back to an equal event.
    pub fn to_reduced(&self) -> RawEvent {
        let (kind, payload) = match &self.kind {
            EventKind::IssueComment { issue } => (
                ISSUE_COMMENT_EVENT,
                to_value(IssueCommentPayload {
                    issue: IssueNumber { number: *issue },
                }),
            ),
            EventKind::Issue { action, issue } => (
                ISSUES_EVENT,
                to_value(IssuesPayload {
                    action: action.clone(),
                    issue: IssueNumber { number: *issue },
                }),
            ),
            EventKind::PullRequest {
                action,
                number,
                merged,
            } => (
                PULL_REQUEST_EVENT,
                to_value(PullRequestPayload {
                    action: action.clone(),
                    pull_request: PullRequestFields {
                        number: *number,
                        merged: *merged,
                    },
                }),
            ),
        };
        RawEvent {
            id: self.id.clone(),
            kind: kind.to_string(),
            repo: RepoRef {
                name: self.repo.clone(),
            },
            payload,
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &Value) -> Option<T> {
    serde_json::from_value(payload.clone()).ok()
}

// Payload structs only hold strings, integers and bools, which always serialize.
fn to_value<T: Serialize>(payload: T) -> Value {
    serde_json::to_value(payload).unwrap_or(Value::Null)
}
