//! GitHub REST adapter: user events and Actions repository variables.
//!
//! The [`EventSource`] and [`VariableStore`] traits decouple the run from the
//! HTTP client. Tests use in-memory implementations from `test_support`.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::core::event::RawEvent;

/// Source of a user's recent public events.
pub trait EventSource {
    fn fetch_user_events(&self, username: &str, page_size: u32) -> Result<Vec<RawEvent>>;
}

/// Key/value store scoped to a repository (GitHub Actions variables).
pub trait VariableStore {
    /// Read a variable; `None` if it does not exist.
    fn read_variable(&self, owner: &str, repo: &str, name: &str) -> Result<Option<String>>;
    /// Create or overwrite a variable.
    fn write_variable(&self, owner: &str, repo: &str, name: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct VariableResponse {
    value: String,
}

/// Blocking GitHub API client authenticated with a bearer token.
///
/// Does not implement `Debug`; the token only lives in a sensitive header.
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_base: String,
}

impl GithubClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("activity-readme"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        if !token.trim().is_empty() {
            let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("invalid github authorization header")?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn variable_url(&self, owner: &str, repo: &str, name: &str) -> String {
        format!(
            "{}/repos/{owner}/{repo}/actions/variables/{name}",
            self.api_base
        )
    }
}

impl EventSource for GithubClient {
    #[instrument(skip_all, fields(username = %username, page_size = page_size))]
    fn fetch_user_events(&self, username: &str, page_size: u32) -> Result<Vec<RawEvent>> {
        let request = self
            .http
            .get(format!("{}/users/{username}/events", self.api_base))
            .query(&[("per_page", page_size.to_string())]);
        let events: Vec<RawEvent> = request_json("list user events", request)?;
        debug!(count = events.len(), "fetched user events");
        Ok(events)
    }
}

impl VariableStore for GithubClient {
    #[instrument(skip_all, fields(owner = %owner, repo = %repo, name = %name))]
    fn read_variable(&self, owner: &str, repo: &str, name: &str) -> Result<Option<String>> {
        let response = send(
            "read variable",
            self.http.get(self.variable_url(owner, repo, name)),
        )?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(name, "variable not found");
            return Ok(None);
        }
        let variable: VariableResponse = decode_json("read variable", response)?;
        Ok(Some(variable.value))
    }

    #[instrument(skip_all, fields(owner = %owner, repo = %repo, name = %name, bytes = value.len()))]
    fn write_variable(&self, owner: &str, repo: &str, name: &str, value: &str) -> Result<()> {
        let response = send(
            "update variable",
            self.http
                .patch(self.variable_url(owner, repo, name))
                .json(&json!({ "name": name, "value": value })),
        )?;
        if response.status() != StatusCode::NOT_FOUND {
            ensure_success("update variable", response)?;
            return Ok(());
        }

        debug!(name, "variable missing, creating");
        let response = send(
            "create variable",
            self.http
                .post(format!(
                    "{}/repos/{owner}/{repo}/actions/variables",
                    self.api_base
                ))
                .json(&json!({ "name": name, "value": value })),
        )?;
        ensure_success("create variable", response)?;
        Ok(())
    }
}

fn send(operation: &str, request: RequestBuilder) -> Result<Response> {
    request
        .send()
        .with_context(|| format!("github api {operation} request failed"))
}

fn request_json<T: DeserializeOwned>(operation: &str, request: RequestBuilder) -> Result<T> {
    let response = send(operation, request)?;
    decode_json(operation, response)
}

fn decode_json<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let response = ensure_success(operation, response)?;
    response
        .json::<T>()
        .with_context(|| format!("failed to decode github {operation}"))
}

fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    bail!(
        "github api {operation} failed with status {}: {}",
        status.as_u16(),
        truncate_for_error(&body, 800)
    );
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::new(&server.base_url(), "secret-token", Duration::from_secs(5))
            .expect("client")
    }

    #[test]
    fn fetch_user_events_sends_auth_and_page_size() {
        let server = MockServer::start();
        let events = server.mock(|when, then| {
            when.method(GET)
                .path("/users/octo/events")
                .query_param("per_page", "100")
                .header("authorization", "Bearer secret-token")
                .header("accept", "application/vnd.github+json");
            then.status(200).json_body(json!([
                {
                    "id": "1",
                    "type": "IssuesEvent",
                    "repo": { "name": "octo/hello" },
                    "payload": { "action": "opened", "issue": { "number": 4 } }
                },
                {
                    "id": "2",
                    "type": "WatchEvent",
                    "repo": { "name": "octo/other" },
                    "payload": { "action": "started" }
                }
            ]));
        });

        let fetched = client(&server)
            .fetch_user_events("octo", 100)
            .expect("fetch");
        events.assert_calls(1);
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[1].kind, "WatchEvent");
    }

    #[test]
    fn fetch_user_events_surfaces_http_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/ghost/events");
            then.status(404).body("{\"message\":\"Not Found\"}");
        });

        let err = client(&server)
            .fetch_user_events("ghost", 100)
            .expect_err("404");
        let message = format!("{err:#}");
        assert!(message.contains("status 404"), "{message}");
        assert!(!message.contains("secret-token"));
    }

    #[test]
    fn read_variable_returns_value_or_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/octo/actions/variables/ACTIVITY_EVENTS");
            then.status(200).json_body(json!({
                "name": "ACTIVITY_EVENTS",
                "value": "[]",
                "created_at": "2024-01-01T00:00:00Z"
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/octo/actions/variables/MISSING");
            then.status(404);
        });

        let gh = client(&server);
        assert_eq!(
            gh.read_variable("octo", "octo", "ACTIVITY_EVENTS")
                .expect("read"),
            Some("[]".to_string())
        );
        assert_eq!(
            gh.read_variable("octo", "octo", "MISSING").expect("read"),
            None
        );
    }

    #[test]
    fn write_variable_patches_existing() {
        let server = MockServer::start();
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/repos/octo/octo/actions/variables/ACTIVITY_EVENTS")
                .json_body(json!({ "name": "ACTIVITY_EVENTS", "value": "[1]" }));
            then.status(204);
        });

        client(&server)
            .write_variable("octo", "octo", "ACTIVITY_EVENTS", "[1]")
            .expect("write");
        patch.assert_calls(1);
    }

    #[test]
    fn write_variable_creates_missing() {
        let server = MockServer::start();
        let patch = server.mock(|when, then| {
            when.method(PATCH)
                .path("/repos/octo/octo/actions/variables/ACTIVITY_EVENTS");
            then.status(404);
        });
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/octo/octo/actions/variables")
                .json_body(json!({ "name": "ACTIVITY_EVENTS", "value": "[]" }));
            then.status(201);
        });

        client(&server)
            .write_variable("octo", "octo", "ACTIVITY_EVENTS", "[]")
            .expect("write");
        patch.assert_calls(1);
        create.assert_calls(1);
    }

    #[test]
    fn truncate_for_error_limits_chars() {
        assert_eq!(truncate_for_error("abcdef", 3), "abc...");
        assert_eq!(truncate_for_error("abc", 3), "abc");
    }
}
