//! Updater configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, an optional TOML
//! file, GitHub Action inputs from the environment (`INPUT_*`), CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::format::{Formatter, RenderMode};

/// Environment variable holding the GitHub access token.
pub const TOKEN_ENV: &str = "ACCESS_TOKEN";

/// Updater configuration (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActivityConfig {
    /// Account whose activity is summarized; also owner and name of the
    /// repository holding the window variable.
    pub username: String,

    /// `false` renders markdown links, anything else renders html.
    pub html_encoding: bool,

    /// Used verbatim as the commit message.
    pub commit_message: String,

    /// Maximum number of events displayed and persisted.
    pub max_lines: usize,

    pub readme_path: PathBuf,

    /// Actions variable holding the persisted window.
    pub variable_name: String,

    pub api_base: String,

    /// `per_page` for the events request.
    pub page_size: u32,

    /// Icon directory referenced from the README in html mode.
    pub icon_dir: String,

    pub committer_name: String,
    pub committer_email: String,

    pub request_timeout_secs: u64,
    pub git_timeout_secs: u64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            html_encoding: true,
            commit_message: "⚡ Update README with the recent activity".to_string(),
            max_lines: 5,
            readme_path: PathBuf::from("README.md"),
            variable_name: "ACTIVITY_EVENTS".to_string(),
            api_base: "https://api.github.com".to_string(),
            page_size: 100,
            icon_dir: "./icons/activities".to_string(),
            committer_name: "readme-bot".to_string(),
            committer_email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
            request_timeout_secs: 30,
            git_timeout_secs: 120,
        }
    }
}

impl ActivityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!(
                "username must be set (config `username` or INPUT_GH_USERNAME)"
            ));
        }
        if self.commit_message.trim().is_empty() {
            return Err(anyhow!("commit_message must not be empty"));
        }
        if self.max_lines == 0 {
            return Err(anyhow!("max_lines must be > 0"));
        }
        if self.page_size == 0 || self.page_size > 100 {
            return Err(anyhow!("page_size must be within 1..=100"));
        }
        if self.variable_name.trim().is_empty() {
            return Err(anyhow!("variable_name must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.git_timeout_secs == 0 {
            return Err(anyhow!("git_timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Apply GitHub Action inputs (`INPUT_<NAME>`) found through `lookup`.
    ///
    /// Blank values are ignored so unset optional inputs keep their defaults.
    pub fn apply_action_inputs<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| {
            lookup(&format!("INPUT_{name}"))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(username) = input("GH_USERNAME") {
            self.username = username;
        }
        if let Some(encoding) = input("HTML_ENCODING") {
            self.html_encoding = RenderMode::from_html_encoding(&encoding) == RenderMode::Html;
        }
        if let Some(message) = input("COMMIT_MSG") {
            self.commit_message = message;
        }
        if let Some(max_lines) = input("MAX_LINES") {
            self.max_lines = max_lines
                .parse()
                .with_context(|| format!("INPUT_MAX_LINES must be an integer (got '{max_lines}')"))?;
        }
        if let Some(path) = input("README_PATH") {
            self.readme_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.html_encoding {
            RenderMode::Html
        } else {
            RenderMode::Markdown
        }
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.render_mode(), self.icon_dir.clone())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ActivityConfig::default()`. The result is
/// not validated: inputs from the environment are usually applied on top.
pub fn load_config(path: &Path) -> Result<ActivityConfig> {
    if !path.exists() {
        return Ok(ActivityConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ActivityConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ActivityConfig::default());
    }

    #[test]
    fn load_partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("activity.toml");
        fs::write(&path, "username = \"octo\"\nmax_lines = 10\nhtml_encoding = false\n")
            .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.username, "octo");
        assert_eq!(cfg.max_lines, 10);
        assert_eq!(cfg.render_mode(), RenderMode::Markdown);
        assert_eq!(cfg.variable_name, "ACTIVITY_EVENTS");
        cfg.validate().expect("valid");
    }

    #[test]
    fn action_inputs_override_file_values() {
        let mut cfg = ActivityConfig {
            username: "from-file".to_string(),
            ..ActivityConfig::default()
        };
        cfg.apply_action_inputs(lookup(&[
            ("INPUT_GH_USERNAME", "octo"),
            ("INPUT_HTML_ENCODING", "false"),
            ("INPUT_COMMIT_MSG", "docs: activity"),
            ("INPUT_MAX_LINES", " 7 "),
        ]))
        .expect("apply");

        assert_eq!(cfg.username, "octo");
        assert!(!cfg.html_encoding);
        assert_eq!(cfg.commit_message, "docs: activity");
        assert_eq!(cfg.max_lines, 7);
    }

    #[test]
    fn any_non_false_encoding_selects_html() {
        let mut cfg = ActivityConfig {
            html_encoding: false,
            ..ActivityConfig::default()
        };
        cfg.apply_action_inputs(lookup(&[("INPUT_HTML_ENCODING", "yes")]))
            .expect("apply");
        assert_eq!(cfg.render_mode(), RenderMode::Html);
    }

    #[test]
    fn blank_inputs_are_ignored() {
        let mut cfg = ActivityConfig::default();
        cfg.apply_action_inputs(lookup(&[("INPUT_MAX_LINES", "  "), ("INPUT_GH_USERNAME", "")]))
            .expect("apply");
        assert_eq!(cfg, ActivityConfig::default());
    }

    #[test]
    fn invalid_max_lines_input_is_rejected() {
        let mut cfg = ActivityConfig::default();
        let err = cfg
            .apply_action_inputs(lookup(&[("INPUT_MAX_LINES", "five")]))
            .expect_err("invalid");
        assert!(format!("{err:#}").contains("INPUT_MAX_LINES"));
    }

    #[test]
    fn validate_requires_username() {
        let err = ActivityConfig::default().validate().expect_err("no username");
        assert!(err.to_string().contains("username"));
    }
}
