//! Rendering of activity events into README list entries.

use crate::core::event::{ActivityEvent, EventKind};

const URL_PREFIX: &str = "https://github.com";

/// Output flavour for links and list entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// `[label](url)` links and text glyphs.
    Markdown,
    /// `<a href>` links, `<img>` icons, entries wrapped in `<p align="left">`.
    Html,
}

impl RenderMode {
    /// Map the `HTML_ENCODING` input: only the literal `"false"` selects markdown.
    pub fn from_html_encoding(value: &str) -> Self {
        if value == "false" {
            Self::Markdown
        } else {
            Self::Html
        }
    }
}

/// Formatting options shared by every rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pub mode: RenderMode,
    /// Directory (relative to the README) holding the activity icons.
    pub icon_dir: String,
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn link(label: &str, url: &str, mode: RenderMode) -> String {
    match mode {
        RenderMode::Markdown => format!("[{label}]({url})"),
        RenderMode::Html => format!("<a href=\"{url}\">{label}</a>"),
    }
}

/// Link to a repository by its `owner/name`.
pub fn repo_link(repo: &str, mode: RenderMode) -> String {
    link(repo, &format!("{URL_PREFIX}/{repo}"), mode)
}

/// Link to the issue or pull request an event refers to.
pub fn target_link(event: &ActivityEvent, mode: RenderMode) -> String {
    let (segment, number) = match &event.kind {
        EventKind::IssueComment { issue } | EventKind::Issue { issue, .. } => ("issues", *issue),
        EventKind::PullRequest { number, .. } => ("pull", *number),
    };
    link(
        &format!("#{number}"),
        &format!("{URL_PREFIX}/{}/{segment}/{number}", event.repo),
        mode,
    )
}

impl Formatter {
    pub fn new(mode: RenderMode, icon_dir: impl Into<String>) -> Self {
        Self {
            mode,
            icon_dir: icon_dir.into(),
        }
    }

    /// Render one event as a single display line (without list numbering).
    ///
    /// Html mode leads with an icon whose alt text is the label; markdown mode
    /// uses the label itself.
    pub fn format_event(&self, event: &ActivityEvent) -> String {
        let (label, icon, noun) = match &event.kind {
            EventKind::IssueComment { .. } => (
                "Commented on".to_string(),
                "commented_on".to_string(),
                "Issue",
            ),
            EventKind::Issue { action, .. } => {
                (capitalize(action), format!("{action}_issue"), "Issue")
            }
            EventKind::PullRequest { merged: true, .. } => (
                "Merged".to_string(),
                "merged_pull_request".to_string(),
                "PR",
            ),
            EventKind::PullRequest { action, .. } => {
                (capitalize(action), format!("{action}_pull_request"), "PR")
            }
        };

        let target = target_link(event, self.mode);
        let repo = repo_link(&event.repo, self.mode);
        let lead = match self.mode {
            RenderMode::Markdown => label,
            RenderMode::Html => self.icon(&label, &icon),
        };
        format!("{lead} {noun} {target} in {repo}")
    }

    fn icon(&self, alt: &str, name: &str) -> String {
        format!(
            "<img alt=\"{alt}\" height=\"24px\" valign=\"bottom\" src=\"{}/{name}.png\">",
            self.icon_dir.trim_end_matches('/')
        )
    }

    /// Number the lines (1-indexed) and apply the per-entry wrapper.
    pub fn render_entries(&self, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .enumerate()
            .map(|(idx, line)| self.numbered(idx + 1, line))
            .collect()
    }

    fn numbered(&self, n: usize, line: &str) -> String {
        let entry = format!("{n}. {line}");
        match self.mode {
            RenderMode::Markdown => entry,
            RenderMode::Html => format!("<p align=\"left\">{entry}</p>"),
        }
    }

    /// Format and number a list of events.
    pub fn render_events(&self, events: &[ActivityEvent]) -> Vec<String> {
        let lines: Vec<String> = events.iter().map(|event| self.format_event(event)).collect();
        self.render_entries(&lines)
    }
}
