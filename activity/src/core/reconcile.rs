//! Reconciliation of the marked activity section of a README.
//!
//! The document is treated as a sequence of `\n`-separated lines. Only the lines
//! strictly between the start and end markers are ever replaced; everything else
//! is carried over verbatim, so splitting and re-joining leaves untouched bytes
//! (including a trailing newline or `\r` line endings) intact.
//!
//! The new document is always assembled as `before ++ region ++ after` rather
//! than by splicing at computed offsets.

use std::fmt;

pub const START_MARKER: &str = "<!--START_SECTION:activity-->";
pub const END_MARKER: &str = "<!--END_SECTION:activity-->";

/// Marker line positions within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub start: usize,
    /// First end marker after `start`, if any.
    pub end: Option<usize>,
}

/// The document has no start marker, so there is nothing to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingStartMarker;

impl fmt::Display for MissingStartMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "couldn't find the {START_MARKER} comment")
    }
}

impl std::error::Error for MissingStartMarker {}

/// Outcome of reconciling a document with a rendered entry list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The end marker was missing; entries and a new end marker follow the start marker.
    Inserted(String),
    /// The section existed but was empty and now holds the entries.
    Filled(String),
    /// An existing section was rewritten in place.
    Replaced(String),
    /// The section already lists exactly these entries.
    Unchanged,
}

impl Reconciliation {
    /// The updated document, or `None` when nothing changed.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Inserted(doc) | Self::Filled(doc) | Self::Replaced(doc) => Some(doc),
            Self::Unchanged => None,
        }
    }
}

/// Find the start marker and the first end marker after it.
pub fn locate_markers(lines: &[&str]) -> Option<Markers> {
    let start = lines.iter().position(|line| line.trim() == START_MARKER)?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim() == END_MARKER)
        .map(|offset| start + 1 + offset);
    Some(Markers { start, end })
}

/// Compute the document whose activity section lists exactly `entries`.
///
/// `entries` are final lines (already numbered and wrapped).
pub fn reconcile(document: &str, entries: &[String]) -> Result<Reconciliation, MissingStartMarker> {
    let lines: Vec<&str> = document.split('\n').collect();
    let markers = locate_markers(&lines).ok_or(MissingStartMarker)?;
    let before = &lines[..=markers.start];
    let eol = line_ending(lines[markers.start]);

    let Some(end) = markers.end else {
        let mut region = leading_entries(entries, eol);
        region.push(format!("{END_MARKER}{eol}"));
        let updated = assemble(before, &region, &lines[markers.start + 1..]);
        return Ok(Reconciliation::Inserted(updated));
    };

    let existing = &lines[markers.start + 1..end];
    let current: Vec<&str> = existing.iter().copied().map(strip_cr).collect();
    if current.join("\n").trim() == entries.join("\n").trim() {
        return Ok(Reconciliation::Unchanged);
    }

    let after = &lines[end..];
    let (region, filled) = if existing.is_empty() {
        (leading_entries(entries, eol), true)
    } else {
        (replace_region(existing, entries, eol), false)
    };
    let updated = assemble(before, &region, after);

    if updated == document {
        Ok(Reconciliation::Unchanged)
    } else if filled {
        Ok(Reconciliation::Filled(updated))
    } else {
        Ok(Reconciliation::Replaced(updated))
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// `"\r"` for a CRLF line, empty otherwise.
fn line_ending(line: &str) -> &'static str {
    if line.ends_with('\r') { "\r" } else { "" }
}

/// Entries up to (not including) the first empty one.
fn leading_entries(entries: &[String], eol: &str) -> Vec<String> {
    entries
        .iter()
        .take_while(|entry| !entry.is_empty())
        .map(|entry| format!("{entry}{eol}"))
        .collect()
}

/// Overwrite non-blank lines in order; blank lines stay put and consume no entry.
///
/// Surplus old lines are dropped and surplus entries are appended, so the region
/// ends up listing exactly `entries`. Overwritten lines keep their own line
/// ending; appended ones take `eol`.
fn replace_region(existing: &[&str], entries: &[String], eol: &str) -> Vec<String> {
    let mut next = entries.iter();
    let mut region = Vec::with_capacity(existing.len().max(entries.len()));
    for line in existing {
        if line.trim().is_empty() {
            region.push((*line).to_string());
            continue;
        }
        if let Some(entry) = next.next() {
            region.push(format!("{entry}{}", line_ending(line)));
        }
    }
    region.extend(next.map(|entry| format!("{entry}{eol}")));
    region
}

fn assemble(before: &[&str], region: &[String], after: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(before.len() + region.len() + after.len());
    out.extend_from_slice(before);
    out.extend(region.iter().map(String::as_str));
    out.extend_from_slice(after);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn doc(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn missing_start_marker_is_an_error() {
        let input = doc(&["# Hi", END_MARKER, ""]);
        assert_eq!(reconcile(&input, &entries(&["1. a"])), Err(MissingStartMarker));
    }

    #[test]
    fn start_without_end_inserts_entries_and_end_marker() {
        let input = doc(&["# Hi", START_MARKER, "footer", ""]);
        let result = reconcile(&input, &entries(&["1. a", "2. b", "3. c"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Inserted(doc(&[
                "# Hi",
                START_MARKER,
                "1. a",
                "2. b",
                "3. c",
                END_MARKER,
                "footer",
                ""
            ]))
        );
    }

    #[test]
    fn markers_match_after_trimming() {
        let input = doc(&["  <!--START_SECTION:activity-->  ", "\t<!--END_SECTION:activity-->"]);
        let result = reconcile(&input, &entries(&["1. a"])).expect("reconcile");
        assert_eq!(
            result.document(),
            Some(
                doc(&[
                    "  <!--START_SECTION:activity-->  ",
                    "1. a",
                    "\t<!--END_SECTION:activity-->"
                ])
                .as_str()
            )
        );
    }

    #[test]
    fn empty_section_is_filled() {
        let input = doc(&["top", START_MARKER, END_MARKER, "bottom"]);
        let result = reconcile(&input, &entries(&["1. a", "2. b"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Filled(doc(&["top", START_MARKER, "1. a", "2. b", END_MARKER, "bottom"]))
        );
    }

    #[test]
    fn fill_stops_at_first_empty_entry() {
        let input = doc(&[START_MARKER, END_MARKER]);
        let result = reconcile(&input, &entries(&["1. a", "", "3. c"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Filled(doc(&[START_MARKER, "1. a", END_MARKER]))
        );
    }

    #[test]
    fn populated_section_is_overwritten_in_place() {
        let input = doc(&["top", START_MARKER, "1. old a", "2. old b", END_MARKER, "bottom"]);
        let result = reconcile(&input, &entries(&["1. new a", "2. new b"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Replaced(doc(&[
                "top",
                START_MARKER,
                "1. new a",
                "2. new b",
                END_MARKER,
                "bottom"
            ]))
        );
    }

    #[test]
    fn blank_lines_inside_section_are_preserved() {
        let input = doc(&[START_MARKER, "", "1. old", "", "2. old", END_MARKER]);
        let result = reconcile(&input, &entries(&["1. x", "2. y"])).expect("reconcile");
        assert_eq!(
            result.document(),
            Some(doc(&[START_MARKER, "", "1. x", "", "2. y", END_MARKER]).as_str())
        );
    }

    #[test]
    fn stale_lines_beyond_new_entries_are_dropped() {
        let input = doc(&[START_MARKER, "1. a", "2. b", "3. c", END_MARKER, "tail"]);
        let result = reconcile(&input, &entries(&["1. z"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Replaced(doc(&[START_MARKER, "1. z", END_MARKER, "tail"]))
        );
    }

    #[test]
    fn extra_entries_are_appended_to_region() {
        let input = doc(&[START_MARKER, "1. a", "", END_MARKER]);
        let result = reconcile(&input, &entries(&["1. x", "2. y", "3. z"])).expect("reconcile");
        assert_eq!(
            result.document(),
            Some(doc(&[START_MARKER, "1. x", "", "2. y", "3. z", END_MARKER]).as_str())
        );
    }

    #[test]
    fn identical_section_is_unchanged() {
        let input = doc(&["top", START_MARKER, "1. a", "2. b", END_MARKER, ""]);
        let result = reconcile(&input, &entries(&["1. a", "2. b"])).expect("reconcile");
        assert_eq!(result, Reconciliation::Unchanged);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let input = doc(&["top", START_MARKER, "", "1. old", "", END_MARKER, "\r"]);
        let new = entries(&["1. a", "2. b"]);
        let first = reconcile(&input, &new).expect("first");
        let updated = first.document().expect("changed").to_string();

        assert_eq!(reconcile(&updated, &new).expect("second"), Reconciliation::Unchanged);
    }

    #[test]
    fn crlf_section_with_same_entries_is_unchanged() {
        let input = format!("{START_MARKER}\r\n1. a\r\n2. b\r\n{END_MARKER}\r\n");
        let result = reconcile(&input, &entries(&["1. a", "2. b"])).expect("reconcile");
        assert_eq!(result, Reconciliation::Unchanged);
    }

    #[test]
    fn crlf_line_endings_survive_replacement() {
        let input = format!("{START_MARKER}\r\n1. old\r\n{END_MARKER}\r\n");
        let new = entries(&["1. a", "2. b"]);
        let result = reconcile(&input, &new).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Replaced(format!(
                "{START_MARKER}\r\n1. a\r\n2. b\r\n{END_MARKER}\r\n"
            ))
        );

        let updated = result.document().expect("changed").to_string();
        assert_eq!(reconcile(&updated, &new).expect("second"), Reconciliation::Unchanged);
    }

    #[test]
    fn crlf_insert_uses_start_line_ending() {
        let input = format!("{START_MARKER}\r\nfooter\r\n");
        let result = reconcile(&input, &entries(&["1. a"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Inserted(format!(
                "{START_MARKER}\r\n1. a\r\n{END_MARKER}\r\nfooter\r\n"
            ))
        );
    }

    #[test]
    fn end_marker_before_start_is_ignored() {
        let input = doc(&[END_MARKER, START_MARKER, "rest"]);
        let result = reconcile(&input, &entries(&["1. a"])).expect("reconcile");
        assert_eq!(
            result,
            Reconciliation::Inserted(doc(&[END_MARKER, START_MARKER, "1. a", END_MARKER, "rest"]))
        );
    }

    #[test]
    fn locate_markers_reports_positions() {
        let lines = vec!["x", START_MARKER, "y", END_MARKER];
        assert_eq!(
            locate_markers(&lines),
            Some(Markers {
                start: 1,
                end: Some(3)
            })
        );
        assert_eq!(locate_markers(&["x"]), None);
    }
}
