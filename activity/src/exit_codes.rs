//! Stable exit codes for the `activity` CLI.

/// README written, updated, or already up to date.
pub const OK: i32 = 0;
/// Run failed (config, network, IO, or git error).
pub const ERROR: i32 = 1;
/// No supported activity was found for the user.
pub const NO_ACTIVITY: i32 = 2;
/// The README has no `<!--START_SECTION:activity-->` line.
pub const MISSING_START_MARKER: i32 = 3;
