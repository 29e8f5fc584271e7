//! Keeps a "recent activity" section of a profile README in sync with a user's
//! GitHub events.
//!
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (event model, window selection,
//!   rendering, README section reconciliation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (GitHub API, README file, git).
//!   Behind traits where the run needs to swap them out in tests.
//!
//! [`run`] coordinates core logic with I/O to implement the CLI command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
