//! I/O adapters for the updater: config, GitHub API, README file, git.

pub mod config;
pub mod git;
pub mod github;
pub mod process;
pub mod readme;
pub mod window_store;
