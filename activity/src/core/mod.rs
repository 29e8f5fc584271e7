//! Deterministic, pure logic shared by the activity updater.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod event;
pub mod format;
pub mod reconcile;
pub mod window;
