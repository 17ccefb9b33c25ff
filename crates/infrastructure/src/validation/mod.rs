//! Configuration validation module
//!
//! Security checks run once at startup.

pub mod security;

pub use security::{SecurityValidator, SecurityWarning, WarningSeverity};
