//! Domain entities

mod log_entry;
mod token_payload;

pub use log_entry::{LogEntry, LogLevel, matches_search_text};
pub use token_payload::{RESERVED_CLAIMS, SessionClaims, TokenPayload};
