//! Status and body returned by an external service call

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream answer, written back to the caller verbatim by controllers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub status: u16,
    pub data: Value,
}

impl ServiceResponse {
    pub const fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// 200 with the given body
    pub const fn ok(data: Value) -> Self {
        Self::new(200, data)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
