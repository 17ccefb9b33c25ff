//! Conversion of upstream HTTP answers into `ServiceResponse`

use application::{ApplicationError, ServiceResponse};
use serde_json::Value;
use tracing::debug;

/// Relay status and body of an upstream answer
///
/// Empty bodies become `null` and non-JSON bodies are passed on as a JSON
/// string, so the caller always sees what the upstream said.
pub(crate) async fn relay(
    service: &str,
    response: reqwest::Response,
) -> Result<ServiceResponse, ApplicationError> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(|e| transport_error(service, &e))?;

    let data = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            debug!(service, status, "Upstream answered with a non-JSON body");
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    Ok(ServiceResponse::new(status, data))
}

pub(crate) fn transport_error(service: &str, err: &reqwest::Error) -> ApplicationError {
    if err.is_timeout() {
        ApplicationError::Upstream(format!("{service} timed out"))
    } else {
        ApplicationError::Upstream(format!("{service} unreachable: {err}"))
    }
}
