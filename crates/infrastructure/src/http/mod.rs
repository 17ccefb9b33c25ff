//! Outbound HTTP with request correlation
//!
//! Every upstream call made on behalf of an inbound request carries that
//! request's `X-Request-Id`, so the gateway log and the upstream logs can be
//! joined.

mod correlated_client;

pub use correlated_client::{
    CorrelatedClientConfig, CorrelatedHttpClient, CorrelatedRequestBuilder, RequestIdProvider,
    X_REQUEST_ID,
};
