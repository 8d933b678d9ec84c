use thiserror::Error;

/// Failure while fetching or decoding one feed endpoint.
///
/// Carries the endpoint so the ingestion log names the broken source. These
/// are logged and counted at the scheduler; they never abort a cycle and
/// never propagate past it.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request itself failed (connect error, timeout, ...).
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    /// The body was not the expected feed envelope.
    #[error("could not decode feed envelope from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The endpoint this failure belongs to.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Http { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// The persistence layer was unreachable or rejected an operation.
///
/// Fatal to the current cycle's write step; the scheduler logs it and tries
/// again on the next tick.
#[derive(Error, Debug)]
#[error("store unavailable: {0}")]
pub struct StoreError(#[from] sqlx::Error);
