use thiserror::Error;

/// Failures at the backend boundary. Workflow cells wrap this in their own
/// error enums; validation errors never reach this layer because they block
/// before a request is issued.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure: connection refused, DNS, bounded timeout.
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response. The message is the backend's human-readable
    /// `message` field when present, otherwise a generic failure string.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The body did not match the expected schema.
    #[error("malformed response from backend: {0}")]
    Decode(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_)) || matches!(self, ApiError::Api { status: 404, .. })
    }
}
