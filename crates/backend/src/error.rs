use thiserror::Error;

/// Failure of a remote backend call.
///
/// The backend does not distinguish "forbidden" from "not found" or
/// "validation failed"; all of those arrive as [`BackendError::Rejected`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("no authenticated session")]
    Unauthenticated,

    #[error("network error: {0}")]
    Network(String),

    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not decode backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
