/// How a failed fetch is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or a non-success status other than a missing student.
    TransportOrServer,
    /// The recommendation lookup reported that the student does not exist.
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("student {student_id} not found")]
    NotFound { student_id: String },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::TransportOrServer,
        }
    }
}
