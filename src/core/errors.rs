use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabookError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid backup file: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for VocabookError {
    fn from(error: std::io::Error) -> Self {
        VocabookError::Io(Box::new(error))
    }
}

/// Failures reported by the hosted backend or while talking to it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Http(Box<reqwest::Error>),

    #[error("Backend responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            StoreError::Decode(error.to_string())
        } else {
            StoreError::Http(Box::new(error))
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Decode(error.to_string())
    }
}

/// Failure handed from a background task to the UI. An expired session stays
/// distinguishable so the UI can end it instead of reporting every failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, TaskError::SessionExpired)
    }
}

impl From<StoreError> for TaskError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unauthenticated => TaskError::SessionExpired,
            other => TaskError::Failed(other.to_string()),
        }
    }
}

impl From<VocabookError> for TaskError {
    fn from(error: VocabookError) -> Self {
        match error {
            VocabookError::Store(store) => store.into(),
            other => TaskError::Failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_store_errors_expire_the_session() {
        assert!(TaskError::from(StoreError::Unauthenticated).is_session_expired());
        assert!(TaskError::from(VocabookError::Store(StoreError::Unauthenticated))
            .is_session_expired());

        let unavailable = StoreError::Status { status: 503, message: "down".to_string() };
        assert_eq!(
            TaskError::from(unavailable),
            TaskError::Failed("Backend responded with 503: down".to_string())
        );
        assert!(!TaskError::from(VocabookError::Parse("bad".to_string())).is_session_expired());
    }
}
