use serde::{Serialize, Deserialize};

/// Body of every non-2xx JSON response the API returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self { error: error.into(), status }
    }
}
