use thiserror::Error;

pub const INVALID_FORM_MESSAGE: &str = "Invalid form data.";
pub const PHOTO_PROCESSING_MESSAGE: &str = "Failed to process photo.";

/// Errors surfaced at the claim submission boundary.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Media processing failed: {0}")]
    MediaProcessing(String),

    #[error("Verification failed: {0}")]
    Verification(#[from] ModelError),
}

impl ClaimError {
    /// The text shown to the person submitting the claim.
    pub fn user_message(&self) -> String {
        match self {
            ClaimError::InvalidInput(_) => INVALID_FORM_MESSAGE.to_string(),
            ClaimError::MediaProcessing(_) => PHOTO_PROCESSING_MESSAGE.to_string(),
            ClaimError::Verification(e) => format!("AI Verification Failed: {}", e),
        }
    }
}

/// Failures of the language-model collaborator.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM API request failed: {0}")]
    Status(u16),

    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    #[error("LLM output does not match the decision schema: {0}")]
    MalformedOutput(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Request(err.to_string())
    }
}

/// Failures of the geofence and presence collaborators.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}
