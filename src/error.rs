use thiserror::Error;

/// Top-level failure of a meeting analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("images ({mime}) are not supported; use audio, video, or text")]
    UnsupportedImage { mime: String },
    #[error("unsupported format: {mime}")]
    UnsupportedFormat { mime: String },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure of a single generateContent exchange. Carries the HTTP status
/// when the endpoint answered at all; transport-level failures have none.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub status: Option<u16>,
    pub message: String,
}

impl GenerationError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Transient failures worth another attempt: rate limiting (429),
    /// overload (503), or a message carrying the transient-network markers
    /// the upstream SDKs embed in their error strings.
    pub fn is_retryable(&self) -> bool {
        if matches!(self.status, Some(429) | Some(503)) {
            return true;
        }
        self.message.contains("429")
            || self.message.contains("Network")
            || self.message.contains("Failed to fetch")
    }
}

/// Failure to turn a generateContent payload into meeting minutes.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response carried no recognizable text payload")]
    MissingText,
    #[error("response text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response JSON is missing required field `{0}`")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_overload_statuses_are_retryable() {
        assert!(GenerationError::status(429, "too many requests").is_retryable());
        assert!(GenerationError::status(503, "overloaded").is_retryable());
        assert!(!GenerationError::status(400, "bad request").is_retryable());
        assert!(!GenerationError::status(401, "unauthorized").is_retryable());
        assert!(!GenerationError::status(500, "internal failure").is_retryable());
    }

    #[test]
    fn message_markers_are_retryable_without_a_status() {
        assert!(GenerationError::network("Network error calling generateContent").is_retryable());
        assert!(GenerationError::network("TypeError: Failed to fetch").is_retryable());
        assert!(GenerationError::network("quota exhausted (429)").is_retryable());
        assert!(!GenerationError::network("invalid request payload").is_retryable());
    }

    #[test]
    fn marker_in_message_retries_even_with_fatal_status() {
        // A 500 whose body echoes an upstream 429 still counts as transient.
        let err = GenerationError::status(500, "upstream returned 429");
        assert!(err.is_retryable());
    }

    #[test]
    fn analysis_error_preserves_underlying_messages() {
        let generation: AnalysisError = GenerationError::status(400, "bad request").into();
        assert_eq!(generation.to_string(), "bad request");
        let parse: AnalysisError = ParseError::MissingField("quickSummary").into();
        assert!(parse.to_string().contains("quickSummary"));
    }
}
