use thiserror::Error;

/// Failures that abort building a site package or writing a report.
///
/// Single bad samples never surface here: they are dropped by the adapter and
/// missing values flow through the pipeline as `None`.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Transport failure, timeout or non-success status from an upstream endpoint.
    #[error("source unavailable ({endpoint}): {message}")]
    SourceUnavailable { endpoint: String, message: String },

    /// Upstream answered, but the top-level document could not be decoded.
    #[error("malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("report rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    pub fn unavailable(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::SourceUnavailable {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}
