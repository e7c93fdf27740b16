use thiserror::Error;

#[derive(Debug, Error)]
pub enum FillError {
    /// Credentials or config file missing, unreadable or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A call came back with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// A successful response lacked a field, header or structure the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FillError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        FillError::Protocol(msg.into())
    }

    pub async fn from_response(response: reqwest::Response) -> FillError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read response text".to_string());
        FillError::Http { status, message }
    }
}

/// Pass a successful response through, or turn a non-success one into [`FillError::Http`].
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FillError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FillError::from_response(response).await)
    }
}
