use thiserror::Error;

/// Terminal error classes of a streaming session. Nothing is retried;
/// every variant ends the session and is reported once by the binary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid credentials: {0}")]
    Auth(String),

    #[error("failed to connect to the video analysis service: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("stream transport failure: {0}")]
    Transport(#[from] tonic::Status),

    #[error("failed to read video source: {0}")]
    Source(#[source] std::io::Error),

    #[error("failed to write annotation results: {0}")]
    Sink(#[source] std::io::Error),

    #[error("failed to serialize annotation response: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ClientError {
    /// Exit code the top-level handler maps this error to.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Configuration(_) => 2,
            _ => 1,
        }
    }
}
