use std::path::Path;

use serde::Deserialize;
use tonic::metadata::{Ascii, MetadataValue};

use crate::error::ClientError;

/// Credentials file contents: a JSON document carrying the bearer token
/// presented on the streaming call.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub async fn load(path: &Path) -> Result<Self, ClientError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            ClientError::Configuration(format!(
                "cannot read credentials file '{}': {err}",
                path.display()
            ))
        })?;

        let credentials: Credentials = serde_json::from_str(&raw).map_err(|err| {
            ClientError::Auth(format!(
                "malformed credentials file '{}': {err}",
                path.display()
            ))
        })?;

        if credentials.token.is_empty() {
            return Err(ClientError::Auth(format!(
                "credentials file '{}' has an empty token",
                path.display()
            )));
        }

        Ok(credentials)
    }

    /// The `authorization` metadata value for the streaming call.
    pub fn bearer(&self) -> Result<MetadataValue<Ascii>, ClientError> {
        format!("Bearer {}", self.token).parse().map_err(|_| {
            ClientError::Auth("token contains characters not valid in a gRPC header".into())
        })
    }
}
