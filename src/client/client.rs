use tokio_stream::wrappers::ReceiverStream;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::channel::Channel;
use tonic::transport::ClientTlsConfig;
use tonic::{Request, Streaming};
use tracing::info;

use super::credentials::Credentials;
use crate::error::ClientError;
use crate::proto::streaming_video_analysis_service_client::StreamingVideoAnalysisServiceClient;
use crate::proto::{StreamingAnnotateVideoRequest, StreamingAnnotateVideoResponse};

/// Authenticated connection to the video analysis service.
pub struct AnnotateClient {
    client: StreamingVideoAnalysisServiceClient<Channel>,
    token: MetadataValue<Ascii>,
}

impl AnnotateClient {
    /// Connects to `endpoint` and prepares the bearer token. Any failure is
    /// terminal; there is no retry.
    pub async fn connect(endpoint: &str, credentials: &Credentials) -> Result<Self, ClientError> {
        let token = credentials.bearer()?;

        info!("connecting to video analysis service at {endpoint}");

        let mut builder = Channel::from_shared(endpoint.to_string()).map_err(|err| {
            ClientError::Configuration(format!("invalid endpoint '{endpoint}': {err}"))
        })?;

        if endpoint.starts_with("https://") {
            builder = builder.tls_config(ClientTlsConfig::new().with_native_roots())?;
        }

        let channel = builder.connect().await?;
        let client = StreamingVideoAnalysisServiceClient::new(channel);

        info!("connected");
        Ok(Self { client, token })
    }

    /// Opens the bidirectional streaming call. Everything pushed into
    /// `requests` goes out on the send half; the returned stream is the
    /// receive half.
    pub async fn streaming_annotate_video(
        &mut self,
        requests: ReceiverStream<StreamingAnnotateVideoRequest>,
    ) -> Result<Streaming<StreamingAnnotateVideoResponse>, ClientError> {
        let mut request = Request::new(requests);
        request
            .metadata_mut()
            .insert("authorization", self.token.clone());

        let response = self.client.streaming_annotate_video(request).await?;
        Ok(response.into_inner())
    }
}
