use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::error::ClientError;
use crate::proto::streaming_annotate_video_request::StreamingRequest;
use crate::proto::{
    StreamingAnnotateVideoRequest, StreamingAnnotateVideoResponse, StreamingVideoConfig,
};
use crate::sink::Sinks;

pub const CHANNEL_SIZE: usize = 10;
pub const CHUNK_SIZE_BYTES: usize = 1024 * 1024; // 1 MiB

pub fn configuration_request(config: StreamingVideoConfig) -> StreamingAnnotateVideoRequest {
    StreamingAnnotateVideoRequest {
        streaming_request: Some(StreamingRequest::VideoConfig(config)),
    }
}

pub fn content_request(chunk: Vec<u8>) -> StreamingAnnotateVideoRequest {
    StreamingAnnotateVideoRequest {
        streaming_request: Some(StreamingRequest::InputContent(chunk)),
    }
}

/// Spawns the upload half of the session. The configuration message goes out
/// first, then one content chunk per source read. A zero-byte read means the
/// source is exhausted: the task returns and dropping the sender half-closes
/// the request stream so the service can finish the analysis.
pub fn spawn_uploader<R>(
    tx: mpsc::Sender<StreamingAnnotateVideoRequest>,
    config: StreamingVideoConfig,
    mut source: R,
) -> JoinHandle<Result<(), ClientError>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        info!("sending configuration");
        if tx.send(configuration_request(config)).await.is_err() {
            return Ok(());
        }

        info!("streaming video content");
        let mut buf = vec![0u8; CHUNK_SIZE_BYTES];
        loop {
            let n = source.read(&mut buf).await.map_err(ClientError::Source)?;
            if n == 0 {
                info!("end of video source, closing the upload side");
                break;
            }
            if tx.send(content_request(buf[..n].to_vec())).await.is_err() {
                break;
            }
        }
        Ok(())
    })
}

/// Drains the response stream, appending each response as one JSON line to
/// the sinks. Returns Ok only when the service closes the stream cleanly; a
/// status error is terminal for the session.
pub async fn consume_responses<S, W>(
    mut responses: S,
    sinks: &mut Sinks<W>,
) -> Result<(), ClientError>
where
    S: Stream<Item = Result<StreamingAnnotateVideoResponse, tonic::Status>> + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.next().await {
        let response = response?;
        let line = serde_json::to_string(&response)?;
        sinks.write_line(&line).await?;
    }
    Ok(())
}
