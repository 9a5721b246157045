pub mod cli;
pub mod client;
pub mod error;
pub mod session;
pub mod sink;

pub mod proto {
    tonic::include_proto!("videoanalysis");
}

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::cli::{Args, Config};
use crate::client::{AnnotateClient, Credentials};
use crate::error::ClientError;
use crate::sink::Sinks;

/// Runs one streaming session end to end: validate flags, connect, send the
/// configuration, upload content concurrently and drain responses. Returns
/// Ok only when the service closes the response stream cleanly and the
/// uploader finished without error.
pub async fn run(args: Args) -> Result<(), ClientError> {
    let config = Config::load(args).await?;
    let credentials = Credentials::load(&config.credentials_path).await?;

    let mut client = AnnotateClient::connect(&config.endpoint, &credentials).await?;

    let (tx, rx) = mpsc::channel(session::CHANNEL_SIZE);
    let responses = client
        .streaming_annotate_video(ReceiverStream::new(rx))
        .await?;

    let video_config = config.video_config();
    let uploader = session::spawn_uploader(tx, video_config, config.source.into_reader());
    let mut sinks = Sinks::from_config(config.stdout, config.export);

    let consumed = session::consume_responses(responses, &mut sinks).await;

    // A dead upload side usually surfaces on the receive path as a secondary
    // transport error; prefer the uploader's own failure as the root cause.
    let uploaded = if uploader.is_finished() {
        uploader.await?
    } else {
        uploader.abort();
        Ok(())
    };
    uploaded.and(consumed)?;

    info!("analysis complete, stream closed by the service");
    Ok(())
}
