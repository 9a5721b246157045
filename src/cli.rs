use std::path::PathBuf;

use clap::Parser;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncRead;
use tracing::info;

use crate::error::ClientError;
use crate::proto::{StreamingFeature, StreamingStorageConfig, StreamingVideoConfig};

pub const DEFAULT_ENDPOINT: &str = "https://videoanalysis.googleapis.com";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Service account JSON key file path
    #[arg(long)]
    pub creds: PathBuf,

    /// Use a file as the video source instead of stdin
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Streaming analysis feature to request, e.g. STREAMING_LABEL_DETECTION
    #[arg(long)]
    pub feature: String,

    /// Storage URI where the service stores all annotation results
    #[arg(long)]
    pub gcs: Option<String>,

    /// Print annotation results to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Append annotation results to this file, one JSON line per response
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// gRPC endpoint of the video analysis service
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

/// Where the raw video bytes come from. Decided once per invocation.
#[derive(Debug)]
pub enum VideoSource {
    File(File),
    Stdin,
}

impl VideoSource {
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        match self {
            VideoSource::File(file) => Box::new(file),
            VideoSource::Stdin => Box::new(tokio::io::stdin()),
        }
    }
}

/// Validated session configuration with all file handles opened eagerly.
#[derive(Debug)]
pub struct Config {
    pub credentials_path: PathBuf,
    pub endpoint: String,
    pub feature: StreamingFeature,
    pub storage: Option<String>,
    pub source: VideoSource,
    pub stdout: bool,
    pub export: Option<File>,
}

impl Config {
    /// Validates flags and opens every file handle up front. Any failure
    /// here surfaces before a connection is attempted.
    pub async fn load(args: Args) -> Result<Self, ClientError> {
        // Readability check only; the contents are parsed at connect time.
        File::open(&args.creds).await.map_err(|err| {
            ClientError::Configuration(format!(
                "cannot open credentials file '{}': {err}",
                args.creds.display()
            ))
        })?;

        let source = match &args.source {
            Some(path) => {
                let file = File::open(path).await.map_err(|err| {
                    ClientError::Configuration(format!(
                        "cannot open video source '{}': {err}",
                        path.display()
                    ))
                })?;
                VideoSource::File(file)
            }
            None => VideoSource::Stdin,
        };

        let export = match &args.export {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(|err| {
                        ClientError::Configuration(format!(
                            "cannot open export file '{}' for appending: {err}",
                            path.display()
                        ))
                    })?;
                Some(file)
            }
            None => None,
        };

        if !args.stdout && export.is_none() && args.gcs.is_none() {
            return Err(ClientError::Configuration(
                "nothing to do: enable at least one of --stdout, --export or --gcs".into(),
            ));
        }

        let feature = StreamingFeature::from_str_name(&args.feature)
            .filter(|feature| *feature != StreamingFeature::Unspecified)
            .ok_or_else(|| {
                ClientError::Configuration(format!("unknown streaming feature '{}'", args.feature))
            })?;

        if let Some(gcs) = &args.gcs {
            info!("annotation results will be stored to {gcs}");
        }

        Ok(Self {
            credentials_path: args.creds,
            endpoint: args.endpoint,
            feature,
            storage: args.gcs,
            source,
            stdout: args.stdout,
            export,
        })
    }

    /// The one-time control message sent on the stream before any content.
    pub fn video_config(&self) -> StreamingVideoConfig {
        StreamingVideoConfig {
            feature: self.feature as i32,
            storage_config: Some(StreamingStorageConfig {
                enable_storage_annotation_result: self.storage.is_some(),
                annotation_result_storage_directory: self.storage.clone().unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn base_args(creds: PathBuf) -> Args {
        Args {
            creds,
            source: None,
            feature: "STREAMING_LABEL_DETECTION".into(),
            gcs: None,
            stdout: true,
            export: None,
            endpoint: DEFAULT_ENDPOINT.into(),
        }
    }

    fn creds_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("creds.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"token":"secret"}"#).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_credentials_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = base_args(dir.path().join("absent.json"));

        let err = Config::load(args).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn missing_source_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.source = Some(dir.path().join("absent.mp4"));

        let err = Config::load(args).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn unwritable_export_path_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.export = Some(dir.path().join("missing").join("out.jsonl"));

        let err = Config::load(args).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn unknown_feature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.feature = "STREAMING_MIND_READING".into();

        let err = Config::load(args).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn unspecified_feature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.feature = "STREAMING_FEATURE_UNSPECIFIED".into();

        assert!(Config::load(args).await.is_err());
    }

    #[tokio::test]
    async fn no_output_sink_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.stdout = false;

        let err = Config::load(args).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)), "{err}");
    }

    #[tokio::test]
    async fn storage_uri_alone_counts_as_a_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = base_args(creds_file(&dir));
        args.stdout = false;
        args.gcs = Some("gs://bucket/results".into());

        let config = Config::load(args).await.unwrap();
        let video_config = config.video_config();
        let storage = video_config.storage_config.unwrap();
        assert!(storage.enable_storage_annotation_result);
        assert_eq!(storage.annotation_result_storage_directory, "gs://bucket/results");
    }

    #[tokio::test]
    async fn valid_flags_open_handles_and_parse_the_feature() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("clip.raw");
        std::fs::write(&source_path, b"frames").unwrap();

        let mut args = base_args(creds_file(&dir));
        args.source = Some(source_path);
        args.export = Some(dir.path().join("out.jsonl"));

        let config = Config::load(args).await.unwrap();
        assert_eq!(config.feature, StreamingFeature::StreamingLabelDetection);
        assert!(config.export.is_some());
        assert!(matches!(config.source, VideoSource::File(_)));

        let storage = config.video_config().storage_config.unwrap();
        assert!(!storage.enable_storage_annotation_result);
    }
}
