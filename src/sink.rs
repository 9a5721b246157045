use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::error::ClientError;

/// Local destinations for serialized annotation responses. The export file
/// is written before stdout so a tail of the file never runs ahead of the
/// mirrored output.
pub struct Sinks<W> {
    out: Option<W>,
    export: Option<File>,
}

impl Sinks<Stdout> {
    pub fn from_config(stdout: bool, export: Option<File>) -> Self {
        Self {
            out: stdout.then(tokio::io::stdout),
            export,
        }
    }
}

impl<W: AsyncWrite + Unpin> Sinks<W> {
    pub fn new(out: Option<W>, export: Option<File>) -> Self {
        Self { out, export }
    }

    /// Appends one serialized response to every enabled sink.
    pub async fn write_line(&mut self, line: &str) -> Result<(), ClientError> {
        if let Some(file) = &mut self.export {
            file.write_all(line.as_bytes())
                .await
                .map_err(ClientError::Sink)?;
            file.write_all(b"\n").await.map_err(ClientError::Sink)?;
            file.flush().await.map_err(ClientError::Sink)?;
        }

        if let Some(out) = &mut self.out {
            out.write_all(line.as_bytes())
                .await
                .map_err(ClientError::Sink)?;
            out.write_all(b"\n").await.map_err(ClientError::Sink)?;
            out.flush().await.map_err(ClientError::Sink)?;
        }

        Ok(())
    }
}
