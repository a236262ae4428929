//! Submission sink that writes the payload as pretty JSON.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use gatewalk::{SubmissionPayload, SubmissionSink};
use thiserror::Error;
use tracing::info;

/// Where submitted answers are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSink {
    Stdout,
    /// Created or truncated on each submission.
    File(PathBuf),
}

#[derive(Debug, Error)]
pub enum JsonSinkError {
    #[error("Could not create '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsonSink {
    fn write(writer: impl Write, payload: &SubmissionPayload) -> Result<(), JsonSinkError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, payload)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl SubmissionSink for JsonSink {
    type Error = JsonSinkError;

    fn submit(&self, payload: &SubmissionPayload) -> Result<(), Self::Error> {
        match self {
            JsonSink::Stdout => Self::write(io::stdout().lock(), payload)?,
            JsonSink::File(path) => {
                let file = File::create(path).map_err(|source| JsonSinkError::Create {
                    path: path.clone(),
                    source,
                })?;
                Self::write(file, payload)?;
                info!(path = %path.display(), fields = payload.len(), "answers written");
            }
        }
        Ok(())
    }
}
