use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vcf_norm_core::contract::EventError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Download,
    Upload,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Download => "download",
            Self::Upload => "upload",
        })
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("malformed invocation: {0}")]
    MalformedEvent(#[from] EventError),
    #[error("object key `{0}` does not name a file")]
    KeyWithoutFileName(String),
    #[error("workspace {action} failed for {}: {source}", .path.display())]
    Workspace {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to {direction} s3://{bucket}/{key}: {message}")]
    Transfer {
        direction: TransferDirection,
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("bcftools norm failed ({exit}): {stderr}")]
    Normalisation { exit: String, stderr: String },
    #[error("bcftools norm reported success but wrote no output at {}", .path.display())]
    OutputMissing { path: PathBuf },
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) | Self::KeyWithoutFileName(_) => "malformed_event",
            Self::Workspace { .. } => "workspace_error",
            Self::Transfer { .. } => "transfer_error",
            Self::Spawn { .. } | Self::Normalisation { .. } | Self::OutputMissing { .. } => {
                "normalisation_error"
            }
            Self::Serialization(_) => "serialization_error",
        }
    }
}
