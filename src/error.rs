use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the session logging subsystem.
///
/// Only the loud failure modes appear here: a missing session directory at
/// startup, a payload that cannot be structurally encoded, and artifact
/// writes that were explicitly requested by the caller. Flush I/O failures
/// are deliberately absent — a failed flush drops its batch and is reported
/// through the logging facade instead of propagating (see
/// `SessionLogger::flush`).
#[derive(Debug, Error)]
pub enum SessionLogError {
    /// The session output directory could not be created at startup.
    /// The logger cannot function without it.
    #[error("failed to create session directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A payload could not be structurally encoded. This indicates a defect
    /// in the payload type or the encoder registry, not a transient
    /// condition.
    #[error("failed to encode payload as structured text")]
    Encode(#[from] serde_json::Error),

    /// An explicitly requested artifact (structured document) could not be
    /// written.
    #[error("failed to save artifact {path}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An explicitly requested image artifact could not be encoded or
    /// written.
    #[error("failed to save image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
