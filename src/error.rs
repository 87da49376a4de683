use std::path::PathBuf;

/// Result type for transcript operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the transcript pipeline
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    VideoUnavailable(String),

    #[error("Audio download failed: {0}")]
    Download(String),

    #[error("Audio file not found: {}", path.display())]
    AudioNotFound { path: PathBuf },

    #[error("Audio file required for Whisper transcription")]
    AudioPathRequired,

    #[error("Whisper model could not be loaded: {0}")]
    ModelLoad(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
