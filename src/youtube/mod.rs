//! YouTube collaborators: identifier resolution, yt-dlp, and captions.

pub mod captions;
pub mod url;
pub mod ytdlp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use captions::{CaptionError, CaptionFetcher, CaptionLookup, CaptionSource, CaptionTrack, InnertubeCaptions};
pub use self::url::resolve_video_id;
pub use ytdlp::YtDlp;

/// Length of a YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Accept a bare identifier if it has the right shape
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == VIDEO_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video metadata with defaults for anything the extractor omits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    /// Duration in whole seconds
    pub duration: u64,
    pub thumbnail: String,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            channel: "Unknown".to_string(),
            duration: 0,
            thumbnail: String::new(),
        }
    }
}

/// Media extraction tool used for metadata and audio
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Fetch title, channel, duration and thumbnail without downloading
    async fn fetch_metadata(&self, video_id: &VideoId) -> Result<VideoMetadata>;

    /// Download the best audio stream into `output_dir`, returning the audio file path
    async fn download_audio(&self, video_id: &VideoId, output_dir: &Path) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_shape() {
        assert!(VideoId::parse("dQw4w9WgXcQ").is_some());
        assert!(VideoId::parse("a-b_c-d_e-f").is_some());
        assert!(VideoId::parse("short").is_none());
        assert!(VideoId::parse("dQw4w9WgXcQx").is_none());
        assert!(VideoId::parse("dQw4w9WgX?Q").is_none());
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = VideoMetadata::default();
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.channel, "Unknown");
        assert_eq!(metadata.duration, 0);
        assert!(metadata.thumbnail.is_empty());
    }
}
