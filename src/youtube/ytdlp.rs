use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaExtractor, VideoId, VideoMetadata};
use crate::config::{AudioConfig, YouTubeConfig};
use crate::error::{Error, Result};

/// Longest stderr excerpt carried into an error message
const MAX_STDERR_CHARS: usize = 1000;

/// yt-dlp backed metadata fetcher and audio downloader
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
    codec: String,
    bitrate_kbps: u32,
}

/// Subset of `--dump-single-json` output we care about
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl From<YtDlpInfo> for VideoMetadata {
    fn from(info: YtDlpInfo) -> Self {
        let defaults = VideoMetadata::default();
        Self {
            title: info.title.unwrap_or(defaults.title),
            channel: info.uploader.unwrap_or(defaults.channel),
            duration: info
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| d as u64)
                .unwrap_or(defaults.duration),
            thumbnail: info.thumbnail.unwrap_or(defaults.thumbnail),
        }
    }
}

impl YtDlp {
    pub fn new(youtube: &YouTubeConfig, audio: &AudioConfig) -> Self {
        Self {
            binary: youtube.yt_dlp_binary.clone(),
            codec: audio.codec.clone(),
            bitrate_kbps: audio.bitrate_kbps,
        }
    }

    /// Path the audio for `video_id` lands at inside `output_dir`
    pub fn audio_output_path(&self, video_id: &VideoId, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", video_id, self.codec))
    }

    /// Arguments for a metadata-only run
    fn metadata_args(&self, video_id: &VideoId) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            video_id.watch_url(),
        ]
    }

    /// Arguments for downloading and transcoding the best audio stream
    fn download_args(&self, video_id: &VideoId, output_dir: &Path) -> Vec<String> {
        let output_template = output_dir.join(format!("{}.%(ext)s", video_id));
        vec![
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.codec.clone(),
            "--audio-quality".to_string(),
            format!("{}K", self.bitrate_kbps),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().to_string(),
            video_id.watch_url(),
        ]
    }

    /// Run yt-dlp and return stdout, or the failure text on error
    async fn run(&self, args: &[String]) -> std::result::Result<Vec<u8>, String> {
        debug!("Executing {} {:?}", self.binary, args);

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("Failed to run {}: {}", self.binary, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
            return Err(if stderr.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                stderr
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn fetch_metadata(&self, video_id: &VideoId) -> Result<VideoMetadata> {
        info!("🔎 Fetching metadata for {}", video_id);

        let stdout = self
            .run(&self.metadata_args(video_id))
            .await
            .map_err(Error::VideoUnavailable)?;

        let info: YtDlpInfo = serde_json::from_slice(&stdout)
            .map_err(|e| Error::VideoUnavailable(format!("Unreadable yt-dlp metadata: {}", e)))?;

        Ok(info.into())
    }

    async fn download_audio(&self, video_id: &VideoId, output_dir: &Path) -> Result<PathBuf> {
        info!("⬇️  Downloading audio for {} into {}", video_id, output_dir.display());

        self.run(&self.download_args(video_id, output_dir))
            .await
            .map_err(Error::Download)?;

        let audio_path = self.audio_output_path(video_id, output_dir);
        info!("✅ Audio ready: {}", audio_path.display());
        Ok(audio_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ytdlp() -> YtDlp {
        let config = Config::default();
        YtDlp::new(&config.youtube, &config.audio)
    }

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn test_metadata_from_full_info() {
        let info: YtDlpInfo = serde_json::from_str(
            r#"{"title": "Never Gonna Give You Up", "duration": 212.9, "uploader": "Rick Astley",
                "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg", "id": "dQw4w9WgXcQ"}"#,
        )
        .unwrap();

        let metadata: VideoMetadata = info.into();
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.channel, "Rick Astley");
        assert_eq!(metadata.duration, 212);
        assert!(metadata.thumbnail.ends_with("maxresdefault.jpg"));
    }

    #[test]
    fn test_metadata_defaults_for_missing_fields() {
        let info: YtDlpInfo = serde_json::from_str(r#"{"duration": null}"#).unwrap();
        let metadata: VideoMetadata = info.into();
        assert_eq!(metadata, VideoMetadata::default());
    }

    #[test]
    fn test_audio_path_is_deterministic() {
        let dir = Path::new("/tmp/work");
        assert_eq!(
            ytdlp().audio_output_path(&video_id(), dir),
            PathBuf::from("/tmp/work/dQw4w9WgXcQ.mp3")
        );
    }

    #[test]
    fn test_download_args_select_best_audio_as_mp3() {
        let args = ytdlp().download_args(&video_id(), Path::new("/tmp/work"));
        let joined = args.join(" ");
        assert!(joined.contains("-f bestaudio/best"));
        assert!(joined.contains("--audio-format mp3"));
        assert!(joined.contains("--audio-quality 192K"));
        assert!(joined.contains("/tmp/work/dQw4w9WgXcQ.%(ext)s"));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_missing_binary_is_video_unavailable() {
        let mut config = Config::default();
        config.youtube.yt_dlp_binary = "definitely-not-yt-dlp-binary".to_string();
        let ytdlp = YtDlp::new(&config.youtube, &config.audio);

        let err = ytdlp.fetch_metadata(&video_id()).await.unwrap_err();
        assert!(matches!(err, Error::VideoUnavailable(_)));
        assert!(err.to_string().contains("definitely-not-yt-dlp-binary"));
    }
}
