//! Application-lifetime registry of collaborators shared by all requests.

use std::sync::Arc;
use tempfile::TempDir;

use crate::config::Config;
use crate::transcription::{LocalTranscriber, ModelLoader, TranscriptionOrchestrator, WhisperLoader};
use crate::youtube::{CaptionFetcher, CaptionSource, InnertubeCaptions, MediaExtractor, YtDlp};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn MediaExtractor>,
    pub orchestrator: Arc<TranscriptionOrchestrator>,
}

impl AppState {
    /// Wire the real collaborators: yt-dlp, Innertube captions, and Whisper
    pub fn from_config(config: Config) -> Self {
        let extractor = Arc::new(YtDlp::new(&config.youtube, &config.audio));
        let captions = Arc::new(InnertubeCaptions::new(&config.youtube));
        let loader = Arc::new(WhisperLoader::new(config.transcription.clone()));
        Self::new(config, extractor, captions, loader)
    }

    /// Wire arbitrary collaborators
    pub fn new(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
        captions: Arc<dyn CaptionSource>,
        loader: Arc<dyn ModelLoader>,
    ) -> Self {
        let fetcher = CaptionFetcher::new(captions, config.youtube.preferred_languages.clone());
        let transcriber = Arc::new(LocalTranscriber::new(loader));
        let orchestrator = TranscriptionOrchestrator::new(fetcher, transcriber, config.transcription.model.clone());

        Self {
            config: Arc::new(config),
            extractor,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Create a per-request working directory; it is removed when dropped
    pub fn create_work_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("investigator-");

        match &self.config.audio.work_dir {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
    }
}
