use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{LocalTranscriber, TranscriptResult};
use crate::error::{Error, Result};
use crate::youtube::{CaptionFetcher, VideoId};

/// Captions first, local Whisper second
pub struct TranscriptionOrchestrator {
    captions: CaptionFetcher,
    transcriber: Arc<LocalTranscriber>,
    model_size: String,
}

impl TranscriptionOrchestrator {
    pub fn new(captions: CaptionFetcher, transcriber: Arc<LocalTranscriber>, model_size: impl Into<String>) -> Self {
        Self {
            captions,
            transcriber,
            model_size: model_size.into(),
        }
    }

    pub fn model_size(&self) -> &str {
        &self.model_size
    }

    pub fn transcriber(&self) -> &Arc<LocalTranscriber> {
        &self.transcriber
    }

    /// Existing captions for the video, if any are usable
    pub async fn fetch_captions(&self, video_id: &VideoId) -> Option<TranscriptResult> {
        self.captions.fetch(video_id).await.into_transcript()
    }

    /// Run the local model over downloaded audio
    pub async fn transcribe_audio(&self, audio_path: &Path) -> Result<TranscriptResult> {
        self.transcriber.transcribe(audio_path, &self.model_size).await
    }

    /// Best available transcript: captions, else Whisper on `audio_path`.
    ///
    /// The HTTP handler calls `fetch_captions` and `transcribe_audio`
    /// separately instead, so audio is only downloaded after a caption miss
    /// and captions are looked up once per request.
    pub async fn get_transcript(&self, video_id: &VideoId, audio_path: Option<&Path>) -> Result<TranscriptResult> {
        if let Some(result) = self.fetch_captions(video_id).await {
            return Ok(result);
        }

        info!("No YouTube captions found for {}, using Whisper...", video_id);
        let audio_path = audio_path.ok_or(Error::AudioPathRequired)?;
        self.transcribe_audio(audio_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{ModelLoader, RawSegment, RawTranscription, SpeechModel, TranscriptSegment, TranscriptSource};
    use crate::youtube::{CaptionError, CaptionSource, CaptionTrack};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct NoCaptions;

    #[async_trait]
    impl CaptionSource for NoCaptions {
        async fn list_tracks(&self, _video_id: &VideoId) -> std::result::Result<Vec<CaptionTrack>, CaptionError> {
            Err(CaptionError::Disabled)
        }

        async fn fetch_track(&self, _track: &CaptionTrack) -> std::result::Result<Vec<TranscriptSegment>, CaptionError> {
            Err(CaptionError::NoTranscript)
        }
    }

    struct OneEnglishTrack;

    #[async_trait]
    impl CaptionSource for OneEnglishTrack {
        async fn list_tracks(&self, _video_id: &VideoId) -> std::result::Result<Vec<CaptionTrack>, CaptionError> {
            Ok(vec![CaptionTrack {
                language_code: "en".to_string(),
                language_name: "English".to_string(),
                is_generated: false,
                base_url: "https://www.youtube.com/api/timedtext?lang=en".to_string(),
            }])
        }

        async fn fetch_track(&self, _track: &CaptionTrack) -> std::result::Result<Vec<TranscriptSegment>, CaptionError> {
            Ok(vec![TranscriptSegment::new(0.0, 2.0, "from captions")])
        }
    }

    struct EchoModel;

    #[async_trait]
    impl SpeechModel for EchoModel {
        async fn transcribe(&self, _audio_path: &Path) -> Result<RawTranscription> {
            Ok(RawTranscription {
                text: "from whisper".to_string(),
                segments: vec![RawSegment { start: 0.0, end: 1.0, text: "from whisper".to_string() }],
                language: None,
            })
        }

        fn model_size(&self) -> &str {
            "base"
        }
    }

    struct EchoLoader;

    #[async_trait]
    impl ModelLoader for EchoLoader {
        async fn load(&self, _model_size: &str) -> Result<Arc<dyn SpeechModel>> {
            Ok(Arc::new(EchoModel))
        }
    }

    fn orchestrator(source: Arc<dyn CaptionSource>) -> TranscriptionOrchestrator {
        TranscriptionOrchestrator::new(
            CaptionFetcher::new(source, vec!["en".to_string()]),
            Arc::new(LocalTranscriber::new(Arc::new(EchoLoader))),
            "base",
        )
    }

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_captions_hit_skips_whisper() {
        let orchestrator = orchestrator(Arc::new(OneEnglishTrack));

        let result = orchestrator.get_transcript(&video_id(), None).await.unwrap();

        assert_eq!(result.source, TranscriptSource::YoutubeCaptions);
        assert_eq!(result.text, "from captions");
        assert!(!orchestrator.transcriber().is_loaded());
    }

    #[tokio::test]
    async fn test_miss_without_audio_requires_path() {
        let orchestrator = orchestrator(Arc::new(NoCaptions));

        let err = orchestrator.get_transcript(&video_id(), None).await.unwrap_err();
        assert!(matches!(err, Error::AudioPathRequired));
    }

    #[tokio::test]
    async fn test_miss_with_audio_uses_whisper() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("dQw4w9WgXcQ.mp3");
        std::fs::write(&audio, b"audio").unwrap();
        let orchestrator = orchestrator(Arc::new(NoCaptions));

        let result = orchestrator.get_transcript(&video_id(), Some(&audio)).await.unwrap();

        assert_eq!(result.source, TranscriptSource::Whisper);
        assert_eq!(result.text, "from whisper");
        assert!(orchestrator.transcriber().is_loaded());
    }
}
