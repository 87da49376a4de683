//! Local speech recognition with a lazily loaded, process-wide model handle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{TranscriptResult, TranscriptSegment, TranscriptSource};
use crate::error::{Error, Result};

/// Segment as reported by the speech model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Raw model output before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTranscription {
    pub text: String,
    pub segments: Vec<RawSegment>,
    pub language: Option<String>,
}

/// A loaded speech-recognition model
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribe a whole audio file
    async fn transcribe(&self, audio_path: &Path) -> Result<RawTranscription>;

    /// Model size this handle was loaded with
    fn model_size(&self) -> &str;
}

/// Loads a speech model by size; may fetch weights on first use
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_size: &str) -> Result<Arc<dyn SpeechModel>>;
}

/// Local transcriber owning the model handle for the life of the application
pub struct LocalTranscriber {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn SpeechModel>>,
}

impl LocalTranscriber {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Whether a model has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Return the shared model, loading it on first use.
    ///
    /// Only the first successful load happens; later calls get the same handle
    /// whatever size they ask for. A failed load is retried on the next call.
    async fn model(&self, model_size: &str) -> Result<&Arc<dyn SpeechModel>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                info!("Loading Whisper model '{}'... (this may take a moment)", model_size);
                let model = self.loader.load(model_size).await?;
                info!("Whisper model loaded!");
                Ok::<_, Error>(model)
            })
            .await?;

        if model.model_size() != model_size {
            debug!(
                "Requested Whisper model '{}' but '{}' is already loaded; reusing it",
                model_size,
                model.model_size()
            );
        }

        Ok(model)
    }

    /// Transcribe an audio file into a normalized transcript
    pub async fn transcribe(&self, audio_path: &Path, model_size: &str) -> Result<TranscriptResult> {
        if !audio_path.exists() {
            return Err(Error::AudioNotFound {
                path: audio_path.to_path_buf(),
            });
        }

        let model = self.model(model_size).await?;

        info!("🎤 Transcribing audio with Whisper: {}", audio_path.display());
        let raw = model.transcribe(audio_path).await?;

        let result = normalize(raw);
        info!(
            "🎉 Whisper produced {} segments ({} characters)",
            result.segments.len(),
            result.text.len()
        );
        Ok(result)
    }
}

/// Convert model output into transcript segments.
/// The model's own full text is discarded; the result text is always the
/// join of the trimmed segments.
pub fn normalize(raw: RawTranscription) -> TranscriptResult {
    let segments = raw
        .segments
        .into_iter()
        .map(|seg| TranscriptSegment::new(seg.start, seg.end - seg.start, seg.text.trim()))
        .collect();

    TranscriptResult::from_segments(segments, TranscriptSource::Whisper, raw.language)
}
