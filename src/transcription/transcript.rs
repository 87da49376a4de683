use serde::{Deserialize, Serialize};
use std::fmt;

/// A single timed span of transcript text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Spoken text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// End offset in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Where a transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    /// Creator or auto-generated captions published on YouTube
    YoutubeCaptions,
    /// Local Whisper inference on downloaded audio
    Whisper,
}

impl TranscriptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptSource::YoutubeCaptions => "youtube_captions",
            TranscriptSource::Whisper => "whisper",
        }
    }
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete transcript for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Full text, segment texts joined with single spaces
    pub text: String,
    /// Segments in chronological order
    pub segments: Vec<TranscriptSegment>,
    /// Producer of this transcript
    pub source: TranscriptSource,
    /// Caption language code or Whisper's detected language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TranscriptResult {
    /// Build a result whose full text is derived from the segments
    pub fn from_segments(
        segments: Vec<TranscriptSegment>,
        source: TranscriptSource,
        language: Option<String>,
    ) -> Self {
        Self {
            text: join_segment_text(&segments),
            segments,
            source,
            language,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Join segment texts with single spaces
pub fn join_segment_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|seg| seg.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_is_space_joined() {
        let result = TranscriptResult::from_segments(
            vec![
                TranscriptSegment::new(0.0, 1.5, "never gonna"),
                TranscriptSegment::new(1.5, 2.0, "give you up"),
            ],
            TranscriptSource::YoutubeCaptions,
            Some("en".to_string()),
        );

        assert_eq!(result.text, "never gonna give you up");
        assert_eq!(result.segments[1].end(), 3.5);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TranscriptSource::YoutubeCaptions).unwrap(),
            "\"youtube_captions\""
        );
        assert_eq!(
            serde_json::to_string(&TranscriptSource::Whisper).unwrap(),
            "\"whisper\""
        );
        assert_eq!(TranscriptSource::Whisper.to_string(), "whisper");
    }
}
