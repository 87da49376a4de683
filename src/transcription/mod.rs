pub mod local;
pub mod orchestrator;
pub mod transcript;
pub mod whisper;

pub use local::{LocalTranscriber, ModelLoader, RawSegment, RawTranscription, SpeechModel};
pub use orchestrator::TranscriptionOrchestrator;
pub use transcript::{join_segment_text, TranscriptResult, TranscriptSegment, TranscriptSource};
pub use whisper::{WhisperBackend, WhisperLoader, WhisperModel};
