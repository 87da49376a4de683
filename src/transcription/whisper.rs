use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::local::{ModelLoader, RawSegment, RawTranscription, SpeechModel};
use crate::config::TranscriptionConfig;
use crate::error::{Error, Result};

/// Whisper implementation available on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhisperBackend {
    /// whisper.cpp, either `whisper-cli` or `whisper-cpp`
    Cpp { command: String, model_path: PathBuf },
    /// OpenAI's Python `whisper` command
    Python,
}

impl WhisperBackend {
    fn name(&self) -> &str {
        match self {
            WhisperBackend::Cpp { command, .. } => command.as_str(),
            WhisperBackend::Python => "whisper",
        }
    }
}

/// Loaded Whisper model backed by a command-line backend
#[derive(Debug, Clone)]
pub struct WhisperModel {
    backend: WhisperBackend,
    model_size: String,
    language: Option<String>,
    threads: u32,
}

impl WhisperModel {
    /// Detect a backend and resolve the model for `model_size`
    pub async fn load(model_size: &str, config: &TranscriptionConfig) -> Result<Self> {
        info!("🔍 Detecting available Whisper backends...");

        for command in ["whisper-cli", "whisper-cpp"] {
            if !check_command_available(command).await {
                debug!("❌ {} not available", command);
                continue;
            }

            match find_cpp_model(model_size, &config.model_dir) {
                Some(model_path) => {
                    info!("✅ Using {} with model {}", command, model_path.display());
                    return Ok(Self::with_backend(
                        WhisperBackend::Cpp {
                            command: command.to_string(),
                            model_path,
                        },
                        model_size,
                        config,
                    ));
                }
                None => warn!(
                    "⚠️  {} found but no ggml-{}.bin model in {}",
                    command,
                    model_size,
                    config.model_dir.display()
                ),
            }
        }

        if check_command_available("whisper").await {
            info!("✅ Using Python Whisper with model '{}'", model_size);
            return Ok(Self::with_backend(WhisperBackend::Python, model_size, config));
        }

        error!("❌ No Whisper backend found!");
        Err(Error::ModelLoad(format!(
            "No Whisper backend found for model '{}'. Install whisper.cpp (with ggml-{}.bin in {}) or openai-whisper",
            model_size,
            model_size,
            config.model_dir.display()
        )))
    }

    pub fn with_backend(backend: WhisperBackend, model_size: &str, config: &TranscriptionConfig) -> Self {
        Self {
            backend,
            model_size: model_size.to_string(),
            language: config.language.clone(),
            threads: config.threads,
        }
    }

    pub fn backend(&self) -> &WhisperBackend {
        &self.backend
    }

    /// Build the backend command writing JSON into `output_dir`
    fn build_command(&self, audio_path: &Path, output_dir: &Path) -> Command {
        let base_name = audio_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        match &self.backend {
            WhisperBackend::Cpp { command, model_path } => {
                let mut cmd = Command::new(command);
                cmd.arg("-f").arg(audio_path)
                    .arg("-m").arg(model_path)
                    .arg("-oj")
                    .arg("-of").arg(output_dir.join(&base_name))
                    .arg("-t").arg(self.threads.to_string());
                if let Some(language) = &self.language {
                    cmd.arg("-l").arg(language);
                }
                cmd
            }
            WhisperBackend::Python => {
                let mut cmd = Command::new("whisper");
                cmd.arg(audio_path)
                    .arg("--model").arg(&self.model_size)
                    .arg("--output_dir").arg(output_dir)
                    .arg("--output_format").arg("json")
                    .arg("--verbose").arg("False")
                    .arg("--fp16").arg("False");
                if let Some(language) = &self.language {
                    cmd.arg("--language").arg(language);
                }
                cmd
            }
        }
    }
}

#[async_trait]
impl SpeechModel for WhisperModel {
    async fn transcribe(&self, audio_path: &Path) -> Result<RawTranscription> {
        let output_dir = tempfile::Builder::new().prefix("whisper-").tempdir()?;
        let mut cmd = self.build_command(audio_path, output_dir.path());
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        info!("🚀 Running {}: {} model on {}", self.backend.name(), self.model_size, audio_path.display());
        debug!("Executing command: {:?}", cmd);

        let start_time = std::time::Instant::now();
        let output = cmd
            .output()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to spawn {}: {}", self.backend.name(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("❌ {} failed with exit code: {}", self.backend.name(), output.status);
            return Err(Error::Transcription(format!(
                "{} exited with {}: {}",
                self.backend.name(),
                output.status,
                stderr.trim()
            )));
        }
        info!("✅ {} completed in {:.1}s", self.backend.name(), start_time.elapsed().as_secs_f64());

        let json_path = find_json_output(output_dir.path())
            .await?
            .ok_or_else(|| Error::Transcription(format!("No {} JSON output found", self.backend.name())))?;
        let json_content = tokio::fs::read_to_string(&json_path).await?;

        let whisper_output: WhisperOutput = serde_json::from_str(&json_content).map_err(|e| {
            Error::Transcription(format!("Failed to parse {} JSON output: {}", self.backend.name(), e))
        })?;

        Ok(whisper_output.into_raw())
    }

    fn model_size(&self) -> &str {
        &self.model_size
    }
}

/// Loader producing [`WhisperModel`] handles from configuration
#[derive(Debug, Clone)]
pub struct WhisperLoader {
    config: TranscriptionConfig,
}

impl WhisperLoader {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for WhisperLoader {
    async fn load(&self, model_size: &str) -> Result<Arc<dyn SpeechModel>> {
        let model = WhisperModel::load(model_size, &self.config).await?;
        Ok(Arc::new(model))
    }
}

/// Check if a command is available
async fn check_command_available(cmd_name: &str) -> bool {
    Command::new(cmd_name)
        .arg("--help")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Locate a whisper.cpp model file for `model_size`
fn find_cpp_model(model_size: &str, model_dir: &Path) -> Option<PathBuf> {
    let file_name = format!("ggml-{}.bin", model_size);
    [
        model_dir.join(&file_name),
        PathBuf::from("/usr/local/share/whisper-cpp").join(&file_name),
        PathBuf::from("/opt/homebrew/share/whisper-cpp").join(&file_name),
    ]
    .into_iter()
    .find(|path| path.exists())
}

async fn find_json_output(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "json") {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Parse timestamp in "HH:MM:SS,mmm" format to seconds
fn parse_timestamp(timestamp: &str) -> Option<f64> {
    let (time_part, millis) = timestamp.split_once(',')?;
    let milliseconds = millis.parse::<f64>().ok()? / 1000.0;

    let mut components = time_part.split(':');
    let hours: f64 = components.next()?.parse().ok()?;
    let minutes: f64 = components.next()?.parse().ok()?;
    let seconds: f64 = components.next()?.parse().ok()?;
    if components.next().is_some() {
        return None;
    }

    Some(hours * 3600.0 + minutes * 60.0 + seconds + milliseconds)
}

/// Whisper JSON output, either whisper.cpp's `transcription` array or Python's `segments`
#[derive(Debug, Clone, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    transcription: Vec<WhisperCppSegment>,
    #[serde(default)]
    result: Option<WhisperCppResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperCppResult {
    language: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperCppSegment {
    timestamps: WhisperTimestamps,
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperTimestamps {
    from: String,
    to: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

impl WhisperOutput {
    fn into_raw(self) -> RawTranscription {
        let segments: Vec<RawSegment> = if !self.transcription.is_empty() {
            self.transcription
                .into_iter()
                .map(|seg| RawSegment {
                    start: parse_timestamp(&seg.timestamps.from).unwrap_or(0.0),
                    end: parse_timestamp(&seg.timestamps.to).unwrap_or(0.0),
                    text: seg.text,
                })
                .collect()
        } else {
            self.segments
                .into_iter()
                .map(|seg| RawSegment {
                    start: seg.start,
                    end: seg.end,
                    text: seg.text,
                })
                .collect()
        };

        // whisper.cpp JSON carries no full text
        let text = self.text.unwrap_or_default();

        let language = self.result.map(|r| r.language).or(self.language);

        RawTranscription {
            text,
            segments,
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use crate::transcription::local::normalize;

    #[test]
    fn test_parse_timestamp() {
        let seconds = parse_timestamp("00:01:23,456").unwrap();
        assert!((seconds - 83.456).abs() < 1e-9);
        assert_eq!(parse_timestamp("01:00:00,000"), Some(3600.0));
        assert_eq!(parse_timestamp("00:01:23"), None);
        assert_eq!(parse_timestamp("01:23,000"), None);
    }

    #[test]
    fn test_python_output() {
        let output: WhisperOutput = serde_json::from_str(
            r#"{"text": " Hello world. Bye.", "language": "en", "segments": [
                {"id": 0, "start": 0.0, "end": 2.0, "text": " Hello world.", "avg_logprob": -0.2},
                {"id": 1, "start": 2.0, "end": 3.5, "text": " Bye."}
            ]}"#,
        )
        .unwrap();

        let raw = output.into_raw();
        assert_eq!(raw.text, " Hello world. Bye.");
        assert_eq!(raw.segments.len(), 2);
        assert_eq!(raw.segments[1].end, 3.5);
        assert_eq!(raw.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_cpp_output() {
        let output: WhisperOutput = serde_json::from_str(
            r#"{"result": {"language": "de"}, "transcription": [
                {"timestamps": {"from": "00:00:00,000", "to": "00:00:02,500"},
                 "offsets": {"from": 0, "to": 2500}, "text": " Guten Tag."},
                {"timestamps": {"from": "00:00:02,500", "to": "00:00:04,000"},
                 "offsets": {"from": 2500, "to": 4000}, "text": " Wie geht's?"}
            ]}"#,
        )
        .unwrap();

        let raw = output.into_raw();
        assert!(raw.text.is_empty());
        assert_eq!(raw.segments[0].end, 2.5);
        assert_eq!(raw.segments[1].start, 2.5);
        assert_eq!(raw.language.as_deref(), Some("de"));

        let result = normalize(raw);
        assert_eq!(result.text, "Guten Tag. Wie geht's?");
    }

    #[test]
    fn test_find_cpp_model() {
        let dir = TempDir::new().unwrap();
        assert!(find_cpp_model("base", dir.path()).is_none());

        let model_path = dir.path().join("ggml-base.bin");
        std::fs::write(&model_path, b"weights").unwrap();
        assert_eq!(find_cpp_model("base", dir.path()), Some(model_path));
    }

    #[test]
    fn test_cpp_command_arguments() {
        let config = TranscriptionConfig {
            language: Some("en".to_string()),
            ..TranscriptionConfig::default()
        };
        let model = WhisperModel::with_backend(
            WhisperBackend::Cpp {
                command: "whisper-cli".to_string(),
                model_path: PathBuf::from("models/ggml-base.bin"),
            },
            "base",
            &config,
        );

        let cmd = model.build_command(Path::new("/work/abc.mp3"), Path::new("/out"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(cmd.as_std().get_program(), "whisper-cli");
        assert!(args.windows(2).any(|w| w[0] == "-m" && w[1] == "models/ggml-base.bin"));
        assert!(args.windows(2).any(|w| w[0] == "-of" && w[1] == "/out/abc"));
        assert!(args.windows(2).any(|w| w[0] == "-l" && w[1] == "en"));
        assert!(args.contains(&"-oj".to_string()));
    }

    #[test]
    fn test_python_command_uses_model_size() {
        let model = WhisperModel::with_backend(WhisperBackend::Python, "small", &TranscriptionConfig::default());
        let cmd = model.build_command(Path::new("/work/abc.mp3"), Path::new("/out"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(args[0], "/work/abc.mp3");
        assert!(args.windows(2).any(|w| w[0] == "--model" && w[1] == "small"));
        assert!(args.windows(2).any(|w| w[0] == "--output_format" && w[1] == "json"));
        assert!(!args.contains(&"--language".to_string()));
    }
}
