use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the Investigator backend
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// YouTube collaborators (yt-dlp and the captions endpoint)
    pub youtube: YouTubeConfig,

    /// Audio download settings for the Whisper fallback
    pub audio: AudioConfig,

    /// Local transcription settings
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// yt-dlp executable name or path
    pub yt_dlp_binary: String,

    /// Caption languages, most preferred first
    pub preferred_languages: Vec<String>,

    /// Innertube client used for the player request
    pub innertube_client_name: String,

    /// Innertube client version sent with the player request
    pub innertube_client_version: String,

    /// Timeout for caption HTTP requests (seconds)
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Codec yt-dlp transcodes the best audio stream into
    pub codec: String,

    /// Target bitrate in kbps
    pub bitrate_kbps: u32,

    /// Root for per-request working directories (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper model size (tiny, base, small, medium, large)
    pub model: String,

    /// Directory holding whisper.cpp `ggml-*.bin` models
    pub model_dir: PathBuf,

    /// Language hint for Whisper (auto-detect when unset)
    pub language: Option<String>,

    /// Threads handed to whisper.cpp
    pub threads: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(), // Vite dev server
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            yt_dlp_binary: "yt-dlp".to_string(),
            preferred_languages: ["en", "hi", "es", "fr", "de"]
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
            innertube_client_name: "ANDROID".to_string(),
            innertube_client_version: "20.10.38".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: "mp3".to_string(),
            bitrate_kbps: 192,
            work_dir: None,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            model_dir: PathBuf::from("models"),
            language: None,
            threads: 4,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "investigator.toml",
            "config/investigator.toml",
            "/etc/investigator/config.toml",
        ];

        let mut config = Self::default();
        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = loaded;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("INVESTIGATOR_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("INVESTIGATOR_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid INVESTIGATOR_PORT: {}", port),
            }
        }

        if let Ok(model) = std::env::var("INVESTIGATOR_MODEL") {
            self.transcription.model = model;
        }

        if let Ok(binary) = std::env::var("INVESTIGATOR_YT_DLP") {
            self.youtube.yt_dlp_binary = binary;
        }

        if let Ok(work_dir) = std::env::var("INVESTIGATOR_WORK_DIR") {
            self.audio.work_dir = Some(PathBuf::from(work_dir));
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.youtube.yt_dlp_binary.trim().is_empty() {
            return Err(anyhow!("yt_dlp_binary must not be empty"));
        }

        if self.audio.codec.trim().is_empty() {
            return Err(anyhow!("audio codec must not be empty"));
        }

        if self.audio.bitrate_kbps == 0 {
            return Err(anyhow!("bitrate_kbps must be greater than 0"));
        }

        if self.transcription.model.trim().is_empty() {
            return Err(anyhow!("transcription model must not be empty"));
        }

        if let Some(work_dir) = &self.audio.work_dir {
            if !work_dir.exists() {
                std::fs::create_dir_all(work_dir)
                    .map_err(|e| anyhow!("Cannot create work directory: {}", e))?;
            }
        }

        Ok(())
    }

    /// Bind address for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Investigator Configuration:\n\
            - Listen: {}\n\
            - Allowed Origins: {}\n\
            - Caption Languages: {}\n\
            - Audio: {} @ {}kbps\n\
            - Whisper Model: {}",
            self.bind_address(),
            self.server.allowed_origins.join(", "),
            self.youtube.preferred_languages.join(", "),
            self.audio.codec,
            self.audio.bitrate_kbps,
            self.transcription.model,
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.transcription.model = model.into();
        self
    }

    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.config.audio.work_dir = Some(dir);
        self
    }

    pub fn with_preferred_languages(mut self, languages: Vec<String>) -> Self {
        self.config.youtube.preferred_languages = languages;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.audio.codec, "mp3");
        assert_eq!(config.audio.bitrate_kbps, 192);
        assert_eq!(config.transcription.model, "base");
        assert_eq!(
            config.youtube.preferred_languages,
            vec!["en", "hi", "es", "fr", "de"]
        );
        assert_eq!(config.server.allowed_origins.len(), 3);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_port(9000)
            .with_model("small")
            .with_preferred_languages(vec!["es".to_string()])
            .build();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.youtube.preferred_languages, vec!["es"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("investigator.toml");
        std::fs::write(&path, "[server]\nport = 8123\n\n[transcription]\nmodel = \"tiny\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.transcription.model, "tiny");
        assert_eq!(config.audio.bitrate_kbps, 192);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("saved.toml");
        let config = ConfigBuilder::new().with_port(8500).build();

        config.save(path.to_str().unwrap()).unwrap();
        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.server.port, 8500);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.audio.bitrate_kbps = 0;
        assert!(config.validate().is_err());
    }
}
