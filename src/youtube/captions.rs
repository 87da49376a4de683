//! Caption lookup: reuse creator or auto-generated captions when a video has them.
//!
//! Absence of captions is an expected outcome, not an error. [`CaptionFetcher::fetch`]
//! returns a [`CaptionLookup`] so callers can tell "nothing to reuse" apart from a
//! transient failure, and both lead to the Whisper fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::VideoId;
use crate::config::YouTubeConfig;
use crate::transcription::{TranscriptResult, TranscriptSegment, TranscriptSource};

const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";
const USER_AGENT: &str = "com.google.android.youtube/20.10.38 (Linux; U; Android 14) gzip";

/// A caption track advertised for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub language_name: String,
    /// Auto-generated (ASR) rather than authored
    pub is_generated: bool,
    pub base_url: String,
}

/// Why a caption lookup did not produce segments
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptionError {
    #[error("captions are disabled for this video")]
    Disabled,

    #[error("no transcript found")]
    NoTranscript,

    #[error("video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("caption request failed: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for CaptionError {
    fn from(e: reqwest::Error) -> Self {
        CaptionError::Transient(e.to_string())
    }
}

/// Outcome of a caption lookup
#[derive(Debug, Clone)]
pub enum CaptionLookup {
    /// A track was selected and fetched
    Found(TranscriptResult),
    /// Captions disabled, no track, or video unavailable
    NotAvailable(CaptionError),
    /// Anything unexpected while talking to the captions endpoint
    TransientError(String),
}

impl CaptionLookup {
    pub fn into_transcript(self) -> Option<TranscriptResult> {
        match self {
            CaptionLookup::Found(result) => Some(result),
            _ => None,
        }
    }
}

/// Captions client
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// List the caption tracks available for a video
    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, CaptionError>;

    /// Fetch the ordered segments of one track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>, CaptionError>;
}

/// Pick a track: manual in a preferred language, then generated in a preferred
/// language, then anything (manual before generated, then by language code).
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Option<&'a CaptionTrack> {
    let find_preferred = |generated: bool| {
        preferred.iter().find_map(|lang| {
            tracks
                .iter()
                .find(|t| t.is_generated == generated && &t.language_code == lang)
        })
    };

    find_preferred(false)
        .or_else(|| find_preferred(true))
        .or_else(|| {
            tracks
                .iter()
                .min_by(|a, b| {
                    a.is_generated
                        .cmp(&b.is_generated)
                        .then_with(|| a.language_code.cmp(&b.language_code))
                })
        })
}

/// Caption fetcher with the language preference policy applied
#[derive(Clone)]
pub struct CaptionFetcher {
    source: Arc<dyn CaptionSource>,
    preferred_languages: Vec<String>,
}

impl CaptionFetcher {
    pub fn new(source: Arc<dyn CaptionSource>, preferred_languages: Vec<String>) -> Self {
        Self {
            source,
            preferred_languages,
        }
    }

    pub fn preferred_languages(&self) -> &[String] {
        &self.preferred_languages
    }

    /// Look up existing captions for a video. Never fails.
    pub async fn fetch(&self, video_id: &VideoId) -> CaptionLookup {
        match self.try_fetch(video_id).await {
            Ok(result) => {
                info!(
                    "✓ Found YouTube captions for video {} ({} segments)",
                    video_id,
                    result.segments.len()
                );
                CaptionLookup::Found(result)
            }
            Err(CaptionError::Transient(message)) => {
                warn!("YouTube transcript error for {}: {}", video_id, message);
                CaptionLookup::TransientError(message)
            }
            Err(reason) => {
                info!("No usable YouTube captions for {}: {}", video_id, reason);
                CaptionLookup::NotAvailable(reason)
            }
        }
    }

    async fn try_fetch(&self, video_id: &VideoId) -> Result<TranscriptResult, CaptionError> {
        let tracks = self.source.list_tracks(video_id).await?;
        debug!("{} caption tracks listed for {}", tracks.len(), video_id);

        let track = select_track(&tracks, &self.preferred_languages).ok_or(CaptionError::NoTranscript)?;
        debug!(
            "Selected {} caption track '{}' ({})",
            if track.is_generated { "generated" } else { "manual" },
            track.language_name,
            track.language_code
        );

        let segments = self.source.fetch_track(track).await?;
        if segments.is_empty() {
            return Err(CaptionError::NoTranscript);
        }

        Ok(TranscriptResult::from_segments(
            segments,
            TranscriptSource::YoutubeCaptions,
            Some(track.language_code.clone()),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    name: Option<TrackName>,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    #[serde(default)]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn text(&self) -> Option<String> {
        self.simple_text.clone().or_else(|| {
            let joined: String = self.runs.iter().map(|r| r.text.as_str()).collect();
            (!joined.is_empty()).then_some(joined)
        })
    }
}

impl From<RawCaptionTrack> for CaptionTrack {
    fn from(raw: RawCaptionTrack) -> Self {
        let language_name = raw
            .name
            .as_ref()
            .and_then(TrackName::text)
            .unwrap_or_else(|| raw.language_code.clone());
        Self {
            is_generated: raw.kind.as_deref() == Some("asr"),
            language_code: raw.language_code,
            language_name,
            base_url: raw.base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Json3Response {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Map player JSON to the advertised tracks
fn parse_player_response(response: PlayerResponse) -> Result<Vec<CaptionTrack>, CaptionError> {
    if let Some(status) = response.playability_status {
        if status.status != "OK" {
            return Err(CaptionError::VideoUnavailable(
                status.reason.unwrap_or(status.status),
            ));
        }
    }

    let renderer = response
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or(CaptionError::Disabled)?;

    Ok(renderer.caption_tracks.into_iter().map(CaptionTrack::from).collect())
}

/// Map timed-text events to segments, skipping events with no text
fn parse_json3(response: Json3Response) -> Vec<TranscriptSegment> {
    response
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect()
}

/// Timed-text URL for a track in the `json3` format
fn json3_url(base_url: &str) -> Result<String, CaptionError> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| CaptionError::Transient(format!("bad caption URL: {}", e)))?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");
    Ok(url.to_string())
}

/// Captions client speaking YouTube's Innertube player API
#[derive(Clone)]
pub struct InnertubeCaptions {
    client: Client,
    client_name: String,
    client_version: String,
}

impl InnertubeCaptions {
    pub fn new(config: &YouTubeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            client_name: config.innertube_client_name.clone(),
            client_version: config.innertube_client_version.clone(),
        }
    }
}

#[async_trait]
impl CaptionSource for InnertubeCaptions {
    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, CaptionError> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": self.client_name,
                    "clientVersion": self.client_version,
                    "hl": "en"
                }
            },
            "videoId": video_id.as_str()
        });

        debug!("Requesting player response for {}", video_id);
        let response = self.client.post(PLAYER_ENDPOINT).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(CaptionError::Transient(format!(
                "player request returned {}",
                response.status()
            )));
        }

        let player: PlayerResponse = response.json().await?;
        parse_player_response(player)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>, CaptionError> {
        let url = json3_url(&track.base_url)?;
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CaptionError::Transient(format!(
                "timed text request returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(CaptionError::NoTranscript);
        }

        let parsed: Json3Response = serde_json::from_str(&body)
            .map_err(|e| CaptionError::Transient(format!("unreadable timed text: {}", e)))?;
        Ok(parse_json3(parsed))
    }
}
