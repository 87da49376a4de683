use regex::Regex;
use std::sync::OnceLock;

use super::VideoId;

/// Recognized URL shapes, tried in order; the first pattern that matches wins
const VIDEO_ID_PATTERNS: [&str; 2] = [
    r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([a-zA-Z0-9_-]{11})",
    r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        VIDEO_ID_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Extract the video identifier from a YouTube URL
///
/// Supports `watch?v=`, `youtu.be/`, `embed/`, `shorts/` and a `v=` parameter
/// anywhere in a watch query string. Returns `None` for anything else.
pub fn resolve_video_id(url: &str) -> Option<VideoId> {
    let url = url.trim();
    patterns()
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .and_then(|m| VideoId::parse(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> Option<String> {
        resolve_video_id(url).map(|id| id.to_string())
    }

    #[test]
    fn test_all_shapes_resolve_to_same_id() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ?si=abc  ",
        ];

        for url in urls {
            assert_eq!(id(url).as_deref(), Some("dQw4w9WgXcQ"), "url: {}", url);
        }
    }

    #[test]
    fn test_short_link_example() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_rejects_non_youtube_urls() {
        assert_eq!(id(""), None);
        assert_eq!(id("not a url"), None);
        assert_eq!(id("https://vimeo.com/123456789"), None);
        assert_eq!(id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(id("https://www.youtube.com/channel/UC38IQsAvIsxxjztdMZQtwHA"), None);
        assert_eq!(id("https://example.com/?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_first_pattern_wins() {
        // The path form matches before the generic query-parameter form
        assert_eq!(
            id("https://www.youtube.com/watch?v=aaaaaaaaaaa&v=bbbbbbbbbbb").as_deref(),
            Some("aaaaaaaaaaa")
        );
        assert_eq!(
            id("https://www.youtube.com/watch?list=PL1&v=ccccccccccc").as_deref(),
            Some("ccccccccccc")
        );
    }
}
