//! Video identifier extraction from platform URLs

use std::sync::OnceLock;

use regex::Regex;

static VIDEO_ID_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    VIDEO_ID_PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#/]+)",
            r"youtube\.com/watch\?.*v=([^&\n?#/]+)",
            r"youtube\.com/shorts/([^&\n?#/]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("video id regex should compile"))
        .collect()
    })
}

/// Extract the video identifier from a watch, short-link, embed or shorts URL.
///
/// Returns `None` when no known pattern matches.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
