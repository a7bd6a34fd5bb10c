//! Video URL normalization
//!
//! Maps a raw link to the platform that hosts it, the platform's video id,
//! an embeddable player URL and the ordered list of thumbnail candidates.
//! Nothing here fails: unrecognized input degrades to [`Platform::External`]
//! with the original URL as its own embed target.

pub mod probe;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static YOUTUBE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)")
        .expect("Failed to compile YouTube regex")
});

static VIMEO_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("Failed to compile Vimeo regex"));

static DAILYMOTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"dailymotion\.com/video/([^_]+)").expect("Failed to compile Dailymotion regex")
});

/// YouTube thumbnail sizes, best first
const YOUTUBE_THUMBNAILS: &[&str] = &[
    "maxresdefault.jpg",
    "hqdefault.jpg",
    "mqdefault.jpg",
    "sddefault.jpg",
    "0.jpg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    YouTube,
    Vimeo,
    Dailymotion,
    External,
}

impl Platform {
    /// Detect the hosting platform from known host fragments
    pub fn detect(url: &str) -> Self {
        if url.contains("youtube.com") || url.contains("youtu.be") {
            Platform::YouTube
        } else if url.contains("vimeo.com") {
            Platform::Vimeo
        } else if url.contains("dailymotion.com") {
            Platform::Dailymotion
        } else {
            Platform::External
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Vimeo => "Vimeo",
            Platform::Dailymotion => "Dailymotion",
            Platform::External => "External",
        }
    }

    fn embed_url(&self, id: &str) -> Option<String> {
        match self {
            Platform::YouTube => Some(format!("https://www.youtube.com/embed/{}", id)),
            Platform::Vimeo => Some(format!("https://player.vimeo.com/video/{}", id)),
            Platform::Dailymotion => Some(format!("https://www.dailymotion.com/embed/video/{}", id)),
            Platform::External => None,
        }
    }

    fn thumbnail_candidates(&self, id: &str) -> Vec<String> {
        match self {
            Platform::YouTube => YOUTUBE_THUMBNAILS
                .iter()
                .map(|size| format!("https://img.youtube.com/vi/{}/{}", id, size))
                .collect(),
            Platform::Dailymotion => vec![format!("https://www.dailymotion.com/thumbnail/video/{}", id)],
            // Vimeo thumbnails need an API call; the UI draws a placeholder instead
            Platform::Vimeo | Platform::External => Vec::new(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First id pattern that matches, checked in YouTube, Vimeo, Dailymotion order
fn capture_id(url: &str) -> Option<(Platform, String)> {
    let patterns: [(Platform, &Regex); 3] = [
        (Platform::YouTube, &*YOUTUBE_REGEX),
        (Platform::Vimeo, &*VIMEO_REGEX),
        (Platform::Dailymotion, &*DAILYMOTION_REGEX),
    ];

    patterns.into_iter().find_map(|(platform, regex)| {
        regex
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| (platform, m.as_str().to_owned()))
    })
}

pub fn extract_video_id(url: &str) -> Option<String> {
    capture_id(url).map(|(_, id)| id)
}

/// Player URL for the link, or the link itself when no id pattern matches
pub fn embed_url(url: &str) -> String {
    capture_id(url)
        .and_then(|(platform, id)| platform.embed_url(&id))
        .unwrap_or_else(|| url.to_string())
}

/// Ordered thumbnail URLs worth probing for this link
pub fn thumbnail_candidates(url: &str) -> Vec<String> {
    match capture_id(url) {
        Some((platform, id)) if platform == Platform::detect(url) => platform.thumbnail_candidates(&id),
        _ => Vec::new(),
    }
}

/// Everything the resolver knows about a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVideo {
    pub platform: Platform,
    pub video_id: Option<String>,
    pub embed_url: String,
    pub thumbnail_candidates: Vec<String>,
}

pub fn resolve(url: &str) -> ResolvedVideo {
    ResolvedVideo {
        platform: Platform::detect(url),
        video_id: extract_video_id(url),
        embed_url: embed_url(url),
        thumbnail_candidates: thumbnail_candidates(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_link() {
        let resolved = resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s");
        assert_eq!(resolved.platform, Platform::YouTube);
        assert_eq!(resolved.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(resolved.embed_url, "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(
            resolved.thumbnail_candidates,
            vec![
                "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
                "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
                "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg",
                "https://img.youtube.com/vi/dQw4w9WgXcQ/sddefault.jpg",
                "https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg",
            ]
        );
    }

    #[test]
    fn youtube_short_link_stops_at_query_and_fragment() {
        assert_eq!(extract_video_id("https://youtu.be/abc123?si=xyz").as_deref(), Some("abc123"));
        assert_eq!(extract_video_id("youtu.be/abc123#t=1").as_deref(), Some("abc123"));
        assert_eq!(embed_url("http://youtu.be/X"), "https://www.youtube.com/embed/X");
        assert_eq!(Platform::detect("http://youtu.be/X"), Platform::YouTube);
    }

    #[test]
    fn vimeo_link_has_no_thumbnail() {
        let resolved = resolve("https://vimeo.com/123456789");
        assert_eq!(resolved.platform, Platform::Vimeo);
        assert_eq!(resolved.video_id.as_deref(), Some("123456789"));
        assert_eq!(resolved.embed_url, "https://player.vimeo.com/video/123456789");
        assert!(resolved.thumbnail_candidates.is_empty());
    }

    #[test]
    fn dailymotion_id_stops_at_underscore() {
        let resolved = resolve("https://www.dailymotion.com/video/abc_xyz");
        assert_eq!(resolved.platform, Platform::Dailymotion);
        assert_eq!(resolved.video_id.as_deref(), Some("abc"));
        assert_eq!(resolved.embed_url, "https://www.dailymotion.com/embed/video/abc");
        assert_eq!(
            resolved.thumbnail_candidates,
            vec!["https://www.dailymotion.com/thumbnail/video/abc"]
        );
    }

    #[test]
    fn unknown_links_pass_through() {
        for url in ["https://example.com/clip.mp4", "not a url at all", ""] {
            let resolved = resolve(url);
            assert_eq!(resolved.platform, Platform::External);
            assert_eq!(resolved.video_id, None);
            assert_eq!(resolved.embed_url, url);
            assert!(resolved.thumbnail_candidates.is_empty());
        }
    }

    #[test]
    fn known_host_without_id_keeps_platform() {
        let url = "https://www.youtube.com/channel/UC123";
        let resolved = resolve(url);
        assert_eq!(resolved.platform, Platform::YouTube);
        assert_eq!(resolved.video_id, None);
        assert_eq!(resolved.embed_url, url);
        assert!(resolved.thumbnail_candidates.is_empty());
    }

    #[test]
    fn platform_serializes_as_display_name() {
        let json = serde_json::to_value(resolve("https://vimeo.com/1")).unwrap();
        assert_eq!(json["platform"], "Vimeo");
        assert_eq!(json["embedUrl"], "https://player.vimeo.com/video/1");
        assert_eq!(json["videoId"], "1");
    }
}
