//! Canonical resource identifiers.
//!
//! Two references to the same video must compare equal before they reach the
//! visited registry, so every identifier goes through [`ResourceId::new`] or
//! [`ResourceId::resolve`].

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const WATCH_HOST: &str = "https://www.youtube.com";
const VIDEO_HOSTS: [&str; 4] = ["www.youtube.com", "youtube.com", "m.youtube.com", "youtu.be"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Builds an identifier from a raw value. Absolute URLs are canonicalised,
    /// anything else is kept verbatim (bare video ids, test fixtures).
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Url::parse(trimmed) {
            Ok(url) if url.has_host() => Self(canonicalize(url)),
            _ => Self(trimmed.to_string()),
        }
    }

    /// Resolves a link found on `base` and canonicalises the result.
    pub fn resolve(base: &Url, href: &str) -> Option<Self> {
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            return None;
        }

        let joined = base.join(href).ok()?;
        match joined.scheme() {
            "http" | "https" => Some(Self(canonicalize(joined))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Video id for API lookups: the `v` parameter of a watch URL (short links
    /// are already canonicalised to one), otherwise the identifier itself.
    pub fn video_id(&self) -> String {
        let Ok(url) = Url::parse(&self.0) else {
            return self.0.clone();
        };
        url.query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| self.0.clone())
    }

    /// Watch URL for a bare video id.
    pub fn watch_url(base: &Url, video_id: &str) -> Option<Self> {
        let mut url = base.join("/watch").ok()?;
        url.query_pairs_mut().clear().append_pair("v", video_id);
        Some(Self(canonicalize(url)))
    }

    /// Moves a video reference onto `base`: bare ids and watch URLs on a
    /// known video host (or on `base` itself) become `base`'s watch URL.
    /// Anything else is returned unchanged.
    pub fn rebase(&self, base: &Url) -> Self {
        if self.is_empty() {
            return self.clone();
        }

        let video = match Url::parse(&self.0) {
            Err(_) => Some(self.0.clone()),
            Ok(url) => {
                let on_video_host = url.host_str().is_some_and(|h| VIDEO_HOSTS.contains(&h))
                    || url.origin() == base.origin();
                if on_video_host && url.path() == "/watch" {
                    url.query_pairs()
                        .find(|(k, _)| k == "v")
                        .map(|(_, v)| v.into_owned())
                } else {
                    None
                }
            }
        };

        video
            .and_then(|video| Self::watch_url(base, &video))
            .unwrap_or_else(|| self.clone())
    }
}

fn canonicalize(mut url: Url) -> String {
    url.set_fragment(None);

    if url.host_str() == Some("youtu.be") {
        let id = url.path().trim_start_matches('/').to_string();
        if !id.is_empty() {
            return format!("{}/watch?v={}", WATCH_HOST, id);
        }
    }

    if url.path() == "/watch" {
        let video = url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned());
        if let Some(video) = video {
            url.query_pairs_mut().clear().append_pair("v", &video);
        }
    }

    url.to_string()
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ResourceId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}
