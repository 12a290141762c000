// src/portal/media.rs

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static MEDIA_CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("figure.ilc_media_cont_MediaContainer").unwrap());
static VIDEO_SOURCE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video.ilPageVideo source[src]").unwrap());
static MOB_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mobs/mm_\d+/([^?]+)\?il_wac_token").unwrap());

/// A video embedded into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// File name of the video source. Captions are ignored; the file name
    /// is what the portal serves the video under.
    pub name: String,
    pub url: Url,
}

/// Collects every playable video of the page's media containers.
pub fn parse_media_containers(doc: &Html, base_url: &Url) -> Vec<MediaItem> {
    doc.select(&MEDIA_CONTAINER_SEL)
        .filter_map(|container| parse_video(container, base_url))
        .collect()
}

/// Returns `None` for containers without a video player (images, audio, ...).
pub fn parse_video(container: ElementRef<'_>, base_url: &Url) -> Option<MediaItem> {
    let src = container
        .select(&VIDEO_SOURCE_SEL)
        .find_map(|source| source.value().attr("src"))
        .filter(|src| !src.trim().is_empty())?;
    let url = base_url.join(src).ok()?;

    let name = MOB_NAME_RE
        .captures(src)
        .map(|caps| caps[1].to_string())
        .or_else(|| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })?;

    Some(MediaItem { name, url })
}
