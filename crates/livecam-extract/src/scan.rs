//! HTML scanning for embeds and manifests.

use std::sync::LazyLock;

use livecam_protocols::EmbedPayload;
use regex::Regex;
use url::Url;

static EMBED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:https?:)?//(?:www\.)?(?:youtube\.com|youtube-nocookie\.com)/embed/([A-Za-z0-9_-]+)[^"'\s<>\\]*"#,
    )
    .unwrap()
});

static SHORT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)//youtu\.be/([A-Za-z0-9_-]{11})").unwrap());

static WATCH_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)youtube\.com/watch\?(?:[^"'\s<>]*?&(?:amp;)?)?v=([A-Za-z0-9_-]{11})"#).unwrap()
});

static ABSOLUTE_MANIFEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//[^"'\s<>()\\]+?\.m3u8(?:\?[^"'\s<>()\\]*)?"#).unwrap()
});

static QUOTED_MANIFEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']([^"'\s<>]+?\.m3u8(?:\?[^"'\s<>]*)?)["']"#).unwrap()
});

/// Undo JS string escaping of slashes and HTML escaping of ampersands.
fn normalize(html: &str) -> String {
    html.replace("\\/", "/").replace("&amp;", "&")
}

fn with_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// Find a hosted-video embed. An embed player URL is kept verbatim; watch
/// and short links only yield the video id.
pub fn find_embed(html: &str) -> Option<EmbedPayload> {
    let html = normalize(html);

    if let Some(caps) = EMBED_URL.captures(&html) {
        return Some(EmbedPayload {
            id: Some(caps[1].to_string()),
            full_url: Some(with_scheme(&caps[0])),
        });
    }

    WATCH_LINK
        .captures(&html)
        .or_else(|| SHORT_LINK.captures(&html))
        .map(|caps| EmbedPayload {
            id: Some(caps[1].to_string()),
            full_url: None,
        })
}

/// Find an HLS manifest URL, resolving relative ones against the page.
pub fn find_manifest(html: &str, page_url: &Url) -> Option<String> {
    let html = normalize(html);

    if let Some(found) = ABSOLUTE_MANIFEST.find(&html) {
        let candidate = found.as_str();
        let absolute = if candidate.starts_with("//") {
            format!("{}:{}", page_url.scheme(), candidate)
        } else {
            candidate.to_string()
        };
        return Some(absolute);
    }

    QUOTED_MANIFEST
        .captures_iter(&html)
        .filter_map(|caps| page_url.join(&caps[1]).ok())
        .find(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
