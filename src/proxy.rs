//! Streaming pass-through for resolved media URLs.
//!
//! The browser cannot fetch `video.twimg.com` assets directly: the CDN
//! checks Referer and User-Agent and the response carries no CORS headers.
//! This module re-serves the byte stream under our own origin instead.

use axum::body::Body;
use axum::http::header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use reqwest::header::{REFERER, USER_AGENT};
use thiserror::Error;
use url::Url;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MEDIA_REFERER: &str = "https://twitter.com/";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid media url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Upstream(reqwest::StatusCode),
}

/// Fetch `media_url` with spoofed browser headers and re-stream the bytes.
///
/// Bytes are piped through chunk by chunk, never buffered whole. With
/// `force_download` the response carries an attachment disposition so the
/// browser saves instead of playing inline.
pub async fn stream_media(
    client: &reqwest::Client,
    media_url: &str,
    force_download: bool,
) -> Result<Response, ProxyError> {
    let parsed =
        Url::parse(media_url).map_err(|_| ProxyError::InvalidUrl(media_url.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ProxyError::InvalidUrl(media_url.to_string()));
    }

    let upstream = client
        .get(parsed)
        .header(USER_AGENT, BROWSER_UA)
        .header(REFERER, MEDIA_REFERER)
        .send()
        .await?;

    if !upstream.status().is_success() {
        return Err(ProxyError::Upstream(upstream.status()));
    }

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(length) = upstream.content_length() {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }
    if force_download {
        if let Ok(value) = HeaderValue::from_str(&attachment_disposition()) {
            headers.insert(CONTENT_DISPOSITION, value);
        }
    }

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    Ok((headers, Body::from_stream(stream)).into_response())
}

fn attachment_disposition() -> String {
    format!(
        "attachment; filename=\"twitter-video-{}.mp4\"",
        chrono::Utc::now().timestamp_millis()
    )
}
