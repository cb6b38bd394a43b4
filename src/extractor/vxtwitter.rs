use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use super::adapter::SourceAdapter;
use super::types::*;
use super::{bitrate_from_resolution, rank_bitrate};
use crate::quality;

const ENDPOINT: &str = "https://api.vxtwitter.com/i/status";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// First fallback. The vxtwitter API serves one direct URL per media item
/// with no bitrate, so bitrates are estimated from the resolution token in
/// the URL path and rank order otherwise.
pub struct VxTwitterAdapter {
    client: reqwest::Client,
}

impl VxTwitterAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for VxTwitterAdapter {
    fn name(&self) -> &'static str {
        "vxtwitter"
    }

    async fn fetch(&self, tweet_id: &str) -> Result<VideoRecord, ExtractError> {
        let url = format!("{}/{}", ENDPOINT, tweet_id);

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_UA)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ExtractError::Upstream(resp.status()));
        }

        let data: VxResponse = resp
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        parse_payload(data)
    }
}

fn parse_payload(data: VxResponse) -> Result<VideoRecord, ExtractError> {
    let videos: Vec<&VxMedia> = data
        .media_extended
        .iter()
        .filter(|m| m.r#type == "video" || m.r#type == "gif")
        .collect();

    if videos.is_empty() {
        return Err(ExtractError::NoMedia);
    }

    let count = videos.len();
    let mut qualities: Vec<QualityVariant> = videos
        .iter()
        .enumerate()
        .map(|(index, media)| {
            let bitrate =
                bitrate_from_resolution(&media.url).unwrap_or_else(|| rank_bitrate(count, index));
            QualityVariant::new(media.url.clone(), bitrate)
        })
        .collect();
    qualities.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let author = if data.user_screen_name.is_empty() {
        DEFAULT_AUTHOR.to_string()
    } else {
        format!("@{}", data.user_screen_name)
    };
    let author_name = if data.user_name.is_empty() {
        DEFAULT_AUTHOR_NAME.to_string()
    } else {
        data.user_name.clone()
    };

    let first = videos[0];
    let duration = first
        .duration_millis
        .map(|millis| quality::format_duration(millis as u64))
        .unwrap_or_else(|| DEFAULT_DURATION.to_string());

    Ok(VideoRecord {
        title: if data.text.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            data.text.clone()
        },
        author,
        author_name,
        thumbnail: first.thumbnail_url.clone(),
        duration,
        qualities,
    })
}

// ============ Response structs ============

#[derive(Debug, Deserialize)]
struct VxResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    user_screen_name: String,
    #[serde(default)]
    media_extended: Vec<VxMedia>,
}

#[derive(Debug, Deserialize)]
struct VxMedia {
    r#type: String,
    url: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    duration_millis: Option<f64>,
}
