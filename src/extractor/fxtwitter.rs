use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use super::adapter::SourceAdapter;
use super::types::*;
use super::{bitrate_from_resolution, rank_bitrate};
use crate::quality;

const ENDPOINT: &str = "https://api.fxtwitter.com/i/status";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Second fallback. Same shape of limitation as vxtwitter: one URL per
/// video, no bitrate, so the same estimation applies.
pub struct FxTwitterAdapter {
    client: reqwest::Client,
}

impl FxTwitterAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for FxTwitterAdapter {
    fn name(&self) -> &'static str {
        "fxtwitter"
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

        let data: FxResponse = resp
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        parse_payload(data)
    }
}

fn parse_payload(data: FxResponse) -> Result<VideoRecord, ExtractError> {
    let tweet = data.tweet.ok_or(ExtractError::NoMedia)?;
    let videos = tweet
        .media
        .as_ref()
        .map(|m| m.videos.as_slice())
        .unwrap_or_default();

    if videos.is_empty() {
        return Err(ExtractError::NoMedia);
    }

    let count = videos.len();
    let mut qualities: Vec<QualityVariant> = videos
        .iter()
        .enumerate()
        .map(|(index, video)| {
            let bitrate =
                bitrate_from_resolution(&video.url).unwrap_or_else(|| rank_bitrate(count, index));
            QualityVariant::new(video.url.clone(), bitrate)
        })
        .collect();
    qualities.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let (author, author_name) = match &tweet.author {
        Some(author) => (
            format!("@{}", author.screen_name),
            if author.name.is_empty() {
                DEFAULT_AUTHOR_NAME.to_string()
            } else {
                author.name.clone()
            },
        ),
        None => (DEFAULT_AUTHOR.to_string(), DEFAULT_AUTHOR_NAME.to_string()),
    };

    let first = &videos[0];
    let duration = first
        .duration
        .map(|seconds| quality::format_duration((seconds * 1000.0) as u64))
        .unwrap_or_else(|| DEFAULT_DURATION.to_string());

    Ok(VideoRecord {
        title: if tweet.text.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            tweet.text.clone()
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
struct FxResponse {
    tweet: Option<FxTweet>,
}

#[derive(Debug, Deserialize)]
struct FxTweet {
    #[serde(default)]
    text: String,
    author: Option<FxAuthor>,
    media: Option<FxMedia>,
}

#[derive(Debug, Deserialize)]
struct FxAuthor {
    #[serde(default)]
    name: String,
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct FxMedia {
    #[serde(default)]
    videos: Vec<FxVideo>,
}

#[derive(Debug, Deserialize)]
struct FxVideo {
    url: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    duration: Option<f64>,
}
