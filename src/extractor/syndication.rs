use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;

use super::adapter::SourceAdapter;
use super::types::*;
use crate::quality;

const ENDPOINT: &str = "https://cdn.syndication.twimg.com/tweet-result";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Primary source: the tweet embed CDN. Public tweets only, but it reports
/// real per-variant bitrates, so it gives the best quality list.
pub struct SyndicationAdapter {
    client: reqwest::Client,
}

impl SyndicationAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for SyndicationAdapter {
    fn name(&self) -> &'static str {
        "syndication"
    }

    async fn fetch(&self, tweet_id: &str) -> Result<VideoRecord, ExtractError> {
        let url = format!(
            "{}?id={}&lang=en&token={}",
            ENDPOINT,
            tweet_id,
            syndication_token(tweet_id)
        );

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_UA)
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, "https://platform.twitter.com/")
            .header(ORIGIN, "https://platform.twitter.com")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ExtractError::Upstream(resp.status()));
        }

        let data: SyndicationResponse = resp
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        parse_payload(data)
    }
}

/// The CDN rejects requests whose `token` does not match the tweet id:
/// `(id / 1e15) * pi` rendered base-36 with zeros and the radix point
/// stripped.
fn syndication_token(tweet_id: &str) -> String {
    const TABLE: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let id: f64 = tweet_id.parse().unwrap_or(0.0);
    let value = (id / 1e15) * std::f64::consts::PI;

    let mut digits = Vec::new();
    let mut integer = value.trunc() as u64;
    while integer > 0 {
        digits.push(TABLE[(integer % 36) as usize]);
        integer /= 36;
    }
    digits.reverse();

    let mut fraction = value.fract();
    for _ in 0..8 {
        fraction *= 36.0;
        digits.push(TABLE[(fraction.trunc() as usize) % 36]);
        fraction = fraction.fract();
    }

    digits.retain(|d| *d != b'0');
    String::from_utf8(digits).unwrap_or_default()
}

fn parse_payload(data: SyndicationResponse) -> Result<VideoRecord, ExtractError> {
    let media = data
        .media_details
        .iter()
        .flatten()
        .find(|m| m.r#type == "video" || m.r#type == "animated_gif")
        .ok_or(ExtractError::NoMedia)?;

    let video_info = media.video_info.as_ref().ok_or(ExtractError::NoMedia)?;

    let mut qualities: Vec<QualityVariant> = video_info
        .variants
        .iter()
        .filter(|v| v.content_type == "video/mp4")
        .map(|v| QualityVariant::new(v.url.clone(), v.bitrate.unwrap_or(0)))
        .collect();

    if qualities.is_empty() {
        return Err(ExtractError::NoMedia);
    }
    qualities.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let (author, author_name) = match &data.user {
        Some(user) => (format!("@{}", user.screen_name), user.name.clone()),
        None => (DEFAULT_AUTHOR.to_string(), DEFAULT_AUTHOR_NAME.to_string()),
    };

    Ok(VideoRecord {
        title: if data.text.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            data.text.clone()
        },
        author,
        author_name,
        thumbnail: media.media_url_https.clone(),
        duration: quality::format_duration(video_info.duration_millis),
        qualities,
    })
}

// ============ Response structs ============

#[derive(Debug, Deserialize)]
struct SyndicationResponse {
    #[serde(default)]
    text: String,
    user: Option<SyndicationUser>,
    #[serde(rename = "mediaDetails")]
    media_details: Option<Vec<SyndicationMedia>>,
}

#[derive(Debug, Deserialize)]
struct SyndicationUser {
    #[serde(default)]
    name: String,
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct SyndicationMedia {
    r#type: String,
    #[serde(default)]
    media_url_https: String,
    video_info: Option<SyndicationVideoInfo>,
}

#[derive(Debug, Deserialize)]
struct SyndicationVideoInfo {
    #[serde(default)]
    duration_millis: u64,
    variants: Vec<SyndicationVariant>,
}

#[derive(Debug, Deserialize)]
struct SyndicationVariant {
    #[serde(default)]
    bitrate: Option<u64>,
    content_type: String,
    url: String,
}
