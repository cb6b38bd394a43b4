//! Tweet resolution: identifier extraction and the ordered source chain.

mod adapter;
mod fxtwitter;
mod syndication;
mod twitsave;
mod types;
mod vxtwitter;

pub use adapter::SourceAdapter;
pub use types::{ExtractError, QualityVariant, VideoRecord};

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use fxtwitter::FxTwitterAdapter;
use syndication::SyndicationAdapter;
use twitsave::TwitsaveAdapter;
use vxtwitter::VxTwitterAdapter;

static STATUS_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.)?(?:twitter\.com|x\.com)/[^/]+/status/(\d+)").unwrap()
});

static RESOLUTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)x(\d+)/").unwrap());

/// Pull the numeric status id out of a tweet URL.
///
/// Accepts `twitter.com` and `x.com` hosts, with or without scheme and
/// `www.`. Anything else is `None`; callers treat that as ordinary input
/// validation, not an error.
pub fn extract_tweet_id(url: &str) -> Option<String> {
    STATUS_URL_REGEX
        .captures(url.trim())
        .map(|caps| caps[1].to_string())
}

/// Estimate a bitrate from the `WxH` token Twitter CDNs embed in video
/// paths. Coarse on purpose: it only has to rank variants and pick a label.
pub(crate) fn bitrate_from_resolution(url: &str) -> Option<u64> {
    let caps = RESOLUTION_REGEX.captures(url)?;
    let width: u64 = caps[1].parse().ok()?;
    Some(if width >= 1280 {
        2_000_000
    } else if width >= 640 {
        1_000_000
    } else {
        500_000
    })
}

/// Monotonically decreasing stand-in bitrate for sources that report none,
/// so ordering and classification still work.
pub(crate) fn rank_bitrate(count: usize, index: usize) -> u64 {
    (count - index) as u64 * 500_000
}

/// Terminal outcome when every source has been tried. The message is the
/// only resolution error users ever see; per-source errors stay in the logs.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unable to fetch video from any source. Please verify the tweet contains a video and is publicly accessible.")]
    Exhausted,
}

/// Ordered fallback chain over the registered sources.
pub struct ResolutionChain {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl ResolutionChain {
    /// Default source set in priority order. The HTML scraper stays last:
    /// its quality inference is heuristic and should only run when every
    /// structured API has failed.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_adapters(vec![
            Box::new(SyndicationAdapter::new(client.clone())),
            Box::new(VxTwitterAdapter::new(client.clone())),
            Box::new(FxTwitterAdapter::new(client.clone())),
            Box::new(TwitsaveAdapter::new(client)),
        ])
    }

    pub fn with_adapters(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Try each source in order and return the first record with at least
    /// one variant. A source error and an empty variant list both advance
    /// to the next source; the first usable record short-circuits the rest.
    pub async fn resolve(&self, tweet_id: &str) -> Result<VideoRecord, ResolveError> {
        for adapter in &self.adapters {
            debug!("trying {} for tweet {}", adapter.name(), tweet_id);

            match adapter.fetch(tweet_id).await {
                Ok(record) if !record.qualities.is_empty() => {
                    info!(
                        "resolved tweet {} via {} ({} variants)",
                        tweet_id,
                        adapter.name(),
                        record.qualities.len()
                    );
                    return Ok(record);
                }
                Ok(_) => warn!("{} returned no variants", adapter.name()),
                Err(e) => warn!("{} failed: {}", adapter.name(), e),
            }
        }

        Err(ResolveError::Exhausted)
    }
}
