use async_trait::async_trait;

use super::types::{ExtractError, VideoRecord};

/// One strategy for resolving a tweet id against a specific upstream.
///
/// Implementations perform a single outbound request and normalize the
/// response into a [`VideoRecord`]. Anything that goes wrong is reported as
/// an [`ExtractError`] so the chain can fall through to the next source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch and normalize the video description for a tweet id.
    async fn fetch(&self, tweet_id: &str) -> Result<VideoRecord, ExtractError>;
}
