use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality;

pub const DEFAULT_TITLE: &str = "Twitter Video";
pub const DEFAULT_AUTHOR: &str = "@TwitterUser";
pub const DEFAULT_AUTHOR_NAME: &str = "Twitter User";
pub const DEFAULT_DURATION: &str = "0:00";

/// Soft failure from a single source. The chain logs these and moves on;
/// none of them ever reaches the API response.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Upstream(reqwest::StatusCode),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no downloadable video in tweet")]
    NoMedia,
}

/// One downloadable rendition of the video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityVariant {
    pub url: String,
    pub bitrate: u64,
    pub quality: String,
    pub size: String,
}

impl QualityVariant {
    /// Variant with the label derived from the bitrate.
    pub fn new(url: String, bitrate: u64) -> Self {
        Self::with_label(url, bitrate, quality::label_for_bitrate(bitrate))
    }

    /// Variant with an explicit label, for sources where the bitrate is a
    /// rank-based guess rather than a reported number.
    pub fn with_label(url: String, bitrate: u64, label: &str) -> Self {
        Self {
            url,
            bitrate,
            quality: label.to_string(),
            size: quality::estimated_size_label(bitrate),
        }
    }
}

/// Normalized, source-agnostic description of a tweet's video.
///
/// Invariant: `qualities` is sorted descending by bitrate and a record with
/// no variants is never returned as a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub title: String,
    pub author: String,
    pub author_name: String,
    pub thumbnail: String,
    pub duration: String,
    pub qualities: Vec<QualityVariant>,
}
