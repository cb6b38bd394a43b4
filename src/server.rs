//! HTTP surface: resolve, download proxy and health endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::extractor::{extract_tweet_id, ResolutionChain, VideoRecord};
use crate::proxy;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ResolutionChain>,
    /// Client used by the proxy. Built without a total request timeout so
    /// long downloads are not cut off mid-stream.
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(chain: Arc<ResolutionChain>, client: reqwest::Client) -> Self {
        Self { chain, client }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/video", post(resolve_video))
        .route("/api/download", get(download_media))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug)]
enum ApiError {
    /// 400 with `{"error": ...}` — the caller can fix the request.
    BadRequest(String),
    /// 500 with `{"success": false, "error": ...}` — resolution exhausted.
    Resolution(String),
    /// 500 with `{"error": ...}` — proxy fetch failed.
    Download(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Resolution(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            ApiError::Download(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
struct VideoResponse {
    success: bool,
    data: VideoRecord,
}

async fn resolve_video(
    State(state): State<AppState>,
    Json(payload): Json<VideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("URL is required".into()));
    }

    let tweet_id =
        extract_tweet_id(url).ok_or_else(|| ApiError::BadRequest("Invalid Twitter URL".into()))?;

    match state.chain.resolve(&tweet_id).await {
        Ok(record) => Ok(Json(VideoResponse {
            success: true,
            data: record,
        })),
        Err(e) => Err(ApiError::Resolution(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    url: Option<String>,
    preview: Option<String>,
}

async fn download_media(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let media_url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL parameter is required".into()))?;

    let force_download = query.preview.as_deref() != Some("true");

    match proxy::stream_media(&state.client, media_url, force_download).await {
        Ok(response) => Ok(response),
        Err(e) => {
            warn!("download proxy failed: {}", e);
            Err(ApiError::Download("Failed to download video".into()))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::extractor::{ExtractError, QualityVariant, SourceAdapter};

    struct StubAdapter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self, _tweet_id: &str) -> Result<VideoRecord, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(VideoRecord {
                title: "clip".into(),
                author: "@jane".into(),
                author_name: "Jane".into(),
                thumbnail: String::new(),
                duration: "0:10".into(),
                qualities: vec![
                    QualityVariant::new("https://video.twimg.com/hi.mp4".into(), 1_200_000),
                    QualityVariant::new("https://video.twimg.com/lo.mp4".into(), 600_000),
                ],
            })
        }
    }

    struct DownAdapter;

    #[async_trait]
    impl SourceAdapter for DownAdapter {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn fetch(&self, _tweet_id: &str) -> Result<VideoRecord, ExtractError> {
            Err(ExtractError::Parse("internal upstream detail".into()))
        }
    }

    fn state_with(adapters: Vec<Box<dyn SourceAdapter>>) -> AppState {
        AppState::new(
            Arc::new(ResolutionChain::with_adapters(adapters)),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn resolve_returns_record_for_valid_url() {
        let state = state_with(vec![Box::new(StubAdapter {
            calls: AtomicUsize::new(0),
        })]);

        let response = resolve_video(
            State(state),
            Json(VideoRequest {
                url: "https://x.com/jane/status/123".into(),
            }),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        let qualities = &response.0.data.qualities;
        assert_eq!(qualities.len(), 2);
        assert_eq!(qualities[0].quality, "720p");
        assert_eq!(qualities[1].quality, "480p");
        assert!(qualities[0].bitrate > qualities[1].bitrate);
    }

    #[tokio::test]
    async fn resolve_rejects_missing_url() {
        let state = state_with(vec![Box::new(StubAdapter {
            calls: AtomicUsize::new(0),
        })]);

        let err = resolve_video(State(state), Json(VideoRequest { url: "  ".into() }))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "URL is required"));
    }

    #[tokio::test]
    async fn resolve_rejects_unrecognized_url() {
        let state = state_with(vec![Box::new(StubAdapter {
            calls: AtomicUsize::new(0),
        })]);

        let err = resolve_video(
            State(state),
            Json(VideoRequest {
                url: "https://youtube.com/watch?v=abc".into(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Invalid Twitter URL"));
    }

    #[tokio::test]
    async fn resolve_exhaustion_hides_adapter_errors() {
        let state = state_with(vec![Box::new(DownAdapter)]);

        let err = resolve_video(
            State(state),
            Json(VideoRequest {
                url: "https://x.com/jane/status/123".into(),
            }),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::Resolution(message) => {
                assert!(message.contains("any source"));
                assert!(!message.contains("internal upstream detail"));
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_requires_url_param() {
        let state = state_with(vec![]);

        let err = download_media(
            State(state),
            Query(DownloadQuery {
                url: None,
                preview: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn download_maps_proxy_failure_to_generic_error() {
        let state = state_with(vec![]);

        // Nothing listens on port 9; the connection is refused immediately.
        let err = download_media(
            State(state),
            Query(DownloadQuery {
                url: Some("http://127.0.0.1:9/clip.mp4".into()),
                preview: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Download(ref m) if m == "Failed to download video"));
    }

    #[tokio::test]
    async fn health_reports_ok_with_timestamp() {
        let body = health().await.0;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_str().is_some());
    }
}
