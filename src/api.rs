//! HTTP surface: progress polling and the download pipeline.

use crate::clip::delivery::clip_response;
use crate::clip::extractor::{extract_clip, ClipJob, FfmpegSpawner};
use crate::clip::progress::ProgressRegistry;
use crate::clip::resolver::{resolve_stream_url, StreamUrlResolver};
use crate::clip::time::{parse_time, TimeSpec};
use crate::config::Config;
use crate::error::ClipError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: ProgressRegistry,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/downloadprogress/:vod_id", get(download_progress))
        .route("/api/downloadvod", post(download_vod))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub vod_id: String,
    pub vod_url: Option<String>,
    pub start: Option<TimeSpec>,
    pub end: Option<TimeSpec>,
}

/// Wraps [`ClipError`] for the wire: 400 for missing input, 500 for
/// everything else, both as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(ClipError);

impl From<ClipError> for ApiError {
    fn from(err: ClipError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ClipError::MissingInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("request failed: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// `GET /api/downloadprogress/:vod_id`. Always 200; untracked jobs report 0.
async fn download_progress(
    State(state): State<AppState>,
    Path(vod_id): Path<String>,
) -> Json<serde_json::Value> {
    match state.registry.get(&vod_id) {
        Some(snapshot) => Json(json!({ "progress": snapshot })),
        None => Json(json!({ "progress": 0 })),
    }
}

/// `POST /api/downloadvod`. Resolves, clips, and streams back one VOD segment.
async fn download_vod(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    let vod_url = request
        .vod_url
        .filter(|url| !url.is_empty())
        .ok_or(ClipError::MissingInput("VOD URL"))?;

    tracing::info!(vod_id = %request.vod_id, vod_url = %vod_url, "received download request");

    let resolver = StreamUrlResolver::new(&state.config.resolver_bin);
    let stream_url = resolve_stream_url(&vod_url, &resolver).await?;
    tracing::info!(vod_id = %request.vod_id, "resolved stream URL");

    let start = request.start.as_ref().map(parse_time).unwrap_or(0);
    let end = request.end.as_ref().map(parse_time).unwrap_or(0);

    let job = ClipJob::new(
        &state.config.temp_dir,
        &request.vod_id,
        stream_url,
        start,
        end,
    );

    let spawner = FfmpegSpawner::new(&state.config.ffmpeg_bin);
    extract_clip(&job, &spawner, &state.registry).await?;
    tracing::info!(vod_id = %request.vod_id, output = %job.output_path.display(), "clip ready");

    Ok(clip_response(job.output_path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn test_state(temp_dir: &str, resolver_bin: &str, ffmpeg_bin: &str) -> AppState {
        AppState {
            config: Config {
                addr: String::from("127.0.0.1"),
                port: String::from("0"),
                temp_dir: temp_dir.to_string(),
                resolver_bin: resolver_bin.to_string(),
                ffmpeg_bin: ffmpeg_bin.to_string(),
            },
            registry: ProgressRegistry::new(),
        }
    }

    fn write_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn download_request(vod_url: Option<&str>, start: &str, end: &str) -> DownloadRequest {
        DownloadRequest {
            vod_id: String::from("vod1"),
            vod_url: vod_url.map(String::from),
            start: Some(TimeSpec::Text(start.to_string())),
            end: Some(TimeSpec::Text(end.to_string())),
        }
    }

    async fn error_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_progress_untracked_reports_zero() {
        let state = test_state("/tmp", "youtube-dl", "ffmpeg");
        let Json(body) =
            download_progress(State(state), Path(String::from("nope"))).await;
        assert_eq!(body, json!({ "progress": 0 }));
    }

    #[tokio::test]
    async fn test_progress_tracked_reports_snapshot() {
        let state = test_state("/tmp", "youtube-dl", "ffmpeg");
        let guard = state.registry.track("vod1");
        guard.update(10, 60);

        let Json(body) =
            download_progress(State(state.clone()), Path(String::from("vod1"))).await;
        assert_eq!(
            body,
            json!({ "progress": { "duration": 60, "current": 10 } })
        );
    }

    #[tokio::test]
    async fn test_missing_vod_url_is_bad_request() {
        // Binaries that would fail loudly if anything were spawned.
        let state = test_state("/tmp", "/nonexistent/resolver", "/nonexistent/ffmpeg");
        let request = download_request(None, "00:00:00", "00:01:00");

        let err = download_vod(State(state), Json(request)).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"], "VOD URL not provided");
    }

    #[tokio::test]
    async fn test_empty_vod_url_is_bad_request() {
        let state = test_state("/tmp", "/nonexistent/resolver", "/nonexistent/ffmpeg");
        let request = download_request(Some(""), "00:00:00", "00:01:00");

        let err = download_vod(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_server_error_and_registry_untouched() {
        let dir = tempdir().unwrap();
        let resolver = write_script(
            dir.path(),
            "resolver.sh",
            "#!/bin/sh\necho 'ERROR: unsupported URL' >&2\nexit 1\n",
        );
        let state = test_state(
            dir.path().to_str().unwrap(),
            resolver.to_str().unwrap(),
            "/nonexistent/ffmpeg",
        );
        let request = download_request(Some("https://example.com/videos/1"), "0", "60");

        let err = download_vod(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = error_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("ERROR: unsupported URL"));
        assert_eq!(state.registry.get("vod1"), None);
    }

    #[tokio::test]
    async fn test_invalid_range_is_server_error() {
        let dir = tempdir().unwrap();
        let resolver = write_script(
            dir.path(),
            "resolver.sh",
            "#!/bin/sh\necho 'https://cdn.example.com/stream.m3u8'\n",
        );
        let state = test_state(
            dir.path().to_str().unwrap(),
            resolver.to_str().unwrap(),
            "/nonexistent/ffmpeg",
        );
        let request =
            download_request(Some("https://example.com/videos/1"), "00:02:00", "00:01:00");

        let err = download_vod(State(state), Json(request)).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = error_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid duration"));
    }

    #[tokio::test]
    async fn test_download_pipeline_round_trip() {
        let dir = tempdir().unwrap();
        let resolver = write_script(
            dir.path(),
            "resolver.sh",
            "#!/bin/sh\necho 'https://cdn.example.com/stream.m3u8'\n",
        );
        // Records its arguments, emits one progress marker, writes the clip.
        let ffmpeg = write_script(
            dir.path(),
            "ffmpeg.sh",
            "#!/bin/sh\nfor last\ndo :\ndone\necho \"$@\" > \"$last.args\"\nprintf 'time=00:00:30.00\\n' >&2\nprintf 'clip-bytes' > \"$last\"\n",
        );
        let state = test_state(
            dir.path().to_str().unwrap(),
            resolver.to_str().unwrap(),
            ffmpeg.to_str().unwrap(),
        );
        let request =
            download_request(Some("https://example.com/videos/1"), "00:01:00", "00:02:00");

        let response = download_vod(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, bytes::Bytes::from_static(b"clip-bytes"));

        let output_path = dir.path().join("brkk_vod_vod1_00:01:00_00:02:00.mp4");
        assert!(!output_path.exists());
        assert_eq!(state.registry.get("vod1"), None);

        // Seek offset is the start time; -t is the clip duration, not the end.
        let args = fs::read_to_string(dir.path().join(format!(
            "{}.args",
            output_path.display()
        )))
        .unwrap();
        assert!(args.contains("-ss 00:01:00"));
        assert!(args.contains("-i https://cdn.example.com/stream.m3u8"));
        assert!(args.contains("-t 00:01:00"));
        assert!(args.contains("-c copy"));
        assert!(args.contains("-avoid_negative_ts make_zero"));
        assert!(args.contains("-y"));
    }
}
