//! Streams a finished clip back to the caller and cleans up afterward.

use crate::error::ClipError;
use axum::body::{Body, Bytes};
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::Stream;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// File stream that deletes the underlying file when dropped, whether the
/// transfer finished, failed mid-body, or the client went away.
struct CleanupStream {
    inner: ReaderStream<File>,
    path: PathBuf,
}

impl Stream for CleanupStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(Some(Err(e))) = &poll {
            // The response is already partially sent; logging is all that's left.
            tracing::error!("failed to send {:?}: {}", self.path, e);
        }
        poll
    }
}

impl Drop for CleanupStream {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::error!("failed to remove temp file {:?}: {}", self.path, e);
        }
    }
}

/// Build the download response for a finished clip.
///
/// The temp file is removed once the response body is done with it. If the
/// file cannot even be opened, it is removed here and the send fails before
/// any bytes go out.
pub async fn clip_response(path: PathBuf) -> Result<Response, ClipError> {
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ClipError::Delivery(format!(
                "failed to open {}: {}",
                path.display(),
                e
            )));
        }
    };

    let content_length = file.metadata().await.ok().map(|meta| meta.len());
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("clip.mp4")
        .to_string();

    let stream = CleanupStream {
        inner: ReaderStream::new(file),
        path,
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        );
    if let Some(len) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| ClipError::Delivery(e.to_string()))
}
