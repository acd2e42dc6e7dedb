//! Resolves a VOD page URL to a direct media stream URL via an external
//! resolver process.

use crate::error::ClipError;
use async_trait::async_trait;
use std::io;
use std::process::Output;
use tokio::process::Command;

/// Runs the resolver executable for one VOD URL.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ResolverRunner {
    async fn run_resolver(&self, vod_url: &str) -> io::Result<Output>;
}

/// Invokes the configured resolver binary with `-g -f best <url>`, which
/// prints the direct media URL on a single stdout line.
pub struct StreamUrlResolver {
    program: String,
}

impl StreamUrlResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ResolverRunner for StreamUrlResolver {
    async fn run_resolver(&self, vod_url: &str) -> io::Result<Output> {
        Command::new(&self.program)
            .arg("-g")
            .arg("-f")
            .arg("best")
            .arg(vod_url)
            .output()
            .await
    }
}

/// Resolve the direct stream URL for `vod_url`.
///
/// Succeeds only when the resolver exits 0 and printed a URL; anything else
/// surfaces as [`ClipError::Resolution`] carrying the resolver's stderr.
/// No retry and no internal timeout; bounding wall-clock time is the
/// supervisor's job.
pub async fn resolve_stream_url(
    vod_url: &str,
    runner: &impl ResolverRunner,
) -> Result<String, ClipError> {
    let output = runner
        .run_resolver(vod_url)
        .await
        .map_err(|e| ClipError::Resolution(format!("failed to run resolver: {}", e)))?;

    let stream_url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() && !stream_url.is_empty() {
        Ok(stream_url)
    } else {
        Err(ClipError::Resolution(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}
