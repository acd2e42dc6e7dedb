//! Drives the external transcoder to cut a clip out of a resolved stream.

use crate::clip::progress::ProgressRegistry;
use crate::clip::time::format_time;
use crate::error::ClipError;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// One clip-extraction request, ready to hand to the transcoder.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub vod_id: String,
    pub stream_url: String,
    pub start_seconds: u64,
    pub end_seconds: u64,
    pub output_path: PathBuf,
}

impl ClipJob {
    /// Build a job with the deterministic output path
    /// `<temp_dir>/brkk_vod_<id>_<start>_<end>.mp4`.
    pub fn new(
        temp_dir: &str,
        vod_id: &str,
        stream_url: String,
        start_seconds: u64,
        end_seconds: u64,
    ) -> Self {
        let output_path = Path::new(temp_dir).join(format!(
            "brkk_vod_{}_{}_{}.mp4",
            vod_id,
            format_time(start_seconds),
            format_time(end_seconds)
        ));

        Self {
            vod_id: vod_id.to_string(),
            stream_url,
            start_seconds,
            end_seconds,
            output_path,
        }
    }
}

/// Spawns the transcoder process for a job.
///
/// Seam for tests; the real implementation runs ffmpeg with stream-copy
/// arguments and a piped diagnostic stream.
pub trait TranscodeSpawner {
    fn spawn_transcode(
        &self,
        stream_url: &str,
        start: &str,
        duration: &str,
        output_path: &Path,
    ) -> io::Result<Child>;
}

/// Real transcoder invocation: seek, stream-copy, timestamp normalization,
/// overwrite without prompting.
pub struct FfmpegSpawner {
    program: String,
}

impl FfmpegSpawner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TranscodeSpawner for FfmpegSpawner {
    fn spawn_transcode(
        &self,
        stream_url: &str,
        start: &str,
        duration: &str,
        output_path: &Path,
    ) -> io::Result<Child> {
        Command::new(&self.program)
            .arg("-ss")
            .arg(start)
            .arg("-i")
            .arg(stream_url)
            .arg("-t")
            .arg(duration)
            .arg("-c")
            .arg("copy")
            .arg("-avoid_negative_ts")
            .arg("make_zero")
            .arg("-y")
            .arg(output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }
}

/// Parse the `time=HH:MM:SS.ff` marker out of one diagnostic line.
fn scan_position(marker: &Regex, line: &str) -> Option<u64> {
    let caps = marker.captures(line)?;
    let h: u64 = caps[1].parse().ok()?;
    let m: u64 = caps[2].parse().ok()?;
    let s: u64 = caps[3].parse().ok()?;
    Some(h * 3600 + m * 60 + s)
}

/// Cut `job` out of its stream, reporting progress into `registry`.
///
/// The transcoder's diagnostic stream is scanned line-by-line for progress
/// markers; markers are tool-specific, so their absence just means no
/// updates. Success requires a zero exit status and the output file on
/// disk. The registry entry is cleared on every exit path, and dropping the
/// returned future kills the transcoder.
pub async fn extract_clip(
    job: &ClipJob,
    spawner: &impl TranscodeSpawner,
    registry: &ProgressRegistry,
) -> Result<(), ClipError> {
    if job.end_seconds <= job.start_seconds {
        return Err(ClipError::InvalidRange {
            start: job.start_seconds,
            end: job.end_seconds,
        });
    }
    let duration = job.end_seconds - job.start_seconds;

    let progress = registry.track(&job.vod_id);

    let mut child = spawner
        .spawn_transcode(
            &job.stream_url,
            &format_time(job.start_seconds),
            &format_time(duration),
            &job.output_path,
        )
        .map_err(|e| ClipError::Extraction(format!("failed to run transcoder: {}", e)))?;

    let mut diagnostics = String::new();
    if let Some(stderr) = child.stderr.take() {
        let marker = Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})\.\d{2}").unwrap();
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(position) = scan_position(&marker, &line) {
                progress.update(position, duration);
            }
            diagnostics.push_str(&line);
            diagnostics.push('\n');
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| ClipError::Extraction(format!("failed to wait for transcoder: {}", e)))?;

    if status.success() && job.output_path.exists() {
        Ok(())
    } else {
        // A zero exit without an output file is still a failure.
        let _ = tokio::fs::remove_file(&job.output_path).await;
        tracing::error!(
            "transcoder for vod {} failed with {}",
            job.vod_id,
            status
        );
        Err(ClipError::Extraction(diagnostics))
    }
}
