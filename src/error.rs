//! Error types for the clip pipeline.

use std::fmt;

/// Everything that can go wrong between receiving a download request and
/// handing the finished clip back.
#[derive(Debug)]
pub enum ClipError {
    /// A required request field was missing.
    MissingInput(&'static str),
    /// The resolver process failed or produced no URL.
    Resolution(String),
    /// The requested range has a non-positive duration.
    InvalidRange { start: u64, end: u64 },
    /// The transcoder failed or did not produce the output file.
    Extraction(String),
    /// The finished clip could not be sent back.
    Delivery(String),
}

impl fmt::Display for ClipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipError::MissingInput(field) => write!(f, "{} not provided", field),
            ClipError::Resolution(e) => write!(f, "Failed to get stream URL: {}", e),
            ClipError::InvalidRange { start, end } => write!(
                f,
                "Invalid duration: end time ({}s) must be greater than start time ({}s)",
                end, start
            ),
            ClipError::Extraction(e) => write!(f, "Failed to process VOD: {}", e),
            ClipError::Delivery(e) => write!(f, "Failed to send VOD: {}", e),
        }
    }
}

impl std::error::Error for ClipError {}
