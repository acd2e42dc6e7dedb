//! Vodclip - VOD Clip Extraction Service
//!
//! One request runs the whole pipeline:
//! resolve the direct stream URL -> cut the requested range with the
//! transcoder (stream copy) -> stream the file back and delete it.
//! A separate endpoint polls the progress of a running transcode.

pub mod api;
pub mod clip;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use clip::{ProgressRegistry, ProgressSnapshot};
pub use config::Config;
pub use error::ClipError;
