//! The clip pipeline: time codec, stream resolution, extraction, progress
//! tracking, and delivery.

pub mod delivery;
pub mod extractor;
pub mod progress;
pub mod resolver;
pub mod time;

pub use extractor::{extract_clip, ClipJob, FfmpegSpawner};
pub use progress::{ProgressRegistry, ProgressSnapshot};
pub use resolver::{resolve_stream_url, StreamUrlResolver};
pub use time::{format_time, parse_time, TimeSpec};
