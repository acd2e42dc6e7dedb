//! Environment configuration for the clip service.

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Scratch directory for clip output files
    pub temp_dir: String,
    /// Stream URL resolver executable
    pub resolver_bin: String,
    /// Transcoder executable
    pub ffmpeg_bin: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            temp_dir: env::var("TEMP_DIR").unwrap_or_else(|_| String::from("/tmp")),
            resolver_bin: env::var("RESOLVER_BIN").unwrap_or_else(|_| String::from("youtube-dl")),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| String::from("ffmpeg")),
        }
    }
}
