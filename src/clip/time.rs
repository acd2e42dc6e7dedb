//! Conversions between caller-supplied time values and whole seconds.

use serde::Deserialize;

/// A time value as it appears in request bodies: either raw seconds or a
/// colon-delimited `H:M:S` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    Seconds(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Convert a [`TimeSpec`] to whole seconds.
///
/// Unrecognized shapes log a diagnostic and fall back to 0 instead of
/// failing the request; existing callers rely on this.
pub fn parse_time(spec: &TimeSpec) -> u64 {
    match spec {
        TimeSpec::Seconds(s) if *s >= 0.0 => *s as u64,
        TimeSpec::Seconds(s) => {
            tracing::warn!("invalid time value: {}", s);
            0
        }
        TimeSpec::Text(text) => {
            let text = text.trim();
            if text.contains(':') {
                let parts: Vec<Option<u64>> =
                    text.split(':').map(|part| part.parse().ok()).collect();
                if let [Some(h), Some(m), Some(s)] = parts[..] {
                    return h
                        .saturating_mul(3600)
                        .saturating_add(m.saturating_mul(60))
                        .saturating_add(s);
                }
            } else if let Ok(s) = text.parse::<u64>() {
                return s;
            }
            tracing::warn!("invalid time format: {:?}", text);
            0
        }
        TimeSpec::Other(value) => {
            tracing::warn!("invalid time value: {}", value);
            0
        }
    }
}

/// Format whole seconds as `HH:MM:SS` for the transcoder's command line.
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
