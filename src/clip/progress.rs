//! Process-wide map of in-flight jobs to their latest transcode progress.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Latest observed transcode position for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Total clip duration in seconds
    pub duration: u64,
    /// Seconds processed so far
    pub current: u64,
}

/// Shared registry of per-job progress, keyed by vod id.
///
/// Writers go through a [`ProgressGuard`]; the entry is removed when the
/// guard drops, so a job that dies on any path still leaves the map clean.
#[derive(Clone, Default)]
pub struct ProgressRegistry {
    jobs: Arc<Mutex<HashMap<String, ProgressSnapshot>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot for a job, if one is being tracked.
    pub fn get(&self, vod_id: &str) -> Option<ProgressSnapshot> {
        self.jobs.lock().unwrap().get(vod_id).copied()
    }

    /// Begin tracking a job. The returned guard is the only writer handle.
    pub fn track(&self, vod_id: &str) -> ProgressGuard {
        ProgressGuard {
            registry: self.clone(),
            vod_id: vod_id.to_string(),
        }
    }

    fn set(&self, vod_id: &str, snapshot: ProgressSnapshot) {
        self.jobs
            .lock()
            .unwrap()
            .insert(vod_id.to_string(), snapshot);
    }

    fn clear(&self, vod_id: &str) {
        self.jobs.lock().unwrap().remove(vod_id);
    }
}

/// Writer handle for one job's registry entry.
pub struct ProgressGuard {
    registry: ProgressRegistry,
    vod_id: String,
}

impl ProgressGuard {
    /// Record the latest transcode position. `current` is clamped to
    /// `duration` and never moves backward.
    pub fn update(&self, current: u64, duration: u64) {
        let mut current = current.min(duration);
        if let Some(prev) = self.registry.get(&self.vod_id) {
            current = current.max(prev.current);
        }
        self.registry
            .set(&self.vod_id, ProgressSnapshot { duration, current });
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.registry.clear(&self.vod_id);
    }
}
