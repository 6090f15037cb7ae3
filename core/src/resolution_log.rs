//! Logging and metrics for link resolution outcomes
use crate::uri::LinkType;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionOutcome {
    Resolved,
    /// Resolved only after retrying with a more general link type
    ResolvedByFallback,
    Unresolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub uri: String,
    pub link_type: LinkType,
    pub publication_id: u32,
    pub outcome: ResolutionOutcome,
}

impl ResolutionLogEntry {
    pub fn new(
        uri: impl Into<String>,
        link_type: LinkType,
        publication_id: u32,
        outcome: ResolutionOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            uri: uri.into(),
            link_type,
            publication_id,
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetrics {
    pub total_requests: u64,
    pub resolved: u64,
    pub unresolved: u64,
    pub fallback_attempts: u64,
    pub fallback_successes: u64,
    pub batches: u64,
    pub by_link_type: HashMap<String, u64>,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, link_type: LinkType, outcome: ResolutionOutcome) {
        self.total_requests += 1;
        *self
            .by_link_type
            .entry(link_type.as_str().to_string())
            .or_insert(0) += 1;

        match outcome {
            ResolutionOutcome::Resolved => self.resolved += 1,
            ResolutionOutcome::ResolvedByFallback => {
                self.resolved += 1;
                self.record_fallback(true);
            }
            ResolutionOutcome::Unresolved => self.unresolved += 1,
        }
    }

    pub fn record_fallback(&mut self, success: bool) {
        self.fallback_attempts += 1;
        if success {
            self.fallback_successes += 1;
        }
    }

    pub fn record_batch(&mut self) {
        self.batches += 1;
    }

    pub fn resolution_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total_requests as f64
        }
    }

    pub fn fallback_success_rate(&self) -> f64 {
        if self.fallback_attempts == 0 {
            0.0
        } else {
            self.fallback_successes as f64 / self.fallback_attempts as f64
        }
    }
}

/// Writes resolution outcomes as JSON lines and keeps running metrics
pub struct ResolutionLogger {
    log_file: Mutex<Option<BufWriter<File>>>,
    metrics: Mutex<ResolutionMetrics>,
}

impl ResolutionLogger {
    pub fn new() -> Self {
        Self {
            log_file: Mutex::new(None),
            metrics: Mutex::new(ResolutionMetrics::new()),
        }
    }

    /// Append entries to a JSONL file from now on
    pub fn init_file_logging<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        if let Ok(mut guard) = self.log_file.lock() {
            *guard = Some(BufWriter::new(file));
        }
        Ok(())
    }

    pub fn log_outcome(&self, entry: &ResolutionLogEntry) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(writer) = guard.as_mut() {
                if let Ok(json) = serde_json::to_string(entry) {
                    if let Err(error) = writeln!(writer, "{}", json).and_then(|_| writer.flush()) {
                        log::warn!("failed to write resolution log entry: {}", error);
                    }
                }
            }
        }

        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_outcome(entry.link_type, entry.outcome);
        }
    }

    /// A fallback retry that still did not resolve
    pub fn log_failed_fallback(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_fallback(false);
        }
    }

    pub fn log_batch(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_batch();
        }
    }

    pub fn get_metrics(&self) -> ResolutionMetrics {
        self.metrics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn reset_metrics(&self) {
        if let Ok(mut guard) = self.metrics.lock() {
            *guard = ResolutionMetrics::new();
        }
    }

    pub fn export_metrics_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.get_metrics())
    }
}

impl Default for ResolutionLogger {
    fn default() -> Self {
        Self::new()
    }
}

static RESOLUTION_LOGGER: Lazy<Arc<ResolutionLogger>> =
    Lazy::new(|| Arc::new(ResolutionLogger::new()));

/// Get the process-wide resolution logger
pub fn resolution_logger() -> Arc<ResolutionLogger> {
    Arc::clone(&RESOLUTION_LOGGER)
}

pub fn init_resolution_logging<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    resolution_logger().init_file_logging(path)
}

/// Daily log file under the platform's local data directory
pub fn default_resolution_log_path() -> PathBuf {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    resolution_log_path_in(&data_dir)
}

/// Today's log file below `data_dir`; the log directory is created if missing
pub fn resolution_log_path_in(data_dir: &Path) -> PathBuf {
    let log_dir = data_dir.join("link-resolver").join("logs");
    std::fs::create_dir_all(&log_dir).ok();

    let timestamp = chrono::Local::now().format("%Y%m%d");
    log_dir.join(format!("link-resolution-{}.jsonl", timestamp))
}
