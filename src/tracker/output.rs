use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::selection::{CandidateResult, SelectedStrike};
use super::window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    Active,
    Stopped,
}

/// One tracking thread as the dashboard reads it
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSnapshot {
    pub timeframe: String,
    pub start_time: String,
    pub end_time: String,
    pub status: TrackingStatus,
    pub samples: usize,
    pub last_update: String,
    pub ce_strike: Option<SelectedStrike>,
    pub pe_strike: Option<SelectedStrike>,
}

impl ThreadSnapshot {
    pub fn new(
        window: &TimeWindow,
        status: TrackingStatus,
        samples: usize,
        result: CandidateResult,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            timeframe: window.label(),
            start_time: window.start.to_string(),
            end_time: window.end.to_string(),
            status,
            samples,
            last_update: now.format("%H:%M:%S").to_string(),
            ce_strike: result.call,
            pe_strike: result.put,
        }
    }
}

/// `<dir>/debug_tracking_<YYYYMMDD>.json`
pub fn output_path(dir: impl AsRef<Path>, now: DateTime<Local>) -> PathBuf {
    dir.as_ref()
        .join(format!("debug_tracking_{}.json", now.format("%Y%m%d")))
}

/// Replace the output document with `{thread_id: snapshot}`.
///
/// Written to a sibling temp file and renamed into place, so readers only ever
/// see a complete document.
pub fn write_snapshot(path: &Path, thread_id: &str, snapshot: &ThreadSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let mut document = BTreeMap::new();
    document.insert(thread_id, snapshot);
    let body = serde_json::to_string_pretty(&document)?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;

    Ok(())
}
