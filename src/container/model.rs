//! Typed views of the daemon's container representations.
//!
//! Fields default when absent so older daemons and partial answers still
//! decode; anything not modeled stays reachable through the handle's raw
//! snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One element of the container list, in the daemon's order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub created: i64,
    pub state: String,
    pub status: String,
    pub labels: HashMap<String, String>,
}

/// The inspect representation of one container.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub image: String,
    pub state: Option<ContainerState>,
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    pub paused: bool,
    pub exit_code: i64,
    pub started_at: String,
    pub finished_at: String,
}

/// Answer to a create call: the generated identifier plus any daemon
/// warnings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateResponse {
    pub id: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WaitStatus {
    pub status_code: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateReport {
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PruneReport {
    pub containers_deleted: Vec<String>,
    pub space_reclaimed: u64,
}

/// Process table of a running container.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Top {
    pub titles: Vec<String>,
    pub processes: Vec<Vec<String>>,
}

/// One filesystem change relative to the image. Kind 0 modified, 1 added,
/// 2 deleted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FsChange {
    pub path: String,
    pub kind: u8,
}

/// One sample from the stats stream. The daemon emits these keys in
/// lowercase, unlike the rest of the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsSample {
    pub read: String,
    pub cpu_stats: serde_json::Value,
    pub memory_stats: MemoryStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoryStats {
    pub usage: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_tolerate_missing_fields() {
        let details: ContainerDetails = serde_json::from_value(serde_json::json!({
            "Id": "abc",
            "State": { "Status": "running", "Running": true },
        }))
        .unwrap();

        assert_eq!(details.id, "abc");
        assert!(details.created.is_none());
        let state = details.state.unwrap();
        assert!(state.running);
        assert_eq!(state.exit_code, 0);
    }

    #[test]
    fn stats_sample_uses_lowercase_keys() {
        let sample: StatsSample = serde_json::from_str(
            r#"{"read":"2024-01-01T00:00:01Z","memory_stats":{"usage":2048,"limit":4096}}"#,
        )
        .unwrap();
        assert_eq!(sample.memory_stats.usage, 2048);
    }
}
