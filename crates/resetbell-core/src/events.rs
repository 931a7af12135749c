//! Event records and their source.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One limited-time or permanent event as supplied by the source.
/// Immutable once fetched; identity for deduplication is `(name, url)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub url: String,
    pub starts_at: NaiveDateTime,
    /// `None` for open-ended events ("until further notice").
    pub ends_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub permanent: bool,
}

/// Drop duplicate records (same name and url), keeping first-seen order.
pub fn dedup_events(records: Vec<EventRecord>) -> Vec<EventRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.name.clone(), r.url.clone())))
        .collect()
}

/// Supplies the current event snapshot.
///
/// `None` means the source failed; callers must treat that differently from
/// an empty list (skip the cycle, keep previously derived state).
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_current_events(&self) -> Option<Vec<EventRecord>>;
}

/// Content fingerprint of a snapshot: normalized `name|url|end` lines,
/// deduplicated and sorted, hashed with SHA-256. Stable across record order,
/// so two fetches of unchanged data compare equal cheaply.
pub fn snapshot_fingerprint(records: &[EventRecord]) -> String {
    let mut lines: Vec<String> = records
        .iter()
        .map(|r| {
            let end = r
                .ends_at
                .map(|e| e.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_else(|| "open".to_string());
            format!("{}|{}|{}", r.name.trim(), r.url.trim(), end)
        })
        .collect();
    lines.sort_unstable();
    lines.dedup();

    let mut hasher = Sha256::new();
    hasher.update(lines.join("\n").as_bytes());
    hex::encode(hasher.finalize())
}
