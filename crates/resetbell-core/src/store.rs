//! Durable per-guild settings storage.
//!
//! One JSON file per guild id under a root directory. Writes go to a temp
//! file beside the destination and are renamed into place, so readers never
//! observe a partial record. A per-key mutex serializes save/load for one
//! guild; distinct guilds proceed fully in parallel.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::error::StorageError;

/// Returns `~/.config/resetbell[-dev]/` based on RESETBELL_ENV.
///
/// Set RESETBELL_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RESETBELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("resetbell-dev")
    } else {
        base_dir.join("resetbell")
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::CreateRoot {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Durable guild-id to record mapping.
pub struct SettingsStore<T> {
    root: PathBuf,
    locks: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> SettingsStore<T> {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
            _record: PhantomData,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, guild_id: u64) -> PathBuf {
        self.root.join(format!("{guild_id}.json"))
    }

    fn key_lock(&self, guild_id: u64) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("settings lock map poisoned");
        locks.entry(guild_id).or_default().clone()
    }

    /// Atomically persist `value` for `guild_id`.
    pub async fn save(&self, guild_id: u64, value: &T) -> Result<(), StorageError> {
        let gate = self.key_lock(guild_id);
        let _guard = gate.lock().await;

        let path = self.path_for(guild_id);
        let json = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
            path: path.clone(),
            source,
        })?;

        let tmp = self
            .root
            .join(format!("{guild_id}.json.tmp-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StorageError::WriteFailed { path, source })
    }

    /// Load the record for `guild_id`. `Ok(None)` only when no record exists;
    /// a record that fails to deserialize is a `Corrupt` error.
    pub async fn load(&self, guild_id: u64) -> Result<Option<T>, StorageError> {
        let gate = self.key_lock(guild_id);
        let _guard = gate.lock().await;

        let path = self.path_for(guild_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::ReadFailed { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt { path, source })
    }

    /// Enumerate all guild ids with a persisted record.
    pub async fn guild_ids(&self) -> Result<Vec<u64>, StorageError> {
        let mut entries =
            tokio::fs::read_dir(&self.root)
                .await
                .map_err(|source| StorageError::ListFailed {
                    path: self.root.clone(),
                    source,
                })?;

        let mut ids = Vec::new();
        while let Some(entry) =
            entries
                .next_entry()
                .await
                .map_err(|source| StorageError::ListFailed {
                    path: self.root.clone(),
                    source,
                })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct TestRecord {
        enabled: bool,
        channel_id: u64,
        hours_before: u32,
    }

    fn record(channel_id: u64) -> TestRecord {
        TestRecord {
            enabled: true,
            channel_id,
            hours_before: 24,
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store: SettingsStore<TestRecord> = SettingsStore::open(dir.path()).unwrap();

        store.save(42, &record(7)).await.unwrap();
        let loaded = store.load(42).await.unwrap();
        assert_eq!(loaded, Some(record(7)));
    }

    #[tokio::test]
    async fn test_load_unknown_key_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store: SettingsStore<TestRecord> = SettingsStore::open(dir.path()).unwrap();

        assert_eq!(store.load(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error_not_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store: SettingsStore<TestRecord> = SettingsStore::open(dir.path()).unwrap();

        std::fs::write(dir.path().join("7.json"), b"{not json").unwrap();
        let err = store.load(7).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_save_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store: SettingsStore<TestRecord> = SettingsStore::open(dir.path()).unwrap();

        store.save(1, &record(1)).await.unwrap();
        store.save(1, &record(2)).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), Some(record(2)));

        // No temp files left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_guild_ids_lists_only_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        let store: SettingsStore<TestRecord> = SettingsStore::open(dir.path()).unwrap();

        store.save(3, &record(3)).await.unwrap();
        store.save(1, &record(1)).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
        std::fs::write(dir.path().join("abc.json"), b"{}").unwrap();

        assert_eq!(store.guild_ids().await.unwrap(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_to_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<SettingsStore<TestRecord>> =
            Arc::new(SettingsStore::open(dir.path()).unwrap());

        let mut handles = Vec::new();
        for id in 0..16u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.save(id, &record(id)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for id in 0..16u64 {
            assert_eq!(store.load(id).await.unwrap(), Some(record(id)));
        }
    }

    #[tokio::test]
    async fn test_same_key_save_load_never_torn() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<SettingsStore<TestRecord>> =
            Arc::new(SettingsStore::open(dir.path()).unwrap());
        store.save(5, &record(0)).await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for channel in 1..=32u64 {
                    store.save(5, &record(channel)).await.unwrap();
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..32 {
                    // Every read parses cleanly and is one of the writer's values.
                    let loaded = store.load(5).await.unwrap().unwrap();
                    assert!(loaded.channel_id <= 32);
                }
            })
        };
        writer.await.unwrap();
        reader.await.unwrap();
    }
}
