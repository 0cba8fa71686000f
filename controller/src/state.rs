use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use scenekick_common::{
    Journal, RequestMailbox, RuntimeConfig, SceneDirectory, SceneRef, ScheduleEntry, ScheduleTable,
};

use crate::{clock::Clock, scene::SceneExecutor};

const STORE_VERSION: u32 = 1;

/// Shared handles passed to every task at startup. All mutable state lives
/// behind its own lock; entries are only ever replaced whole, never mutated
/// field by field across an await point.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    pub table: Arc<Mutex<ScheduleTable>>,
    pub directory: Arc<Mutex<SceneDirectory>>,
    pub journal: Arc<Mutex<Journal>>,
    pub mailbox: Arc<Mutex<RequestMailbox>>,
    pub clock: Arc<Clock>,
    pub executor: Arc<dyn SceneExecutor>,
    pub store: AppStore,
}

impl AppState {
    pub async fn journal_record(&self, message: impl AsRef<str>) {
        self.journal
            .lock()
            .await
            .record(self.clock.now(), message.as_ref());
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSchedule {
    version: u32,
    entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedDirectory {
    version: u32,
    scenes: Vec<SceneRef>,
}

/// JSON file store for the schedule table, scene directory, and runtime
/// configuration. Saves are whole-document and go through a temp file plus
/// rename so a crash mid-write cannot leave a truncated record behind.
#[derive(Clone)]
pub struct AppStore {
    config_path: Arc<PathBuf>,
    schedule_path: Arc<PathBuf>,
    directory_path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl AppStore {
    pub fn new() -> Self {
        let data_dir = std::env::var("SCENEKICK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.scenekick"));
        Self::at(data_dir)
    }

    pub fn at(data_dir: PathBuf) -> Self {
        Self {
            config_path: Arc::new(data_dir.join("config.json")),
            schedule_path: Arc::new(data_dir.join("schedule.json")),
            directory_path: Arc::new(data_dir.join("scenes.json")),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load_config(&self) -> anyhow::Result<RuntimeConfig> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.config_path.as_ref()).await {
            Ok(raw) => Ok(serde_json::from_slice::<RuntimeConfig>(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// `Ok(Some)` on a readable table, `Ok(None)` when no file exists yet,
    /// `Err` on a corrupt or wrong-version document. Absent and corrupt both
    /// start the device with an empty table; only the journal line differs.
    pub async fn load_schedule(&self) -> anyhow::Result<Option<ScheduleTable>> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.schedule_path.as_ref()).await {
            Ok(raw) => {
                let persisted: PersistedSchedule = serde_json::from_slice(&raw)?;
                if persisted.version != STORE_VERSION {
                    bail!("unsupported schedule store version {}", persisted.version);
                }
                Ok(Some(ScheduleTable::new(persisted.entries)))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save_schedule(&self, table: &ScheduleTable) -> anyhow::Result<()> {
        let persisted = PersistedSchedule {
            version: STORE_VERSION,
            entries: table.entries().to_vec(),
        };
        self.write_replacing(&self.schedule_path, &persisted).await
    }

    pub async fn load_directory(&self) -> anyhow::Result<Option<SceneDirectory>> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.directory_path.as_ref()).await {
            Ok(raw) => {
                let persisted: PersistedDirectory = serde_json::from_slice(&raw)?;
                if persisted.version != STORE_VERSION {
                    bail!("unsupported directory store version {}", persisted.version);
                }
                Ok(Some(SceneDirectory::from_scenes(persisted.scenes)))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save_directory(&self, directory: &SceneDirectory) -> anyhow::Result<()> {
        let persisted = PersistedDirectory {
            version: STORE_VERSION,
            scenes: directory.scenes().to_vec(),
        };
        self.write_replacing(&self.directory_path, &persisted).await
    }

    async fn write_replacing<T: Serialize>(&self, path: &Path, value: &T) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, payload)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekick_common::{Weekday, WeekdaySet};

    fn sample_table() -> ScheduleTable {
        ScheduleTable::new(vec![ScheduleEntry {
            name: "evening lights".to_string(),
            weekdays: WeekdaySet::new(vec![Weekday::Mon, Weekday::Fri]),
            hour: -1,
            minute: 30,
            second: 0,
            year: 0,
            month: 0,
            day: 0,
            scene_name: "Evening".to_string(),
            active: true,
        }])
    }

    #[tokio::test]
    async fn schedule_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::at(dir.path().to_path_buf());

        let table = sample_table();
        store.save_schedule(&table).await.unwrap();
        let loaded = store.load_schedule().await.unwrap();

        assert_eq!(loaded, Some(table));
    }

    #[tokio::test]
    async fn missing_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::at(dir.path().to_path_buf());

        assert!(store.load_schedule().await.unwrap().is_none());
        assert!(store.load_directory().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_schedule_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::at(dir.path().to_path_buf());
        tokio::fs::write(dir.path().join("schedule.json"), b"{not json")
            .await
            .unwrap();

        assert!(store.load_schedule().await.is_err());
    }

    #[tokio::test]
    async fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::at(dir.path().to_path_buf());
        tokio::fs::write(
            dir.path().join("schedule.json"),
            br#"{"version": 99, "entries": []}"#,
        )
        .await
        .unwrap();

        assert!(store.load_schedule().await.is_err());
    }

    #[tokio::test]
    async fn directory_round_trips_and_empties() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::at(dir.path().to_path_buf());

        let directory = SceneDirectory::from_scenes(vec![SceneRef {
            name: "Evening".to_string(),
            id: "S1".to_string(),
        }]);
        store.save_directory(&directory).await.unwrap();
        assert_eq!(store.load_directory().await.unwrap(), Some(directory));

        store.save_directory(&SceneDirectory::Empty).await.unwrap();
        assert_eq!(
            store.load_directory().await.unwrap(),
            Some(SceneDirectory::Empty)
        );
    }
}
