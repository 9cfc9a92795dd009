use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use uuid::Uuid;

use crate::log_warn;
use crate::scoring::ScoringPolicy;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Identifies this installation in persisted attempts.
    pub device_id: String,
    /// SQLite file name, relative to the data directory.
    pub database_file: String,
    pub policy: ScoringPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            device_id: Uuid::new_v4().to_string(),
            database_file: "fluency.db".into(),
            policy: ScoringPolicy::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    /// Loads settings, falling back to defaults when the file is missing or
    /// unreadable. Defaults are written back so the device id stays stable;
    /// a readable `deviceId` in an otherwise invalid file is kept.
    pub fn new(path: PathBuf) -> Result<Self> {
        let (data, needs_persist) = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(data) => (data, false),
                Err(err) => {
                    log_warn!("Replacing invalid settings in {}: {err}", path.display());
                    (recover_defaults(&contents), true)
                }
            }
        } else {
            (EngineSettings::default(), true)
        };

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if needs_persist {
            store.persist(&store.read())?;
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> EngineSettings {
        self.read().clone()
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.read().policy.clone()
    }

    pub fn device_id(&self) -> String {
        self.read().device_id.clone()
    }

    pub fn database_path(&self) -> PathBuf {
        let file = self.read().database_file.clone();
        match self.path.parent() {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    pub fn update_policy(&self, policy: ScoringPolicy) -> Result<()> {
        let mut guard = self.write();
        guard.policy = policy;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: EngineSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create settings directory {}", dir.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

fn recover_defaults(contents: &str) -> EngineSettings {
    let device_id = serde_json::from_str::<serde_json::Value>(contents)
        .ok()
        .and_then(|value| value.get("deviceId")?.as_str().map(str::to_string));
    match device_id {
        Some(device_id) => EngineSettings {
            device_id,
            ..EngineSettings::default()
        },
        None => EngineSettings::default(),
    }
}
