use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::plan::{parse_study_hours, ConfigError, SessionPlan};

pub const STUDY_HOURS_KEY: &str = "studyHours";
pub const STUDY_MODE_KEY: &str = "studyMode";
/// Overrides the location of the settings file
pub const CONFIG_ENV: &str = "FOCUSPLAN_CONFIG";

/// String key/value settings written by `setup` and read at startup
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(path) = std::env::var_os(CONFIG_ENV) {
            PathBuf::from(path)
        } else if let Some(pd) = ProjectDirs::from("", "", "focusplan") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("focusplan_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&values).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the stored plan. A missing hours value reads as an invalid
/// duration and a missing mode as an unknown preset.
pub fn load_plan<S: KeyValueStore + ?Sized>(store: &S) -> Result<SessionPlan, ConfigError> {
    let hours = parse_study_hours(&store.get(STUDY_HOURS_KEY).unwrap_or_default())?;
    let mode = store.get(STUDY_MODE_KEY).unwrap_or_default();
    SessionPlan::from_hours(hours, &mode)
}

pub fn save_plan<S: KeyValueStore + ?Sized>(
    store: &mut S,
    hours: &str,
    mode: &str,
) -> std::io::Result<()> {
    store.set(STUDY_HOURS_KEY, hours)?;
    store.set(STUDY_MODE_KEY, mode)
}
