use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings storage error: {0}")]
    Io(#[from] io::Error),
    #[error("settings storage corrupt: {0}")]
    Corrupt(String),
}

/// Small key/value store for user preferences.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<bool, SettingsError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySettingsStore {
    values: BTreeMap<String, Value>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, SettingsError> {
        Ok(self.values.remove(key).is_some())
    }
}

/// Settings kept as one JSON object in a file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s).map_err(|e| SettingsError::Corrupt(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &BTreeMap<String, Value>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(values)
            .map_err(|e| SettingsError::Corrupt(e.to_string()))?;
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value);
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<bool, SettingsError> {
        let mut values = self.load()?;
        let removed = values.remove(key).is_some();
        if removed {
            self.save(&values)?;
        }
        Ok(removed)
    }
}
