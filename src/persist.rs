use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::StoreError;

pub const HIGH_SCORE_KEY: &str = "match3-highscore";
pub const SETTINGS_KEY: &str = "match3-settings";

pub type Record = Map<String, Value>;

/// Key-value storage owned by the host application.
pub trait Store {
    fn read_int(&self, key: &str) -> Result<Option<i64>, StoreError>;
    fn write_int(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
    fn read_record(&self, key: &str) -> Result<Option<Record>, StoreError>;
    fn write_record(&mut self, key: &str, record: &Record) -> Result<(), StoreError>;
}

fn as_int(key: &str, value: &Value) -> Result<i64, StoreError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        // Older blobs stored the score as a decimal string.
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| StoreError::NotAnInteger(key.to_string()))
}

fn as_record(key: &str, value: &Value) -> Result<Record, StoreError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        // Records may also arrive as JSON text.
        Value::String(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotARecord(key.to_string())),
        },
        _ => Err(StoreError::NotARecord(key.to_string())),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

impl Store for MemoryStore {
    fn read_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.values.get(key).map(|v| as_int(key, v)).transpose()
    }

    fn write_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), Value::from(value));
        Ok(())
    }

    fn read_record(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.values.get(key).map(|v| as_record(key, v)).transpose()
    }

    fn write_record(&mut self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), Value::Object(record.clone()));
        Ok(())
    }
}

/// All keys in one JSON object file, rewritten in full on every write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Record, StoreError> {
        if !self.path.exists() {
            return Ok(Record::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Record::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, all: &Record) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(all)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn read_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.load()?.get(key).map(|v| as_int(key, v)).transpose()
    }

    fn write_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut all = self.load()?;
        all.insert(key.to_string(), Value::from(value));
        self.save(&all)
    }

    fn read_record(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.load()?.get(key).map(|v| as_record(key, v)).transpose()
    }

    fn write_record(&mut self, key: &str, record: &Record) -> Result<(), StoreError> {
        let mut all = self.load()?;
        all.insert(key.to_string(), Value::Object(record.clone()));
        self.save(&all)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub sound_volume: f64,
    pub music_volume: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            sound_volume: 0.7,
            music_volume: 0.5,
        }
    }
}

impl Settings {
    fn clamped(mut self) -> Self {
        self.sound_volume = self.sound_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }
}

/// Stored high score, or zero if the store fails or holds nothing usable.
pub fn load_high_score(store: &impl Store) -> u32 {
    match store.read_int(HIGH_SCORE_KEY) {
        Ok(Some(value)) => u32::try_from(value).unwrap_or(0),
        Ok(None) => 0,
        Err(err) => {
            warn!(%err, "could not read high score, using 0");
            0
        }
    }
}

/// Returns whether the write succeeded.
pub fn save_high_score(store: &mut impl Store, score: u32) -> bool {
    match store.write_int(HIGH_SCORE_KEY, score as i64) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, score, "could not save high score");
            false
        }
    }
}

/// Stored settings merged over the defaults, key by key. Unusable records
/// fall back to the defaults entirely.
pub fn load_settings(store: &impl Store) -> Settings {
    let record = match store.read_record(SETTINGS_KEY) {
        Ok(Some(record)) => record,
        Ok(None) => return Settings::default(),
        Err(err) => {
            warn!(%err, "could not read settings, using defaults");
            return Settings::default();
        }
    };

    let mut merged = match serde_json::to_value(Settings::default()) {
        Ok(Value::Object(map)) => map,
        _ => return Settings::default(),
    };
    merged.extend(record);

    match serde_json::from_value::<Settings>(Value::Object(merged)) {
        Ok(settings) => settings.clamped(),
        Err(err) => {
            warn!(%err, "stored settings are malformed, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &mut impl Store, settings: &Settings) -> bool {
    let record = match serde_json::to_value(settings.clone().clamped()) {
        Ok(Value::Object(map)) => map,
        _ => return false,
    };
    match store.write_record(SETTINGS_KEY, &record) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "could not save settings");
            false
        }
    }
}
