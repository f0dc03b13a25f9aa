use std::{
    collections::BTreeMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::Mutex,
};

use crate::core::LexiqError;

const APP_NAME: &str = "lexiq";
const STORE_FILE: &str = "store.json";

/// Fixed keys shared with the rest of the client.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const THEME_MODE: &str = "themeMode";
    pub const ONBOARDING_SEEN: &str = "onboardingSeen";
    pub const NAVIGATION_STATE: &str = "navigationState";
}

/// Flat string key-value storage, the only state persisted between sessions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LexiqError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LexiqError>;
    fn remove(&self, key: &str) -> Result<(), LexiqError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), LexiqError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    fn get_flag(&self, key: &str) -> Result<bool, LexiqError> {
        Ok(self.get(key)?.is_some_and(|v| v == "true"))
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<(), LexiqError> {
        self.set(key, if value { "true" } else { "false" })
    }
}

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME)
    } else {
        PathBuf::from(".")
    }
}

pub fn default_store_path() -> PathBuf {
    get_app_data_dir().join(STORE_FILE)
}

/// Keeps every entry in one pretty-printed JSON object, rewritten on each change.
#[derive(Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self, LexiqError> {
        let file_path = file_path.into();

        let entries = if file_path.exists() {
            let content = fs::read_to_string(&file_path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str::<BTreeMap<String, String>>(&content).map_err(|e| {
                    LexiqError::Store(format!(
                        "Failed to parse store {}: {}",
                        file_path.display(),
                        e
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            path = %file_path.display(),
            entries = entries.len(),
            "Opened key-value store"
        );
        Ok(Self { file_path, entries: Mutex::new(entries) })
    }

    pub fn open_default() -> Result<Self, LexiqError> {
        Self::open(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), LexiqError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, LexiqError> {
        self.entries.lock().map_err(|_| LexiqError::Store("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LexiqError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LexiqError> {
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), LexiqError> {
        let mut entries = self.lock()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), LexiqError> {
        let mut entries = self.lock()?;
        let mut changed = false;
        for key in keys {
            changed |= entries.remove(*key).is_some();
        }
        if changed {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// In-process store, nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Self { entries: Mutex::new(map) }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, LexiqError> {
        self.entries.lock().map_err(|_| LexiqError::Store("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LexiqError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LexiqError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LexiqError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(keys::ACCESS_TOKEN, "abc").unwrap();
        store.set_flag(keys::ONBOARDING_SEEN, true).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("abc"));
        assert!(reopened.get_flag(keys::ONBOARDING_SEEN).unwrap());
        assert!(!reopened.get_flag(keys::THEME_MODE).unwrap());
    }

    #[test]
    fn remove_many_clears_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set(keys::ACCESS_TOKEN, "a").unwrap();
        store.set(keys::REFRESH_TOKEN, "r").unwrap();
        store.set(keys::THEME_MODE, "dark").unwrap();

        store.remove_many(&[keys::ACCESS_TOKEN, keys::REFRESH_TOKEN]).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get(keys::ACCESS_TOKEN).unwrap().is_none());
        assert!(reopened.get(keys::REFRESH_TOKEN).unwrap().is_none());
        assert_eq!(reopened.get(keys::THEME_MODE).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(LexiqError::Store(_))));
    }

    #[test]
    fn memory_store_defaults() {
        let store = MemoryStore::with_entries([(keys::ACCESS_TOKEN, "t")]);
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("t"));
        store.remove(keys::ACCESS_TOKEN).unwrap();
        assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
    }
}
