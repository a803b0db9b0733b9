// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::config::UiConfig;
use crate::error::Fallible;
use crate::types::settings::Settings;

pub const PROGRESS_KEY: &str = "progress";
pub const SETTINGS_KEY: &str = "settings";
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// One write in a batch passed to [`Backend::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Set { key: String, value: String },
    Remove { key: String },
}

impl Change {
    fn key(&self) -> &str {
        match self {
            Change::Set { key, .. } => key,
            Change::Remove { key } => key,
        }
    }
}

/// A raw string key-value store: browser `localStorage`, a SQLite table, or
/// a map in memory. Keys are full (already prefixed) keys.
pub trait Backend {
    fn get(&self, key: &str) -> Fallible<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Fallible<()>;

    fn remove(&mut self, key: &str) -> Fallible<()>;

    /// Every key in the backend, including keys owned by other apps.
    fn keys(&self) -> Fallible<Vec<String>>;

    /// Apply a batch of changes all-or-nothing.
    ///
    /// The default implementation snapshots the affected keys, applies the
    /// changes one by one, and restores the snapshot if any change fails.
    /// Backends with real transactions should override it.
    fn apply(&mut self, changes: &[Change]) -> Fallible<()> {
        let mut snapshot: Vec<(String, Option<String>)> = Vec::with_capacity(changes.len());
        for change in changes {
            let key = change.key();
            if !snapshot.iter().any(|(k, _)| k == key) {
                snapshot.push((key.to_string(), self.get(key)?));
            }
        }
        for change in changes {
            let result = match change {
                Change::Set { key, value } => self.set(key, value),
                Change::Remove { key } => self.remove(key),
            };
            if let Err(e) = result {
                log::error!("Batch write failed, rolling back: {e}");
                for (key, previous) in &snapshot {
                    let restored = match previous {
                        Some(value) => self.set(key, value),
                        None => self.remove(key),
                    };
                    if let Err(e) = restored {
                        log::error!("Failed to restore '{key}' during rollback: {e}");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// A backend that lives in memory. Used in tests, and by hosts as a fallback
/// when durable storage is unavailable.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Fallible<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Typed JSON records on top of a [`Backend`], namespaced by a prefix.
pub struct Store<B: Backend> {
    backend: B,
    prefix: String,
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Load and decode a record. Missing keys, unreadable storage and corrupt
    /// JSON all yield `default`.
    pub fn load<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.load_or_else(name, || default)
    }

    pub fn load_or_else<T: DeserializeOwned>(&self, name: &str, default: impl FnOnce() -> T) -> T {
        let raw = match self.backend.get(&self.key(name)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default(),
            Err(e) => {
                log::warn!("Failed to read '{name}', using defaults: {e}");
                return default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Stored '{name}' is corrupt, using defaults: {e}");
                default()
            }
        }
    }

    pub fn save<T: Serialize>(&mut self, name: &str, value: &T) -> Fallible<()> {
        let json = serde_json::to_string(value)?;
        let key = self.key(name);
        self.backend.set(&key, &json)
    }

    pub fn remove(&mut self, name: &str) -> Fallible<()> {
        let key = self.key(name);
        self.backend.remove(&key)
    }

    /// The names (without prefix) of every key this store owns, sorted.
    pub fn short_keys(&self) -> Fallible<Vec<String>> {
        let mut names: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&self.prefix).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Remove every key this store owns, all-or-nothing.
    pub fn clear_all(&mut self) -> Fallible<()> {
        let changes: Vec<Change> = self
            .short_keys()?
            .iter()
            .map(|name| Change::Remove {
                key: self.key(name),
            })
            .collect();
        log::debug!("Clearing {} keys.", changes.len());
        self.backend.apply(&changes)
    }

    /// Total size in bytes of this store's keys and values.
    pub fn size(&self) -> Fallible<usize> {
        let mut total = 0;
        for name in self.short_keys()? {
            let key = self.key(&name);
            let value = self.backend.get(&key)?.unwrap_or_default();
            total += key.len() + value.len();
        }
        Ok(total)
    }

    /// Snapshot of every owned key as `{name: value}`. Values that are not
    /// valid JSON are exported as `null`.
    pub fn export(&self) -> Fallible<Map<String, Value>> {
        let mut data = Map::new();
        for name in self.short_keys()? {
            let raw = self.backend.get(&self.key(&name))?;
            let value = match raw.as_deref().map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => value,
                Some(Err(e)) => {
                    log::warn!("Exporting corrupt '{name}' as null: {e}");
                    Value::Null
                }
                None => Value::Null,
            };
            data.insert(name, value);
        }
        Ok(data)
    }

    /// Overwrite each supplied key, all-or-nothing. The data is not checked
    /// against any schema: whatever is imported is what later loads see.
    pub fn import(&mut self, data: &Map<String, Value>) -> Fallible<()> {
        let mut changes = Vec::with_capacity(data.len());
        for (name, value) in data {
            changes.push(Change::Set {
                key: self.key(name),
                value: serde_json::to_string(value)?,
            });
        }
        log::debug!("Importing {} keys.", changes.len());
        self.backend.apply(&changes)
    }

    pub fn settings(&self, ui: &UiConfig) -> Settings {
        self.load_or_else(SETTINGS_KEY, || Settings::from_config(ui))
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Fallible<()> {
        self.save(SETTINGS_KEY, settings)
    }

    pub fn bookmarks(&self) -> Vec<String> {
        self.load(BOOKMARKS_KEY, Vec::new())
    }

    pub fn save_bookmarks(&mut self, bookmarks: &[String]) -> Fallible<()> {
        self.save(BOOKMARKS_KEY, &bookmarks)
    }

    pub fn is_bookmarked(&self, question_id: &str) -> bool {
        self.bookmarks().iter().any(|id| id == question_id)
    }

    /// Add or remove a bookmark. Returns whether the question is bookmarked
    /// afterwards.
    pub fn toggle_bookmark(&mut self, question_id: &str) -> Fallible<bool> {
        let mut bookmarks = self.bookmarks();
        let bookmarked = match bookmarks.iter().position(|id| id == question_id) {
            Some(index) => {
                bookmarks.remove(index);
                false
            }
            None => {
                bookmarks.push(question_id.to_string());
                true
            }
        };
        self.save_bookmarks(&bookmarks)?;
        Ok(bookmarked)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::fail;

    fn store() -> Store<MemoryBackend> {
        Store::new(MemoryBackend::new(), "test_")
    }

    /// A backend that refuses to write one particular key.
    struct FlakyBackend {
        inner: MemoryBackend,
        poisoned: &'static str,
    }

    impl Backend for FlakyBackend {
        fn get(&self, key: &str) -> Fallible<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
            if key == self.poisoned {
                return fail("quota exceeded");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Fallible<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Fallible<Vec<String>> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_load_missing_returns_default() {
        let store = store();
        assert_eq!(store.load("nothing", 7u32), 7);
    }

    #[test]
    fn test_load_corrupt_returns_default() -> Fallible<()> {
        let mut backend = MemoryBackend::new();
        backend.set("test_count", "{not json")?;
        let store = Store::new(backend, "test_");
        assert_eq!(store.load("count", 3u32), 3);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Fallible<()> {
        let mut store = store();
        store.save("count", &41u32)?;
        assert_eq!(store.load("count", 0u32), 41);
        assert_eq!(store.backend().get("test_count")?, Some("41".to_string()));
        Ok(())
    }

    #[test]
    fn test_keys_are_namespaced() -> Fallible<()> {
        let mut backend = MemoryBackend::new();
        backend.set("other_app", "1")?;
        let mut store = Store::new(backend, "test_");
        store.save("a", &1)?;
        store.save("b", &2)?;
        assert_eq!(store.short_keys()?, vec!["a".to_string(), "b".to_string()]);
        store.clear_all()?;
        assert!(store.short_keys()?.is_empty());
        assert_eq!(store.backend().get("other_app")?, Some("1".to_string()));
        Ok(())
    }

    #[test]
    fn test_size() -> Fallible<()> {
        let mut store = store();
        store.save("ab", &"xy")?;
        // "test_ab" + "\"xy\""
        assert_eq!(store.size()?, 7 + 4);
        Ok(())
    }

    #[test]
    fn test_export_import_is_byte_identical() -> Fallible<()> {
        let mut store = store();
        store.save(
            PROGRESS_KEY,
            &json!({"totalQuestions": 3, "correctAnswers": 2, "categoryProgress": {"z": {"answered": 1, "correct": 1}, "a": {"answered": 2, "correct": 1}}}),
        )?;
        store.save(BOOKMARKS_KEY, &vec!["q9", "q1"])?;
        store.save_settings(&Settings::default())?;
        let before: Vec<Option<String>> = store
            .short_keys()?
            .iter()
            .map(|name| store.backend().get(&format!("test_{name}")))
            .collect::<Fallible<_>>()?;

        let exported = store.export()?;
        store.import(&exported)?;

        let after: Vec<Option<String>> = store
            .short_keys()?
            .iter()
            .map(|name| store.backend().get(&format!("test_{name}")))
            .collect::<Fallible<_>>()?;
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_import_overwrites_without_validation() -> Fallible<()> {
        let mut store = store();
        store.save(PROGRESS_KEY, &json!({"totalQuestions": 3}))?;
        let mut data = Map::new();
        data.insert(PROGRESS_KEY.to_string(), json!("garbage"));
        data.insert("extra".to_string(), json!([1, 2]));
        store.import(&data)?;
        assert_eq!(
            store.backend().get("test_progress")?,
            Some("\"garbage\"".to_string())
        );
        assert_eq!(store.load("extra", Vec::<u32>::new()), vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_import_is_all_or_nothing() -> Fallible<()> {
        let mut inner = MemoryBackend::new();
        inner.set("test_a", "1")?;
        let mut store = Store::new(
            FlakyBackend {
                inner,
                poisoned: "test_b",
            },
            "test_",
        );
        let mut data = Map::new();
        data.insert("a".to_string(), json!(2));
        data.insert("b".to_string(), json!(3));
        assert!(store.import(&data).is_err());
        assert_eq!(store.backend().get("test_a")?, Some("1".to_string()));
        assert_eq!(store.backend().get("test_b")?, None);
        Ok(())
    }

    #[test]
    fn test_export_corrupt_value_as_null() -> Fallible<()> {
        let mut backend = MemoryBackend::new();
        backend.set("test_broken", "{")?;
        let store = Store::new(backend, "test_");
        let data = store.export()?;
        assert_eq!(data.get("broken"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_settings_default_from_config() -> Fallible<()> {
        let mut store = store();
        let ui = UiConfig {
            theme: "calm".to_string(),
            ..UiConfig::default()
        };
        assert_eq!(store.settings(&ui).theme, "calm");
        let mut settings = store.settings(&ui);
        settings.show_jokes = false;
        store.save_settings(&settings)?;
        assert!(!store.settings(&ui).show_jokes);
        Ok(())
    }

    #[test]
    fn test_toggle_bookmark() -> Fallible<()> {
        let mut store = store();
        assert!(store.toggle_bookmark("q1")?);
        assert!(store.toggle_bookmark("q2")?);
        assert!(store.is_bookmarked("q1"));
        assert!(!store.toggle_bookmark("q1")?);
        assert!(!store.is_bookmarked("q1"));
        assert_eq!(store.bookmarks(), vec!["q2".to_string()]);
        Ok(())
    }
}
