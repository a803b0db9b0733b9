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

use examprep_core::Backend;
use examprep_core::ErrorReport;
use examprep_core::Fallible;
use examprep_core::MemoryBackend;
use examprep_core::store::Change;
use wasm_bindgen::JsValue;
use web_sys::Storage;

fn js_error(context: &str, value: JsValue) -> ErrorReport {
    ErrorReport::new(format!("{context}: {value:?}"))
}

/// The browser's `localStorage`.
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// `None` when the page has no window or storage is disabled.
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(e) => {
                log::warn!("localStorage is not accessible: {e:?}");
                None
            }
        }
    }
}

impl Backend for LocalStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("failed to read from localStorage", e))
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("failed to write to localStorage", e))
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("failed to remove from localStorage", e))
    }

    fn keys(&self) -> Fallible<Vec<String>> {
        let length = self
            .storage
            .length()
            .map_err(|e| js_error("failed to list localStorage", e))?;
        let mut keys = Vec::with_capacity(length as usize);
        for i in 0..length {
            let key = self
                .storage
                .key(i)
                .map_err(|e| js_error("failed to list localStorage", e))?;
            if let Some(key) = key {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// `localStorage` when the browser allows it, memory otherwise.
pub enum BrowserBackend {
    Local(LocalStorage),
    Memory(MemoryBackend),
}

impl BrowserBackend {
    pub fn detect() -> Self {
        match LocalStorage::open() {
            Some(storage) => BrowserBackend::Local(storage),
            None => {
                log::warn!("localStorage is unavailable, progress will not be kept.");
                BrowserBackend::Memory(MemoryBackend::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BrowserBackend::Local(_))
    }
}

impl Backend for BrowserBackend {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match self {
            BrowserBackend::Local(b) => b.get(key),
            BrowserBackend::Memory(b) => b.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        match self {
            BrowserBackend::Local(b) => b.set(key, value),
            BrowserBackend::Memory(b) => b.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        match self {
            BrowserBackend::Local(b) => b.remove(key),
            BrowserBackend::Memory(b) => b.remove(key),
        }
    }

    fn keys(&self) -> Fallible<Vec<String>> {
        match self {
            BrowserBackend::Local(b) => b.keys(),
            BrowserBackend::Memory(b) => b.keys(),
        }
    }

    fn apply(&mut self, changes: &[Change]) -> Fallible<()> {
        match self {
            BrowserBackend::Local(b) => b.apply(changes),
            BrowserBackend::Memory(b) => b.apply(changes),
        }
    }
}
