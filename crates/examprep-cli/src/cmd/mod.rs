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

pub mod clear;
pub mod drill;
pub mod due;
pub mod export;
pub mod import;
pub mod quiz;
pub mod stats;

use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use examprep_core::Config;
use examprep_core::Fallible;
use examprep_core::Tracker;
use examprep_core::clock::SystemClock;
use examprep_core::fail;
use examprep_core::types::item::Category;
use examprep_core::types::item::Flashcard;
use examprep_core::types::item::Question;
use serde::Deserialize;

use crate::db::SqliteBackend;

pub const CONFIG_FILE: &str = "examprep.toml";
pub const DATABASE_FILE: &str = "examprep.sqlite3";
pub const CONTENT_FILE: &str = "content.json";

/// Study content: categories, the question bank and the flashcard deck.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Content {
    pub categories: Vec<Category>,
    pub questions: Vec<Question>,
    pub flashcards: Vec<Flashcard>,
}

/// Where the data lives, resolved from the command line.
pub struct Context {
    pub directory: PathBuf,
    pub content_path: PathBuf,
}

impl Context {
    pub fn new(directory: PathBuf, content_path: Option<PathBuf>) -> Fallible<Self> {
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let content_path = content_path.unwrap_or_else(|| directory.join(CONTENT_FILE));
        Ok(Self {
            directory,
            content_path,
        })
    }

    /// The configuration in `examprep.toml`, or the defaults if there is none.
    pub fn config(&self) -> Fallible<Config> {
        load_config(&self.directory.join(CONFIG_FILE))
    }

    pub fn tracker(&self) -> Fallible<Tracker<SqliteBackend>> {
        let config = self.config()?;
        let backend = SqliteBackend::open(&self.directory.join(DATABASE_FILE))?;
        Ok(Tracker::new(backend, config, Rc::new(SystemClock)))
    }

    pub fn content(&self) -> Fallible<Content> {
        load_content(&self.content_path)
    }

    /// Like [`Context::content`], but a missing file is empty content.
    pub fn content_or_default(&self) -> Fallible<Content> {
        if self.content_path.exists() {
            self.content()
        } else {
            log::warn!(
                "No content file at {}, using no categories.",
                self.content_path.display()
            );
            Ok(Content::default())
        }
    }
}

pub fn load_config(path: &Path) -> Fallible<Config> {
    if path.exists() {
        log::debug!("Loading configuration from {}.", path.display());
        let text = std::fs::read_to_string(path)?;
        Config::from_toml(&text)
    } else {
        Ok(Config::default())
    }
}

pub fn load_content(path: &Path) -> Fallible<Content> {
    if !path.exists() {
        return fail(format!("content file {} does not exist.", path.display()));
    }
    let text = std::fs::read_to_string(path)?;
    let content: Content = serde_json::from_str(&text)?;
    for question in &content.questions {
        question.validate()?;
    }
    log::debug!(
        "Loaded {} categories, {} questions and {} flashcards.",
        content.categories.len(),
        content.questions.len(),
        content.flashcards.len()
    );
    Ok(content)
}
