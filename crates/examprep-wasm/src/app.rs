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

use std::rc::Rc;

use examprep_core::Config;
use examprep_core::Fallible;
use examprep_core::FlashcardSession;
use examprep_core::QuizMode;
use examprep_core::QuizResult;
use examprep_core::QuizSession;
use examprep_core::Rating;
use examprep_core::ReviewState;
use examprep_core::Tracker;
use examprep_core::clock::SystemClock;
use examprep_core::session::ReviewFilter;
use examprep_core::types::item::Category;
use examprep_core::types::item::Flashcard;
use examprep_core::types::item::Question;
use examprep_core::types::progress::ProgressRecord;
use examprep_core::types::settings::Settings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::storage::BrowserBackend;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Fallible<String> {
    Ok(serde_json::to_string(value)?)
}

/// The browser-facing application state. Every call exchanges JSON strings
/// with the page.
pub struct App {
    tracker: Tracker<BrowserBackend>,
    rng: StdRng,
}

impl App {
    pub fn new(backend: BrowserBackend, config_toml: Option<&str>, seed: u64) -> Fallible<Self> {
        let config = match config_toml {
            Some(text) => Config::from_toml(text)?,
            None => Config::default(),
        };
        Ok(Self {
            tracker: Tracker::new(backend, config, Rc::new(SystemClock)),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn tracker(&self) -> &Tracker<BrowserBackend> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker<BrowserBackend> {
        &mut self.tracker
    }

    pub fn progress_json(&self) -> Fallible<String> {
        to_json(&self.tracker.get_progress())
    }

    pub fn save_progress_json(&mut self, json: &str) -> Fallible<()> {
        let record: ProgressRecord = serde_json::from_str(json)?;
        self.tracker.save_progress(&record)
    }

    pub fn flashcard_progress_json(&self, card_id: &str) -> Fallible<String> {
        to_json(&self.tracker.get_flashcard_progress(card_id))
    }

    pub fn save_flashcard_progress_json(&mut self, card_id: &str, json: &str) -> Fallible<()> {
        let state: ReviewState = serde_json::from_str(json)?;
        self.tracker.save_flashcard_progress(card_id, state)
    }

    pub fn record_quiz_result_json(&mut self, json: &str) -> Fallible<String> {
        let result: QuizResult = serde_json::from_str(json)?;
        to_json(&self.tracker.record_quiz_result(result)?)
    }

    pub fn update_category_progress(&mut self, category: &str, was_correct: bool) -> Fallible<()> {
        self.tracker.update_category_progress(category, was_correct)
    }

    pub fn update_streak(&mut self) -> Fallible<String> {
        let now = self.tracker.now();
        to_json(&self.tracker.update_streak(now)?)
    }

    pub fn rate_flashcard(&mut self, card_id: &str, rating: &str) -> Fallible<String> {
        let rating = Rating::from(rating);
        to_json(&self.tracker.rate_flashcard(card_id, rating)?)
    }

    pub fn dashboard_json(&self, categories_json: &str) -> Fallible<String> {
        let categories: Vec<Category> = serde_json::from_str(categories_json)?;
        to_json(&self.tracker.dashboard(&categories))
    }

    pub fn pass_likelihood_json(&self, categories_json: &str) -> Fallible<String> {
        let categories: Vec<Category> = serde_json::from_str(categories_json)?;
        to_json(&self.tracker.pass_likelihood(&categories))
    }

    pub fn export_json(&self) -> Fallible<String> {
        to_json(&self.tracker.export()?)
    }

    pub fn import_json(&mut self, json: &str) -> Fallible<()> {
        let data: Map<String, Value> = serde_json::from_str(json)?;
        self.tracker.import(&data)
    }

    pub fn clear_all(&mut self) -> Fallible<()> {
        self.tracker.clear_all()
    }

    pub fn storage_size(&self) -> Fallible<usize> {
        self.tracker.store().size()
    }

    pub fn settings_json(&self) -> Fallible<String> {
        to_json(&self.tracker.store().settings(&self.tracker.config().ui))
    }

    pub fn save_settings_json(&mut self, json: &str) -> Fallible<()> {
        let settings: Settings = serde_json::from_str(json)?;
        self.tracker.store_mut().save_settings(&settings)
    }

    pub fn bookmarks_json(&self) -> Fallible<String> {
        to_json(&self.tracker.store().bookmarks())
    }

    pub fn toggle_bookmark(&mut self, question_id: &str) -> Fallible<bool> {
        self.tracker.store_mut().toggle_bookmark(question_id)
    }

    pub fn is_bookmarked(&self, question_id: &str) -> bool {
        self.tracker.store().is_bookmarked(question_id)
    }

    pub fn generate_quiz(
        &mut self,
        mode: &str,
        category: Option<&str>,
        bank_json: &str,
    ) -> Fallible<QuizSession> {
        let mode: QuizMode = mode.parse()?;
        let bank: Vec<Question> = serde_json::from_str(bank_json)?;
        QuizSession::generate(mode, category, &bank, self.tracker.config(), &mut self.rng)
    }

    pub fn start_review(&mut self, deck_json: &str, filter: &str) -> Fallible<FlashcardSession> {
        let filter: ReviewFilter = filter.parse()?;
        let deck: Vec<Flashcard> = serde_json::from_str(deck_json)?;
        FlashcardSession::from_deck(&self.tracker, &deck, filter, &mut self.rng)
    }
}
