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

//! Browser bindings. Records cross the boundary as JSON strings.

mod app;
mod storage;

use examprep_core::ErrorReport;
use examprep_core::FlashcardSession;
use examprep_core::QuizSession;
use examprep_core::Rating;
use examprep_core::Timestamp;
use examprep_core::next_interval;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::app::to_json;
use crate::storage::BrowserBackend;

fn js(e: ErrorReport) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

#[wasm_bindgen]
pub struct ExamPrep {
    app: App,
}

#[wasm_bindgen]
impl ExamPrep {
    /// Open the store. `config` is an optional TOML document.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<ExamPrep, JsValue> {
        let backend = BrowserBackend::detect();
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let app = App::new(backend, config.as_deref(), seed).map_err(js)?;
        Ok(ExamPrep { app })
    }

    #[wasm_bindgen(getter)]
    pub fn persistent(&self) -> bool {
        self.app.tracker().store().backend().is_persistent()
    }

    pub fn get_progress(&self) -> Result<String, JsValue> {
        self.app.progress_json().map_err(js)
    }

    pub fn save_progress(&mut self, json: &str) -> Result<(), JsValue> {
        self.app.save_progress_json(json).map_err(js)
    }

    /// A card's review state as JSON. Unknown cards are new and due now.
    pub fn get_flashcard_progress(&self, card_id: &str) -> Result<String, JsValue> {
        self.app.flashcard_progress_json(card_id).map_err(js)
    }

    pub fn save_flashcard_progress(&mut self, card_id: &str, json: &str) -> Result<(), JsValue> {
        self.app.save_flashcard_progress_json(card_id, json).map_err(js)
    }

    pub fn record_quiz_result(&mut self, json: &str) -> Result<String, JsValue> {
        self.app.record_quiz_result_json(json).map_err(js)
    }

    pub fn update_category_progress(
        &mut self,
        category: &str,
        was_correct: bool,
    ) -> Result<(), JsValue> {
        self.app
            .update_category_progress(category, was_correct)
            .map_err(js)
    }

    pub fn update_streak(&mut self) -> Result<String, JsValue> {
        self.app.update_streak().map_err(js)
    }

    pub fn rate_flashcard(&mut self, card_id: &str, rating: &str) -> Result<String, JsValue> {
        self.app.rate_flashcard(card_id, rating).map_err(js)
    }

    pub fn dashboard(&self, categories: &str) -> Result<String, JsValue> {
        self.app.dashboard_json(categories).map_err(js)
    }

    pub fn pass_likelihood(&self, categories: &str) -> Result<String, JsValue> {
        self.app.pass_likelihood_json(categories).map_err(js)
    }

    pub fn export_data(&self) -> Result<String, JsValue> {
        self.app.export_json().map_err(js)
    }

    pub fn import_data(&mut self, json: &str) -> Result<(), JsValue> {
        self.app.import_json(json).map_err(js)
    }

    pub fn clear_all(&mut self) -> Result<(), JsValue> {
        self.app.clear_all().map_err(js)
    }

    pub fn storage_size(&self) -> Result<usize, JsValue> {
        self.app.storage_size().map_err(js)
    }

    pub fn get_settings(&self) -> Result<String, JsValue> {
        self.app.settings_json().map_err(js)
    }

    pub fn save_settings(&mut self, json: &str) -> Result<(), JsValue> {
        self.app.save_settings_json(json).map_err(js)
    }

    pub fn get_bookmarks(&self) -> Result<String, JsValue> {
        self.app.bookmarks_json().map_err(js)
    }

    pub fn toggle_bookmark(&mut self, question_id: &str) -> Result<bool, JsValue> {
        self.app.toggle_bookmark(question_id).map_err(js)
    }

    pub fn is_bookmarked(&self, question_id: &str) -> bool {
        self.app.is_bookmarked(question_id)
    }

    /// Draw a quiz from a JSON question bank.
    pub fn generate_quiz(
        &mut self,
        mode: &str,
        category: Option<String>,
        bank: &str,
    ) -> Result<Quiz, JsValue> {
        let session = self
            .app
            .generate_quiz(mode, category.as_deref(), bank)
            .map_err(js)?;
        Ok(Quiz { session })
    }

    /// Start a review over the cards of a JSON deck matching `filter`
    /// (`all`, `due` or `new`).
    pub fn start_review(&mut self, deck: &str, filter: &str) -> Result<Review, JsValue> {
        let session = self.app.start_review(deck, filter).map_err(js)?;
        Ok(Review { session })
    }
}

#[wasm_bindgen]
pub struct Quiz {
    session: QuizSession,
}

#[wasm_bindgen]
impl Quiz {
    pub fn start(&mut self, app: &ExamPrep) -> Result<(), JsValue> {
        self.session.start(app.app.tracker()).map_err(js)
    }

    pub fn state(&self) -> Result<String, JsValue> {
        to_json(&self.session.state()).map_err(js)
    }

    /// The current question as JSON, or `null`.
    pub fn current(&self) -> Result<String, JsValue> {
        to_json(&self.session.current()).map_err(js)
    }

    pub fn question_count(&self) -> usize {
        self.session.question_count()
    }

    pub fn select_answer(&mut self, option: usize) -> Result<String, JsValue> {
        let feedback = self.session.select_answer(option).map_err(js)?;
        to_json(&feedback).map_err(js)
    }

    pub fn next(&mut self) -> Result<bool, JsValue> {
        self.session.next().map_err(js)
    }

    pub fn previous(&mut self) -> Result<bool, JsValue> {
        self.session.previous().map_err(js)
    }

    pub fn unanswered_count(&self) -> usize {
        self.session.unanswered_count()
    }

    pub fn submit(&mut self, app: &mut ExamPrep, confirmed: bool) -> Result<String, JsValue> {
        let outcome = self
            .session
            .submit(app.app.tracker_mut(), confirmed)
            .map_err(js)?;
        to_json(&outcome).map_err(js)
    }

    /// Call once per second during a full exam.
    pub fn tick(&mut self, app: &mut ExamPrep) -> Result<String, JsValue> {
        let outcome = self.session.tick(app.app.tracker_mut()).map_err(js)?;
        to_json(&outcome).map_err(js)
    }
}

#[wasm_bindgen]
pub struct Review {
    session: FlashcardSession,
}

#[wasm_bindgen]
impl Review {
    pub fn start(&mut self, app: &ExamPrep) -> Result<(), JsValue> {
        self.session.start(app.app.tracker()).map_err(js)
    }

    pub fn state(&self) -> Result<String, JsValue> {
        to_json(&self.session.state()).map_err(js)
    }

    /// The current card as JSON, or `null`.
    pub fn current(&self) -> Result<String, JsValue> {
        to_json(&self.session.current()).map_err(js)
    }

    pub fn card_count(&self) -> usize {
        self.session.card_count()
    }

    #[wasm_bindgen(getter)]
    pub fn flipped(&self) -> bool {
        self.session.is_flipped()
    }

    pub fn flip(&mut self) -> Result<bool, JsValue> {
        self.session.flip().map_err(js)
    }

    pub fn rate(&mut self, app: &mut ExamPrep, rating: &str) -> Result<String, JsValue> {
        let outcome = self
            .session
            .rate(app.app.tracker_mut(), Rating::from(rating))
            .map_err(js)?;
        to_json(&outcome).map_err(js)
    }

    pub fn next(&mut self) -> Result<bool, JsValue> {
        self.session.next().map_err(js)
    }

    pub fn previous(&mut self) -> Result<bool, JsValue> {
        self.session.previous().map_err(js)
    }
}

/// Compute a review schedule without touching storage.
#[wasm_bindgen(js_name = nextInterval)]
pub fn next_interval_js(
    current_interval_days: u32,
    rating: &str,
    now_millis: f64,
) -> Result<String, JsValue> {
    let now = Timestamp::from_millis(now_millis as i64).map_err(js)?;
    let schedule = next_interval(current_interval_days, Rating::from(rating), now);
    to_json(&schedule).map_err(js)
}

#[wasm_bindgen(js_name = formatDuration)]
pub fn format_duration(seconds: f64) -> String {
    examprep_core::stats::format_duration(seconds.max(0.0) as u64)
}
