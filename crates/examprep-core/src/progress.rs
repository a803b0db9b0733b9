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
use std::rc::Rc;

use serde_json::Map;
use serde_json::Value;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Fallible;
use crate::prediction::PassLikelihood;
use crate::prediction::predict;
use crate::scheduler::Rating;
use crate::scheduler::Schedule;
use crate::scheduler::next_interval;
use crate::session::ReviewFilter;
use crate::stats::Dashboard;
use crate::store::Backend;
use crate::store::PROGRESS_KEY;
use crate::store::Store;
use crate::types::item::Category;
use crate::types::item::Difficulty;
use crate::types::item::Flashcard;
use crate::types::progress::ProgressRecord;
use crate::types::progress::StreakUpdate;
use crate::types::quiz_result::QuizResult;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The progress aggregator. Owns the store, the configuration and the clock,
/// and is passed explicitly to sessions.
///
/// Nothing is cached: every operation loads the record, changes it, and
/// saves it back.
pub struct Tracker<B: Backend> {
    store: Store<B>,
    config: Config,
    clock: Rc<dyn Clock>,
}

impl<B: Backend> Tracker<B> {
    pub fn new(backend: B, config: Config, clock: Rc<dyn Clock>) -> Self {
        let store = Store::new(backend, config.storage.prefix.clone());
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<B> {
        &mut self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The stored record, or the default one if it is missing or corrupt.
    pub fn get_progress(&self) -> ProgressRecord {
        self.store.load_or_else(PROGRESS_KEY, ProgressRecord::default)
    }

    pub fn save_progress(&mut self, record: &ProgressRecord) -> Fallible<()> {
        self.store.save(PROGRESS_KEY, record)
    }

    fn modify<T>(&mut self, f: impl FnOnce(&mut ProgressRecord) -> T) -> Fallible<T> {
        let mut record = self.get_progress();
        let out = f(&mut record);
        self.save_progress(&record)?;
        Ok(out)
    }

    /// A card's review state. Cards never reviewed get the unreviewed
    /// default, due now.
    pub fn get_flashcard_progress(&self, card_id: &str) -> ReviewState {
        self.get_progress().review_state(card_id, self.now())
    }

    /// Store one card's review state. Other cards are left as they are.
    pub fn save_flashcard_progress(&mut self, card_id: &str, state: ReviewState) -> Fallible<()> {
        self.modify(|record| {
            record.flashcard_progress.insert(card_id.to_string(), state);
        })
    }

    /// The review states of every card reviewed so far.
    pub fn flashcard_states(&self) -> BTreeMap<String, ReviewState> {
        self.get_progress().flashcard_progress
    }

    /// Append a quiz result to the history, stamped with the current time.
    /// Answer counters are not touched.
    pub fn record_quiz_result(&mut self, mut result: QuizResult) -> Fallible<QuizResult> {
        result.timestamp = self.now();
        log::debug!(
            "Recording {} result: {}/{} ({}%).",
            result.mode,
            result.correct,
            result.total_questions,
            result.percentage
        );
        let stored = result.clone();
        self.modify(|record| record.push_quiz_result(stored))?;
        Ok(result)
    }

    pub fn update_category_progress(&mut self, category: &str, was_correct: bool) -> Fallible<()> {
        self.modify(|record| record.update_category(category, was_correct))
    }

    pub fn record_answer(
        &mut self,
        category: &str,
        difficulty: Difficulty,
        was_correct: bool,
    ) -> Fallible<()> {
        self.modify(|record| record.record_answer(category, difficulty, was_correct))
    }

    /// Persist a finished quiz with a single write: count its answers,
    /// append the result stamped with the current time, and count today as
    /// a study day. On failure nothing is stored.
    pub fn complete_quiz<'a>(
        &mut self,
        answers: impl IntoIterator<Item = (&'a str, Difficulty, bool)>,
        mut result: QuizResult,
    ) -> Fallible<(QuizResult, StreakUpdate)> {
        let now = self.now();
        let tz = self.config.timezone();
        result.timestamp = now;
        let stored = result.clone();
        let (update, streak) = self.modify(|record| {
            for (category, difficulty, was_correct) in answers {
                record.record_answer(category, difficulty, was_correct);
            }
            record.push_quiz_result(stored);
            (record.apply_streak(now, tz), record.study_streak)
        })?;
        log::debug!(
            "Recorded {} result: {}/{} ({}%). Study streak is {streak} days.",
            result.mode,
            result.correct,
            result.total_questions,
            result.percentage
        );
        Ok((result, update))
    }

    /// Rate a card now and persist its new review state.
    pub fn rate_flashcard(&mut self, card_id: &str, rating: Rating) -> Fallible<Schedule> {
        let now = self.now();
        let schedule = self.modify(|record| {
            let mut state = record.review_state(card_id, now);
            let schedule = next_interval(state.interval(), rating, now);
            state.record_review(&schedule, now);
            record.flashcard_progress.insert(card_id.to_string(), state);
            schedule
        })?;
        log::debug!(
            "Rated card {card_id} {rating}: interval {}d, due in {}d.",
            schedule.interval_days,
            schedule.next_review_days
        );
        Ok(schedule)
    }

    /// Count `now` as a study day. Nothing is written when the day was
    /// already counted.
    pub fn update_streak(&mut self, now: Timestamp) -> Fallible<StreakUpdate> {
        let tz = self.config.timezone();
        let mut record = self.get_progress();
        let update = record.apply_streak(now, tz);
        if update != StreakUpdate::Unchanged {
            self.save_progress(&record)?;
            log::debug!("Study streak is now {} days.", record.study_streak);
        }
        Ok(update)
    }

    /// Replace the progress record with the default one.
    pub fn reset_progress(&mut self) -> Fallible<()> {
        log::debug!("Resetting progress.");
        self.save_progress(&ProgressRecord::default())
    }

    pub fn clear_all(&mut self) -> Fallible<()> {
        self.store.clear_all()
    }

    pub fn export(&self) -> Fallible<Map<String, Value>> {
        self.store.export()
    }

    pub fn import(&mut self, data: &Map<String, Value>) -> Fallible<()> {
        self.store.import(data)
    }

    pub fn pass_likelihood(&self, categories: &[Category]) -> PassLikelihood {
        predict(
            &self.get_progress(),
            categories,
            &self.config.prediction,
            self.now(),
            self.config.timezone(),
        )
    }

    pub fn dashboard(&self, categories: &[Category]) -> Dashboard {
        Dashboard::build(
            &self.get_progress(),
            categories,
            self.now(),
            self.config.timezone(),
        )
    }

    /// The cards of `deck` matching `filter`, in deck order.
    pub fn select_cards(&self, deck: &[Flashcard], filter: ReviewFilter) -> Vec<Flashcard> {
        let record = self.get_progress();
        let now = self.now();
        deck.iter()
            .filter(|card| filter.matches(record.flashcard_progress.get(&card.id), now))
            .cloned()
            .collect()
    }
}
