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

use serde::Deserialize;
use serde::Serialize;

use crate::clock::TimeZonePolicy;
use crate::types::item::Difficulty;
use crate::types::quiz_result::QuizResult;
use crate::types::quiz_result::percent;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

/// The most quiz results kept in the history.
pub const HISTORY_LIMIT: usize = 50;

/// Answered/correct counters for one category.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryStats {
    pub answered: u32,
    pub correct: u32,
}

impl CategoryStats {
    pub fn record(&mut self, was_correct: bool) {
        self.answered = self.answered.saturating_add(1);
        if was_correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct, self.answered)
    }
}

/// Everything the app remembers about the user's studying.
///
/// Every field has a default, so a blob with missing fields still loads.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub category_progress: BTreeMap<String, CategoryStats>,
    pub study_streak: u32,
    pub last_study_date: Option<Timestamp>,
    pub quiz_history: Vec<QuizResult>,
    pub flashcard_progress: BTreeMap<String, ReviewState>,
    pub hard_question_progress: CategoryStats,
}

/// What [`ProgressRecord::apply_streak`] did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakUpdate {
    /// Already counted today.
    Unchanged,
    /// Studied yesterday too: the streak grew.
    Extended,
    /// First study day, or a day was missed: the streak restarted at one.
    Restarted,
}

impl ProgressRecord {
    /// Append a result, evicting the oldest entries beyond the limit.
    pub fn push_quiz_result(&mut self, result: QuizResult) {
        self.quiz_history.push(result);
        if self.quiz_history.len() > HISTORY_LIMIT {
            let excess = self.quiz_history.len() - HISTORY_LIMIT;
            self.quiz_history.drain(..excess);
        }
    }

    pub fn update_category(&mut self, category: &str, was_correct: bool) {
        self.category_progress
            .entry(category.to_string())
            .or_default()
            .record(was_correct);
    }

    /// Count one answered question everywhere it counts.
    pub fn record_answer(&mut self, category: &str, difficulty: Difficulty, was_correct: bool) {
        self.total_questions = self.total_questions.saturating_add(1);
        if was_correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
        }
        self.update_category(category, was_correct);
        if difficulty == Difficulty::Hard {
            self.hard_question_progress.record(was_correct);
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct_answers, self.total_questions)
    }

    pub fn category(&self, category: &str) -> CategoryStats {
        self.category_progress
            .get(category)
            .copied()
            .unwrap_or_default()
    }

    /// The card's state, or the unreviewed default if it has none yet.
    pub fn review_state(&self, card_id: &str, now: Timestamp) -> ReviewState {
        self.flashcard_progress
            .get(card_id)
            .cloned()
            .unwrap_or_else(|| ReviewState::unreviewed(now))
    }

    /// Count `now` as a study day.
    pub fn apply_streak(&mut self, now: Timestamp, tz: TimeZonePolicy) -> StreakUpdate {
        let today = now.local_date(tz);
        let last = self.last_study_date.map(|ts| ts.local_date(tz));
        if last == Some(today) {
            return StreakUpdate::Unchanged;
        }
        let update = if last.is_some() && last == today.yesterday() {
            self.study_streak = self.study_streak.saturating_add(1);
            StreakUpdate::Extended
        } else {
            self.study_streak = 1;
            StreakUpdate::Restarted
        };
        self.last_study_date = Some(now);
        update
    }

    pub fn studied_on(&self, now: Timestamp, tz: TimeZonePolicy) -> bool {
        self.last_study_date
            .is_some_and(|ts| ts.local_date(tz) == now.local_date(tz))
    }

    /// The streak as of `now`: zero once a whole calendar day was missed,
    /// even though the stored counter only resets at the next study day.
    pub fn current_streak(&self, now: Timestamp, tz: TimeZonePolicy) -> u32 {
        let today = now.local_date(tz);
        match self.last_study_date.map(|ts| ts.local_date(tz)) {
            Some(last) if last == today || Some(last) == today.yesterday() => self.study_streak,
            _ => 0,
        }
    }

    /// The category of the most recent quiz, if it had one.
    pub fn last_studied_category(&self) -> Option<&str> {
        self.quiz_history.last()?.category.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::quiz_result::AnswerCounts;
    use crate::types::quiz_result::QuizMode;
    use crate::types::timestamp::MILLIS_PER_DAY;

    /// 2025-01-01T12:00:00Z
    const NOON: i64 = 1_735_732_800_000;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    fn result(correct: u32, timestamp: Timestamp) -> QuizResult {
        let counts = AnswerCounts {
            correct,
            incorrect: 10 - correct,
            unanswered: 0,
        };
        QuizResult::new(QuizMode::Quick, None, counts, 60, 70, timestamp)
    }

    #[test]
    fn test_default_record() {
        let record = ProgressRecord::default();
        assert_eq!(record.total_questions, 0);
        assert_eq!(record.accuracy_percent(), 0);
        assert!(record.quiz_history.is_empty());
        assert_eq!(record.last_studied_category(), None);
    }

    #[test]
    fn test_history_cap_evicts_oldest() {
        let mut record = ProgressRecord::default();
        for i in 0..51 {
            record.push_quiz_result(result(5, at(i)));
        }
        assert_eq!(record.quiz_history.len(), HISTORY_LIMIT);
        assert_eq!(record.quiz_history[0].timestamp, at(1));
        assert_eq!(record.quiz_history[49].timestamp, at(50));
        assert!(
            record
                .quiz_history
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
    }

    #[test]
    fn test_update_category_creates_entry() {
        let mut record = ProgressRecord::default();
        record.update_category("respiratory", true);
        record.update_category("respiratory", false);
        assert_eq!(
            record.category("respiratory"),
            CategoryStats {
                answered: 2,
                correct: 1
            }
        );
        assert_eq!(record.category("neurological"), CategoryStats::default());
    }

    #[test]
    fn test_record_answer() {
        let mut record = ProgressRecord::default();
        record.record_answer("cardiovascular", Difficulty::Hard, true);
        record.record_answer("cardiovascular", Difficulty::Easy, false);
        record.record_answer("trauma", Difficulty::Hard, false);
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.correct_answers, 1);
        assert_eq!(record.accuracy_percent(), 33);
        assert_eq!(record.category("cardiovascular").answered, 2);
        assert_eq!(
            record.hard_question_progress,
            CategoryStats {
                answered: 2,
                correct: 1
            }
        );
        assert!(record.total_questions >= record.correct_answers);
    }

    #[test]
    fn test_streak_first_day() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        assert_eq!(record.apply_streak(at(NOON), tz), StreakUpdate::Restarted);
        assert_eq!(record.study_streak, 1);
        assert_eq!(record.last_study_date, Some(at(NOON)));
    }

    #[test]
    fn test_streak_idempotent_within_day() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        record.apply_streak(at(NOON), tz);
        let snapshot = record.clone();
        assert_eq!(record.apply_streak(at(NOON), tz), StreakUpdate::Unchanged);
        assert_eq!(record, snapshot);
        // Later the same day is also a no-op, and keeps the first timestamp.
        assert_eq!(
            record.apply_streak(at(NOON + 3_600_000), tz),
            StreakUpdate::Unchanged
        );
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_streak_consecutive_days() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        record.apply_streak(at(NOON), tz);
        assert_eq!(
            record.apply_streak(at(NOON + MILLIS_PER_DAY), tz),
            StreakUpdate::Extended
        );
        assert_eq!(
            record.apply_streak(at(NOON + 2 * MILLIS_PER_DAY), tz),
            StreakUpdate::Extended
        );
        assert_eq!(record.study_streak, 3);
    }

    #[test]
    fn test_streak_gap_restarts() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        record.apply_streak(at(NOON), tz);
        record.apply_streak(at(NOON + MILLIS_PER_DAY), tz);
        assert_eq!(
            record.apply_streak(at(NOON + 3 * MILLIS_PER_DAY), tz),
            StreakUpdate::Restarted
        );
        assert_eq!(record.study_streak, 1);
    }

    #[test]
    fn test_streak_uses_calendar_days_not_hours() {
        // 23:30 then 00:30 the next day is a new day, an hour apart.
        let tz = TimeZonePolicy::utc();
        let late = NOON + 11 * 3_600_000 + 30 * 60_000;
        let mut record = ProgressRecord::default();
        record.apply_streak(at(late), tz);
        assert_eq!(
            record.apply_streak(at(late + 3_600_000), tz),
            StreakUpdate::Extended
        );
        assert_eq!(record.study_streak, 2);
    }

    #[test]
    fn test_current_streak_lapses() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        record.apply_streak(at(NOON), tz);
        record.apply_streak(at(NOON + MILLIS_PER_DAY), tz);
        assert_eq!(record.current_streak(at(NOON + MILLIS_PER_DAY), tz), 2);
        assert_eq!(record.current_streak(at(NOON + 2 * MILLIS_PER_DAY), tz), 2);
        assert_eq!(record.current_streak(at(NOON + 3 * MILLIS_PER_DAY), tz), 0);
        assert!(record.studied_on(at(NOON + MILLIS_PER_DAY), tz));
        assert!(!record.studied_on(at(NOON + 2 * MILLIS_PER_DAY), tz));
    }

    #[test]
    fn test_missing_fields_default() -> Fallible<()> {
        let record: ProgressRecord = serde_json::from_str(r#"{"totalQuestions":4}"#)?;
        assert_eq!(record.total_questions, 4);
        assert_eq!(record.correct_answers, 0);
        assert_eq!(record.hard_question_progress, CategoryStats::default());
        Ok(())
    }

    #[test]
    fn test_reads_legacy_blob() -> Fallible<()> {
        let json = r#"{
            "totalQuestions": 0,
            "correctAnswers": 0,
            "categoryProgress": {},
            "studyStreak": 2,
            "lastStudyDate": "2025-01-01T12:00:00.000Z",
            "quizHistory": [],
            "flashcardProgress": {
                "card1": {"interval": 1, "nextReview": 1735732800000, "reviews": 1, "lastReview": 1735128000000}
            }
        }"#;
        let record: ProgressRecord = serde_json::from_str(json)?;
        assert_eq!(record.study_streak, 2);
        assert_eq!(record.last_study_date, Some(at(NOON)));
        assert_eq!(record.review_state("card1", at(0)).review_count(), 1);
        Ok(())
    }

    #[test]
    fn test_review_state_default_is_due_now() {
        let record = ProgressRecord::default();
        let state = record.review_state("unknown", at(NOON));
        assert_eq!(state, ReviewState::unreviewed(at(NOON)));
    }

    #[test]
    fn test_last_studied_category() {
        let mut record = ProgressRecord::default();
        let mut focused = result(7, at(1));
        focused.category = Some("trauma".to_string());
        record.push_quiz_result(focused);
        assert_eq!(record.last_studied_category(), Some("trauma"));
        record.push_quiz_result(result(7, at(2)));
        assert_eq!(record.last_studied_category(), None);
    }
}
