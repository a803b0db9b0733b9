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

use serde::Serialize;

use crate::clock::TimeZonePolicy;
use crate::prediction::completion_percent;
use crate::types::date::Date;
use crate::types::item::Category;
use crate::types::progress::ProgressRecord;
use crate::types::quiz_result::QuizResult;
use crate::types::timestamp::Timestamp;

/// How many quizzes the dashboard lists.
pub const RECENT_QUIZ_COUNT: usize = 10;

/// How many days the activity calendar covers, ending today.
pub const CALENDAR_DAYS: u32 = 7;

/// Everything the progress page shows, derived from the record on demand.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub questions_answered: u32,
    pub accuracy_percent: u32,
    pub quizzes_taken: usize,
    pub study_streak: u32,
    pub studied_today: bool,
    /// Cards rated at least once.
    pub cards_reviewed: usize,
    /// Cards with any stored review state.
    pub cards_tracked: usize,
    pub cards_due: usize,
    pub total_reviews: u32,
    pub categories: Vec<CategoryReport>,
    /// Most recent first.
    pub recent_quizzes: Vec<QuizResult>,
    /// Oldest first, ending today.
    pub calendar: Vec<ActivityDay>,
    pub last_studied_category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub id: String,
    pub name: String,
    pub answered: u32,
    pub correct: u32,
    pub accuracy_percent: u32,
    pub completion_percent: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDay {
    pub date: Date,
    pub weekday: String,
    pub is_today: bool,
    pub quizzes: usize,
}

impl ActivityDay {
    pub fn active(&self) -> bool {
        self.quizzes > 0
    }
}

impl Dashboard {
    pub fn build(
        record: &ProgressRecord,
        categories: &[Category],
        now: Timestamp,
        tz: TimeZonePolicy,
    ) -> Self {
        let categories = categories
            .iter()
            .map(|c| {
                let stats = record.category(&c.id);
                CategoryReport {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    answered: stats.answered,
                    correct: stats.correct,
                    accuracy_percent: stats.accuracy_percent(),
                    completion_percent: completion_percent(
                        stats.answered,
                        c.target_practice_questions,
                    ),
                }
            })
            .collect();
        let recent_quizzes = record
            .quiz_history
            .iter()
            .rev()
            .take(RECENT_QUIZ_COUNT)
            .cloned()
            .collect();
        let cards = record.flashcard_progress.values();
        Self {
            questions_answered: record.total_questions,
            accuracy_percent: record.accuracy_percent(),
            quizzes_taken: record.quiz_history.len(),
            study_streak: record.current_streak(now, tz),
            studied_today: record.studied_on(now, tz),
            cards_reviewed: cards.clone().filter(|s| !s.is_new()).count(),
            cards_tracked: record.flashcard_progress.len(),
            cards_due: cards.clone().filter(|s| s.is_due(now)).count(),
            total_reviews: cards.fold(0u32, |n, s| n.saturating_add(s.review_count())),
            categories,
            recent_quizzes,
            calendar: activity_calendar(record, now, tz),
            last_studied_category: record.last_studied_category().map(str::to_string),
        }
    }
}

/// One entry per day of the last week, counting the quizzes taken that day.
pub fn activity_calendar(
    record: &ProgressRecord,
    now: Timestamp,
    tz: TimeZonePolicy,
) -> Vec<ActivityDay> {
    let today = now.local_date(tz);
    (0..CALENDAR_DAYS)
        .rev()
        .map(|offset| {
            let date = today.days_before(offset);
            let quizzes = record
                .quiz_history
                .iter()
                .filter(|r| r.timestamp.local_date(tz) == date)
                .count();
            ActivityDay {
                date,
                weekday: date.weekday_name(),
                is_today: offset == 0,
                quizzes,
            }
        })
        .collect()
}

/// Render a duration like `1h 5m`, `4m 2s` or `9s`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Rating;
    use crate::scheduler::next_interval;
    use crate::types::item::Difficulty;
    use crate::types::quiz_result::AnswerCounts;
    use crate::types::quiz_result::QuizMode;
    use crate::types::review_state::ReviewState;
    use crate::types::timestamp::MILLIS_PER_DAY;

    /// 2025-01-01T12:00:00Z, a Wednesday.
    const NOON: i64 = 1_735_732_800_000;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    fn quiz(category: Option<&str>, ts: Timestamp) -> QuizResult {
        let counts = AnswerCounts {
            correct: 8,
            incorrect: 2,
            unanswered: 0,
        };
        let category = category.map(str::to_string);
        QuizResult::new(QuizMode::Focused, category, counts, 90, 70, ts)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(9), "9s");
        assert_eq!(format_duration(242), "4m 2s");
        assert_eq!(format_duration(3900), "1h 5m");
        assert_eq!(format_duration(3600), "1h 0m");
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = Dashboard::build(
            &ProgressRecord::default(),
            &[],
            at(NOON),
            TimeZonePolicy::utc(),
        );
        assert_eq!(dashboard.questions_answered, 0);
        assert_eq!(dashboard.accuracy_percent, 0);
        assert_eq!(dashboard.study_streak, 0);
        assert!(!dashboard.studied_today);
        assert!(dashboard.recent_quizzes.is_empty());
        assert_eq!(dashboard.calendar.len(), CALENDAR_DAYS as usize);
        assert!(dashboard.calendar.iter().all(|d| !d.active()));
    }

    #[test]
    fn test_recent_quizzes_most_recent_first() {
        let mut record = ProgressRecord::default();
        for i in 0..12 {
            record.push_quiz_result(quiz(None, at(NOON + i * 1000)));
        }
        let dashboard = Dashboard::build(&record, &[], at(NOON), TimeZonePolicy::utc());
        assert_eq!(dashboard.quizzes_taken, 12);
        assert_eq!(dashboard.recent_quizzes.len(), RECENT_QUIZ_COUNT);
        assert_eq!(dashboard.recent_quizzes[0].timestamp, at(NOON + 11_000));
        assert_eq!(dashboard.recent_quizzes[9].timestamp, at(NOON + 2_000));
    }

    #[test]
    fn test_activity_calendar() {
        let tz = TimeZonePolicy::utc();
        let mut record = ProgressRecord::default();
        record.push_quiz_result(quiz(Some("trauma"), at(NOON - 8 * MILLIS_PER_DAY)));
        record.push_quiz_result(quiz(Some("trauma"), at(NOON - 2 * MILLIS_PER_DAY)));
        record.push_quiz_result(quiz(Some("cardiology"), at(NOON)));
        record.push_quiz_result(quiz(Some("cardiology"), at(NOON + 1000)));
        let calendar = activity_calendar(&record, at(NOON), tz);
        assert_eq!(calendar.len(), 7);
        assert_eq!(calendar[0].date.to_string(), "2024-12-26");
        assert_eq!(calendar[6].date.to_string(), "2025-01-01");
        assert_eq!(calendar[6].weekday, "Wed");
        assert!(calendar[6].is_today);
        assert_eq!(calendar[6].quizzes, 2);
        assert_eq!(calendar[4].quizzes, 1);
        assert_eq!(calendar.iter().filter(|d| d.active()).count(), 2);
    }

    #[test]
    fn test_category_and_card_counts() {
        let tz = TimeZonePolicy::utc();
        let now = at(NOON);
        let mut record = ProgressRecord::default();
        for i in 0..4 {
            record.record_answer("trauma", Difficulty::Medium, i != 0);
        }
        record.push_quiz_result(quiz(Some("trauma"), now));
        let mut rated = ReviewState::unreviewed(now);
        rated.record_review(&next_interval(0, Rating::Easy, now), now);
        record.flashcard_progress.insert("a".to_string(), rated);
        record
            .flashcard_progress
            .insert("b".to_string(), ReviewState::unreviewed(now));
        record.apply_streak(now, tz);
        let categories = [Category {
            id: "trauma".to_string(),
            name: "Trauma".to_string(),
            target_practice_questions: 8,
            exam_percentage: 20,
        }];
        let dashboard = Dashboard::build(&record, &categories, now, tz);
        assert_eq!(dashboard.questions_answered, 4);
        assert_eq!(dashboard.accuracy_percent, 75);
        assert_eq!(dashboard.categories[0].accuracy_percent, 75);
        assert_eq!(dashboard.categories[0].completion_percent, 50);
        assert_eq!(dashboard.cards_tracked, 2);
        assert_eq!(dashboard.cards_reviewed, 1);
        assert_eq!(dashboard.cards_due, 1);
        assert_eq!(dashboard.total_reviews, 1);
        assert_eq!(dashboard.study_streak, 1);
        assert!(dashboard.studied_today);
        assert_eq!(dashboard.last_studied_category.as_deref(), Some("trauma"));
    }
}
