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

use serde::Deserialize;

use crate::clock::TimeZonePolicy;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::quiz_result::QuizMode;

/// Application configuration. Every field has a default, so an empty TOML
/// document is a valid configuration.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub exam: ExamConfig,
    pub quiz: QuizConfig,
    pub flashcards: FlashcardsConfig,
    pub prediction: PredictionConfig,
    pub ui: UiConfig,
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExamConfig {
    pub name: String,
    /// Minimum percentage for a quiz to count as passed.
    pub passing_score_percent: u32,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            name: "CEN (Certified Emergency Nurse)".to_string(),
            passing_score_percent: 70,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    pub quick_questions: usize,
    pub focused_questions: usize,
    pub full_questions: usize,
    /// Time limit of a full practice exam.
    pub full_exam_minutes: u32,
    /// When to warn that time is running out.
    pub warning_minutes: u32,
    /// Reveal the correct option and rationale as soon as an answer is picked.
    pub show_rationale_immediately: bool,
    pub shuffle_questions: bool,
    pub shuffle_answers: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            quick_questions: 10,
            focused_questions: 25,
            full_questions: 150,
            full_exam_minutes: 180,
            warning_minutes: 5,
            show_rationale_immediately: true,
            shuffle_questions: true,
            shuffle_answers: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlashcardsConfig {
    /// Shuffle the cards of a review session.
    pub shuffle_cards: bool,
}

impl Default for FlashcardsConfig {
    fn default() -> Self {
        Self {
            shuffle_cards: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionConfig {
    pub weights: PredictionWeights,
    pub thresholds: PredictionThresholds,
    /// Window of the "recent accuracy" component.
    pub recent_days: u32,
    /// A streak this long earns the full consistency bonus.
    pub consistency_days: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionWeights {
    pub overall_accuracy: f64,
    pub recent_accuracy: f64,
    pub category_balance: f64,
    pub hard_question_accuracy: f64,
    pub consistency_bonus: f64,
}

impl PredictionWeights {
    pub fn sum(&self) -> f64 {
        self.overall_accuracy
            + self.recent_accuracy
            + self.category_balance
            + self.hard_question_accuracy
            + self.consistency_bonus
    }

    fn all(&self) -> [f64; 5] {
        [
            self.overall_accuracy,
            self.recent_accuracy,
            self.category_balance,
            self.hard_question_accuracy,
            self.consistency_bonus,
        ]
    }
}

impl Default for PredictionWeights {
    fn default() -> Self {
        Self {
            overall_accuracy: 0.30,
            recent_accuracy: 0.25,
            category_balance: 0.15,
            hard_question_accuracy: 0.20,
            consistency_bonus: 0.10,
        }
    }
}

/// Lower bounds of the pass-likelihood bands.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionThresholds {
    pub very_likely: u32,
    pub likely: u32,
    pub possible: u32,
    pub needs_work: u32,
}

impl Default for PredictionThresholds {
    fn default() -> Self {
        Self {
            very_likely: 85,
            likely: 70,
            possible: 55,
            needs_work: 0,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            weights: PredictionWeights::default(),
            thresholds: PredictionThresholds::default(),
            recent_days: 7,
            consistency_days: 7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub theme: String,
    pub animations_enabled: bool,
    pub sound_enabled: bool,
    pub show_jokes: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "emergency".to_string(),
            animations_enabled: true,
            sound_enabled: false,
            show_jokes: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Prefix of every key this app writes.
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: "cen_prep_".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Timezone used to decide calendar days: `local`, `utc`, or `+HH:MM`.
    pub timezone: TimeZonePolicy,
}

impl Config {
    pub fn from_toml(s: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.exam.passing_score_percent > 100 {
            return fail("exam.passing_score_percent must be at most 100.");
        }
        let quiz = &self.quiz;
        if quiz.quick_questions == 0 || quiz.focused_questions == 0 || quiz.full_questions == 0 {
            return fail("quiz question counts must be positive.");
        }
        if quiz.full_exam_minutes == 0 {
            return fail("quiz.full_exam_minutes must be positive.");
        }
        let weights = &self.prediction.weights;
        if weights.all().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return fail("prediction weights must be non-negative numbers.");
        }
        if (weights.sum() - 1.0).abs() > 1e-6 {
            return fail(format!(
                "prediction weights must sum to 1.0, but sum to {}.",
                weights.sum()
            ));
        }
        let t = &self.prediction.thresholds;
        if !(t.very_likely <= 100
            && t.very_likely >= t.likely
            && t.likely >= t.possible
            && t.possible >= t.needs_work)
        {
            return fail("prediction thresholds must be descending and at most 100.");
        }
        if self.prediction.consistency_days == 0 {
            return fail("prediction.consistency_days must be positive.");
        }
        if self.storage.prefix.is_empty() {
            return fail("storage.prefix must not be empty.");
        }
        Ok(())
    }

    /// How many questions a quiz in the given mode asks.
    pub fn question_count(&self, mode: QuizMode) -> usize {
        match mode {
            QuizMode::Quick => self.quiz.quick_questions,
            QuizMode::Focused => self.quiz.focused_questions,
            QuizMode::Full => self.quiz.full_questions,
        }
    }

    pub fn timezone(&self) -> TimeZonePolicy {
        self.calendar.timezone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() -> Fallible<()> {
        let config = Config::from_toml("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.exam.passing_score_percent, 70);
        assert_eq!(config.question_count(QuizMode::Quick), 10);
        assert_eq!(config.question_count(QuizMode::Focused), 25);
        assert_eq!(config.question_count(QuizMode::Full), 150);
        assert_eq!(config.quiz.full_exam_minutes, 180);
        assert!(config.quiz.show_rationale_immediately);
        assert!(config.flashcards.shuffle_cards);
        assert_eq!(config.storage.prefix, "cen_prep_");
        Ok(())
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((PredictionWeights::default().sum() - 1.0).abs() < 1e-9);
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() -> Fallible<()> {
        let config = Config::from_toml(
            r#"
            [exam]
            passing_score_percent = 75

            [calendar]
            timezone = "+02:00"
            "#,
        )?;
        assert_eq!(config.exam.passing_score_percent, 75);
        assert_eq!(config.quiz.quick_questions, 10);
        assert_eq!(config.timezone().to_string(), "+02:00");
        Ok(())
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let result = Config::from_toml(
            r#"
            [prediction.weights]
            overall_accuracy = 0.5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_thresholds_must_descend() {
        let result = Config::from_toml(
            r#"
            [prediction.thresholds]
            likely = 90
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("[quiz]\nquick = 3\n").is_err());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        assert!(Config::from_toml("[calendar]\ntimezone = \"moon\"\n").is_err());
    }

    #[test]
    fn test_out_of_range_timezone_rejected() {
        assert!(Config::from_toml("[calendar]\ntimezone = \"+999999999:00\"\n").is_err());
        assert!(Config::from_toml("[calendar]\ntimezone = \"-24:00\"\n").is_err());
    }

    #[test]
    fn test_session_flags() -> Fallible<()> {
        let config = Config::from_toml(
            r#"
            [quiz]
            show_rationale_immediately = false

            [flashcards]
            shuffle_cards = false
            "#,
        )?;
        assert!(!config.quiz.show_rationale_immediately);
        assert!(!config.flashcards.shuffle_cards);
        Ok(())
    }
}
