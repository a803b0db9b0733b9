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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::clock::TimeZonePolicy;
use crate::config::PredictionConfig;
use crate::config::PredictionThresholds;
use crate::types::item::Category;
use crate::types::progress::ProgressRecord;
use crate::types::quiz_result::percent;
use crate::types::timestamp::MILLIS_PER_DAY;
use crate::types::timestamp::Timestamp;

/// Qualitative pass-likelihood classification.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Band {
    VeryLikely,
    Likely,
    Possible,
    NeedsWork,
}

impl Band {
    pub fn from_score(score: u32, thresholds: &PredictionThresholds) -> Self {
        if score >= thresholds.very_likely {
            Band::VeryLikely
        } else if score >= thresholds.likely {
            Band::Likely
        } else if score >= thresholds.possible {
            Band::Possible
        } else {
            Band::NeedsWork
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Band::VeryLikely => "Very likely to pass",
            Band::Likely => "Likely to pass",
            Band::Possible => "Possible, keep studying",
            Band::NeedsWork => "Needs more preparation",
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The blended inputs, each on a 0-100 scale.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Accuracy over every question ever answered.
    pub overall_accuracy: f64,
    /// Accuracy over quizzes taken in the recent window.
    pub recent_accuracy: f64,
    /// Mean completion across the exam's categories.
    pub category_balance: f64,
    /// Accuracy on questions tagged hard.
    pub hard_question_accuracy: f64,
    /// Current streak relative to the consistency target.
    pub consistency: f64,
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassLikelihood {
    pub score: u32,
    pub band: Band,
    pub components: Components,
}

/// Estimate how likely the user is to pass, from their progress as of `now`.
pub fn predict(
    record: &ProgressRecord,
    categories: &[Category],
    config: &PredictionConfig,
    now: Timestamp,
    tz: TimeZonePolicy,
) -> PassLikelihood {
    let components = Components {
        overall_accuracy: record.accuracy_percent() as f64,
        recent_accuracy: recent_accuracy(record, config.recent_days, now),
        category_balance: category_balance(record, categories),
        hard_question_accuracy: record.hard_question_progress.accuracy_percent() as f64,
        consistency: consistency(record.current_streak(now, tz), config.consistency_days),
    };
    let w = &config.weights;
    let blended = w.overall_accuracy * components.overall_accuracy
        + w.recent_accuracy * components.recent_accuracy
        + w.category_balance * components.category_balance
        + w.hard_question_accuracy * components.hard_question_accuracy
        + w.consistency_bonus * components.consistency;
    let score = blended.round().clamp(0.0, 100.0) as u32;
    PassLikelihood {
        score,
        band: Band::from_score(score, &config.thresholds),
        components,
    }
}

/// Percentage of questions answered correctly in quizzes taken within the
/// last `days` days. Zero when there were none.
fn recent_accuracy(record: &ProgressRecord, days: u32, now: Timestamp) -> f64 {
    let since = now.into_millis() - days as i64 * MILLIS_PER_DAY;
    let (correct, total) = record
        .quiz_history
        .iter()
        .filter(|r| r.timestamp.into_millis() >= since)
        .fold((0u32, 0u32), |(c, t), r| {
            (c.saturating_add(r.correct), t.saturating_add(r.total_questions))
        });
    percent(correct, total) as f64
}

fn category_balance(record: &ProgressRecord, categories: &[Category]) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }
    let sum: u32 = categories
        .iter()
        .map(|c| completion_percent(record.category(&c.id).answered, c.target_practice_questions))
        .sum();
    sum as f64 / categories.len() as f64
}

fn consistency(streak: u32, target_days: u32) -> f64 {
    if target_days == 0 {
        return 0.0;
    }
    (streak as f64 / target_days as f64 * 100.0).min(100.0)
}

/// `min(100, round(answered / target * 100))`, or zero without a target.
pub fn completion_percent(answered: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }
    percent(answered, target).min(100)
}
