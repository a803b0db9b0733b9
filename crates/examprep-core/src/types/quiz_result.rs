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
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// A short mixed quiz.
    Quick,
    /// Practice on a single category.
    Focused,
    /// A timed, full-length practice exam.
    Full,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Quick => "quick",
            QuizMode::Focused => "focused",
            QuizMode::Full => "full",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizMode::Quick => "Quick Quiz",
            QuizMode::Focused => "Focused Practice",
            QuizMode::Full => "Full Exam",
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, QuizMode::Full)
    }
}

impl FromStr for QuizMode {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(QuizMode::Quick),
            "focused" => Ok(QuizMode::Focused),
            "full" => Ok(QuizMode::Full),
            _ => fail(format!("Invalid quiz mode: {s}")),
        }
    }
}

impl Display for QuizMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The summary of one completed quiz. Entries in the quiz history are never
/// modified after they are appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub mode: QuizMode,
    /// The category the quiz was restricted to. `None` for mixed quizzes.
    #[serde(default)]
    pub category: Option<String>,
    pub total_questions: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub percentage: u32,
    pub time_seconds: u64,
    pub passed: bool,
    pub timestamp: Timestamp,
}

impl QuizResult {
    /// Build a result from raw counts. The total, percentage and pass flag
    /// are derived here so they can never disagree with the counts.
    pub fn new(
        mode: QuizMode,
        category: Option<String>,
        counts: AnswerCounts,
        time_seconds: u64,
        passing_score_percent: u32,
        timestamp: Timestamp,
    ) -> Self {
        let total_questions = counts.total();
        let percentage = percent(counts.correct, total_questions);
        Self {
            mode,
            category,
            total_questions,
            correct: counts.correct,
            incorrect: counts.incorrect,
            unanswered: counts.unanswered,
            percentage,
            time_seconds,
            passed: percentage >= passing_score_percent,
            timestamp,
        }
    }
}

/// Tally of a quiz's answers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct AnswerCounts {
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
}

impl AnswerCounts {
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.unanswered
    }
}

/// `round(part / whole * 100)`, or zero when `whole` is zero.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn counts(correct: u32, incorrect: u32, unanswered: u32) -> AnswerCounts {
        AnswerCounts {
            correct,
            incorrect,
            unanswered,
        }
    }

    #[test]
    fn test_pass_threshold() -> Fallible<()> {
        let ts = Timestamp::from_millis(0)?;
        let at_70 = QuizResult::new(QuizMode::Quick, None, counts(7, 2, 1), 60, 70, ts);
        assert_eq!(at_70.total_questions, 10);
        assert_eq!(at_70.percentage, 70);
        assert!(at_70.passed);
        let at_71 = QuizResult::new(QuizMode::Quick, None, counts(7, 2, 1), 60, 71, ts);
        assert!(!at_71.passed);
        Ok(())
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn test_json_shape() -> Fallible<()> {
        let ts = Timestamp::from_millis(1_000)?;
        let result = QuizResult::new(
            QuizMode::Focused,
            Some("cardiovascular".to_string()),
            counts(1, 1, 0),
            30,
            70,
            ts,
        );
        let json = serde_json::to_string(&result)?;
        assert_eq!(
            json,
            r#"{"mode":"focused","category":"cardiovascular","totalQuestions":2,"correct":1,"incorrect":1,"unanswered":0,"percentage":50,"timeSeconds":30,"passed":false,"timestamp":1000}"#
        );
        let back: QuizResult = serde_json::from_str(&json)?;
        assert_eq!(back, result);
        Ok(())
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("full".parse::<QuizMode>().ok(), Some(QuizMode::Full));
        assert!("marathon".parse::<QuizMode>().is_err());
    }
}
