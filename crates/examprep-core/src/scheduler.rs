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

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// Days until a card rated `hard` comes back, whatever its history.
const HARD_DELAY_DAYS: f64 = 1.0;

/// First delay for a card rated `medium` before any interval exists.
const MEDIUM_FIRST_DELAY_DAYS: f64 = 3.0;

/// First delay for a card rated `easy` before any interval exists.
const EASY_FIRST_DELAY_DAYS: f64 = 7.0;

const MEDIUM_MULTIPLIER: f64 = 1.5;

const EASY_MULTIPLIER: f64 = 2.5;

/// How well the user recalled a card.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Rating {
    Hard,
    Medium,
    Easy,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Hard => "hard",
            Rating::Medium => "medium",
            Rating::Easy => "easy",
        }
    }
}

/// Unknown ratings fall back to `hard`, so a bad value from the UI can only
/// ever make a card come back sooner.
impl From<&str> for Rating {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "medium" => Rating::Medium,
            "easy" => Rating::Easy,
            "hard" => Rating::Hard,
            other => {
                log::warn!("Unknown rating '{other}', treating it as hard.");
                Rating::Hard
            }
        }
    }
}

impl From<String> for Rating {
    fn from(value: String) -> Self {
        Rating::from(value.as_str())
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of scheduling one rating.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// The card's new interval, in days.
    pub interval_days: u32,
    /// How many days from now the card is due.
    pub next_review_days: u32,
    /// When the card is due.
    pub next_review_at: Timestamp,
}

/// Compute the next review of a card whose current interval is
/// `current_interval_days`, rated `rating` at `now`.
///
/// The interval and the delay are computed separately: the interval is
/// `max(1, current)` for any passing rating, while the delay scales the
/// current interval. Both are rounded to whole days last.
pub fn next_interval(current_interval_days: u32, rating: Rating, now: Timestamp) -> Schedule {
    let current = current_interval_days as f64;
    let (interval, delay) = match rating {
        Rating::Hard => (0.0, HARD_DELAY_DAYS),
        Rating::Medium => {
            let delay = if current_interval_days == 0 {
                MEDIUM_FIRST_DELAY_DAYS
            } else {
                current * MEDIUM_MULTIPLIER
            };
            (current.max(1.0), delay)
        }
        Rating::Easy => {
            let delay = if current_interval_days == 0 {
                EASY_FIRST_DELAY_DAYS
            } else {
                current * EASY_MULTIPLIER
            };
            (current.max(1.0), delay)
        }
    };
    let interval_days = interval.round() as u32;
    let next_review_days = delay.round() as u32;
    Schedule {
        interval_days,
        next_review_days,
        next_review_at: now.plus_days(next_review_days),
    }
}
