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
use serde::Serialize;

use crate::scheduler::Schedule;
use crate::types::timestamp::Timestamp;

/// Review state of a single flashcard.
///
/// A card that has never been rated has `review_count == 0`, no
/// `last_reviewed_at`, and is due immediately. The only way to change a state
/// is [`ReviewState::record_review`], which keeps those fields in step.
///
/// Blobs written by older versions of the browser app use `nextReview`,
/// `reviews` and `lastReview`; those names are accepted when reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// The last established interval, in days.
    #[serde(default)]
    interval: u32,
    /// When the card becomes due.
    #[serde(alias = "nextReview")]
    next_review_at: Timestamp,
    /// How many times the card has been rated.
    #[serde(default, alias = "reviews")]
    review_count: u32,
    /// When the card was last rated.
    #[serde(default, alias = "lastReview")]
    last_reviewed_at: Option<Timestamp>,
}

impl ReviewState {
    /// The state of a card that has never been reviewed: due right now.
    pub fn unreviewed(now: Timestamp) -> Self {
        Self {
            interval: 0,
            next_review_at: now,
            review_count: 0,
            last_reviewed_at: None,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn next_review_at(&self) -> Timestamp {
        self.next_review_at
    }

    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    pub fn last_reviewed_at(&self) -> Option<Timestamp> {
        self.last_reviewed_at
    }

    pub fn is_new(&self) -> bool {
        self.review_count == 0
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_review_at <= now
    }

    /// Apply the outcome of a rating given at `now`.
    pub fn record_review(&mut self, schedule: &Schedule, now: Timestamp) {
        self.interval = schedule.interval_days;
        self.next_review_at = schedule.next_review_at;
        self.review_count = self.review_count.saturating_add(1);
        self.last_reviewed_at = Some(now);
    }
}
