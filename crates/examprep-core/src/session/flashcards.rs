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

use rand::Rng;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::progress::Tracker;
use crate::rng::shuffle;
use crate::scheduler::Rating;
use crate::scheduler::Schedule;
use crate::session::Cursor;
use crate::session::ReviewFilter;
use crate::session::SessionState;
use crate::store::Backend;
use crate::types::item::Flashcard;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RateOutcome {
    /// The next card is now current. `schedule` is `None` if the rating
    /// could not be saved.
    Next { schedule: Option<Schedule> },
    /// That was the last card.
    Completed(ReviewSummary),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub cards: usize,
    pub rated: usize,
    pub hard: usize,
    pub medium: usize,
    pub easy: usize,
    pub time_seconds: u64,
}

pub struct FlashcardSession {
    cards: Vec<Flashcard>,
    ratings: Vec<Option<Rating>>,
    cursor: Cursor,
    flipped: bool,
    started_at: Option<Timestamp>,
    summary: Option<ReviewSummary>,
}

impl FlashcardSession {
    pub fn new(cards: Vec<Flashcard>) -> Fallible<Self> {
        let cursor = Cursor::new(cards.len(), "flashcard")?;
        let ratings = vec![None; cards.len()];
        Ok(Self {
            cards,
            ratings,
            cursor,
            flipped: false,
            started_at: None,
            summary: None,
        })
    }

    /// A session over the cards of `deck` that match `filter`, shuffled if
    /// the configuration says so.
    pub fn from_deck<B: Backend, R: Rng + ?Sized>(
        tracker: &Tracker<B>,
        deck: &[Flashcard],
        filter: ReviewFilter,
        rng: &mut R,
    ) -> Fallible<Self> {
        let mut cards = tracker.select_cards(deck, filter);
        if cards.is_empty() {
            return fail(format!("no {filter} cards to review."));
        }
        if tracker.config().flashcards.shuffle_cards {
            shuffle(&mut cards, rng);
        }
        Self::new(cards)
    }

    pub fn state(&self) -> SessionState {
        self.cursor.state()
    }

    pub fn card_count(&self) -> usize {
        self.cursor.len()
    }

    /// Position of the current item, while in progress.
    pub fn index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cursor.index().map(|i| &self.cards[i])
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn summary(&self) -> Option<&ReviewSummary> {
        self.summary.as_ref()
    }

    pub fn start<B: Backend>(&mut self, tracker: &Tracker<B>) -> Fallible<()> {
        self.cursor.start()?;
        self.started_at = Some(tracker.now());
        self.flipped = false;
        log::debug!("Started review of {} cards.", self.card_count());
        Ok(())
    }

    /// Turn the current card over. Returns whether the back is now showing.
    pub fn flip(&mut self) -> Fallible<bool> {
        self.cursor.active()?;
        self.flipped = !self.flipped;
        Ok(self.flipped)
    }

    pub fn next(&mut self) -> Fallible<bool> {
        let moved = self.cursor.next()?;
        if moved {
            self.flipped = false;
        }
        Ok(moved)
    }

    pub fn previous(&mut self) -> Fallible<bool> {
        let moved = self.cursor.previous()?;
        if moved {
            self.flipped = false;
        }
        Ok(moved)
    }

    /// Rate the current card and move on. The card must be flipped first.
    ///
    /// Failures to save the rating or the streak are logged, and the session
    /// advances anyway.
    pub fn rate<B: Backend>(
        &mut self,
        tracker: &mut Tracker<B>,
        rating: Rating,
    ) -> Fallible<RateOutcome> {
        let index = self.cursor.active()?;
        if !self.flipped {
            return fail("flip the card before rating it.");
        }
        let card_id = &self.cards[index].id;
        let schedule = match tracker.rate_flashcard(card_id, rating) {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                log::error!("Failed to save rating of card {card_id}: {e}");
                None
            }
        };
        let now = tracker.now();
        if let Err(e) = tracker.update_streak(now) {
            log::error!("Failed to update study streak: {e}");
        }
        self.ratings[index] = Some(rating);
        if self.next()? {
            return Ok(RateOutcome::Next { schedule });
        }
        self.cursor.complete();
        self.flipped = false;
        let summary = self.summarize(now);
        log::debug!("Review completed: {} cards rated.", summary.rated);
        self.summary = Some(summary.clone());
        Ok(RateOutcome::Completed(summary))
    }

    fn summarize(&self, now: Timestamp) -> ReviewSummary {
        let mut summary = ReviewSummary {
            cards: self.cards.len(),
            time_seconds: self.started_at.map_or(0, |start| now.seconds_since(start)),
            ..ReviewSummary::default()
        };
        for rating in self.ratings.iter().flatten() {
            summary.rated += 1;
            match rating {
                Rating::Hard => summary.hard += 1,
                Rating::Medium => summary.medium += 1,
                Rating::Easy => summary.easy += 1,
            }
        }
        summary
    }
}
