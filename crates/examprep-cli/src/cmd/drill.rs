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

use std::io::BufRead;
use std::io::Write;

use examprep_core::Backend;
use examprep_core::FlashcardSession;
use examprep_core::Fallible;
use examprep_core::Rating;
use examprep_core::Tracker;
use examprep_core::rng::shuffle;
use examprep_core::session::ReviewFilter;
use examprep_core::session::flashcards::RateOutcome;
use examprep_core::stats::format_duration;
use examprep_core::types::item::Flashcard;
use rand::Rng;

use crate::cmd::Context;
use crate::term::ask;

pub fn drill_cards(
    ctx: &Context,
    filter: ReviewFilter,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let mut tracker = ctx.tracker()?;
    let content = ctx.content()?;
    let cards = drill_order(&tracker, &content.flashcards, filter, &mut rand::rng());
    if cards.is_empty() {
        writeln!(output, "No {filter} cards to review.")?;
        return Ok(());
    }
    run_drill(&mut tracker, cards, input, output)
}

/// The cards of `deck` matching `filter`, shuffled if so configured.
pub fn drill_order<B: Backend, R: Rng + ?Sized>(
    tracker: &Tracker<B>,
    deck: &[Flashcard],
    filter: ReviewFilter,
    rng: &mut R,
) -> Vec<Flashcard> {
    let mut cards = tracker.select_cards(deck, filter);
    if tracker.config().flashcards.shuffle_cards {
        shuffle(&mut cards, rng);
    }
    cards
}

/// Review `cards` interactively. Ends early at end of input or on `q`.
pub fn run_drill<B: Backend>(
    tracker: &mut Tracker<B>,
    cards: Vec<Flashcard>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let mut session = FlashcardSession::new(cards)?;
    session.start(tracker)?;
    let total = session.card_count();
    while let (Some(index), Some(card)) = (session.index(), session.current()) {
        let (front, back) = (card.front.clone(), card.back.clone());
        writeln!(output)?;
        writeln!(output, "[{}/{total}] Q: {front}", index + 1)?;
        match ask(input, output, "[press enter to reveal, q to quit] ")? {
            Some(line) if line.trim() != "q" => {}
            _ => return end_early(output),
        }
        session.flip()?;
        writeln!(output, "A: {back}")?;
        let Some(rating) = read_rating(input, output)? else {
            return end_early(output);
        };
        match session.rate(tracker, rating)? {
            RateOutcome::Next { schedule } => {
                if let Some(schedule) = schedule {
                    writeln!(output, "Next review in {} days.", schedule.next_review_days)?;
                }
            }
            RateOutcome::Completed(summary) => {
                writeln!(output)?;
                writeln!(
                    output,
                    "Reviewed {} cards in {}: {} hard, {} medium, {} easy.",
                    summary.rated,
                    format_duration(summary.time_seconds),
                    summary.hard,
                    summary.medium,
                    summary.easy
                )?;
            }
        }
    }
    Ok(())
}

fn read_rating(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Option<Rating>> {
    loop {
        let Some(line) = ask(input, output, "Rating: (1 = Hard, 2 = Medium, 3 = Easy) ")? else {
            return Ok(None);
        };
        match line.trim() {
            "1" => return Ok(Some(Rating::Hard)),
            "2" => return Ok(Some(Rating::Medium)),
            "3" => return Ok(Some(Rating::Easy)),
            "q" => return Ok(None),
            _ => writeln!(output, "Invalid input. Please enter 1, 2 or 3.")?,
        }
    }
}

fn end_early(output: &mut impl Write) -> Fallible<()> {
    writeln!(output)?;
    writeln!(output, "Session ended. Ratings given so far are saved.")?;
    Ok(())
}
