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

use std::io::Write;

use chrono::Local;
use examprep_core::Fallible;
use examprep_core::session::ReviewFilter;
use examprep_core::types::item::Flashcard;
use examprep_core::types::timestamp::Timestamp;

use crate::cmd::Context;

pub fn print_due_cards(ctx: &Context, output: &mut impl Write) -> Fallible<()> {
    let tracker = ctx.tracker()?;
    let content = ctx.content()?;
    let due = tracker.select_cards(&content.flashcards, ReviewFilter::Due);
    let progress = tracker.flashcard_states();
    writeln!(
        output,
        "{} of {} cards due.",
        due.len(),
        content.flashcards.len()
    )?;
    for card in &due {
        let since = progress.get(&card.id).map(|state| state.next_review_at());
        writeln!(output, "{}", describe(card, since))?;
    }
    Ok(())
}

fn describe(card: &Flashcard, due_since: Option<Timestamp>) -> String {
    let when = match due_since {
        Some(ts) => format!(
            "due since {}",
            ts.into_inner().with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => "new".to_string(),
    };
    format!("  {:<12} {:<20} {}  ({when})", card.id, card.category, card.front)
}
