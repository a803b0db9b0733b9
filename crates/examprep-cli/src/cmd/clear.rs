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

use examprep_core::Fallible;

use crate::cmd::Context;
use crate::term::ask;
use crate::term::confirm;

const CONFIRMATION_WORD: &str = "delete";

/// Delete every stored key. Asks twice unless `force`.
pub fn clear_data(
    ctx: &Context,
    force: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    if !force {
        if !confirm(input, output, "Delete all progress, bookmarks and settings?")? {
            writeln!(output, "Nothing was deleted.")?;
            return Ok(());
        }
        let prompt = format!("This cannot be undone. Type '{CONFIRMATION_WORD}' to confirm: ");
        let answer = ask(input, output, &prompt)?;
        if answer.as_deref().map(str::trim) != Some(CONFIRMATION_WORD) {
            writeln!(output, "Nothing was deleted.")?;
            return Ok(());
        }
    }
    let mut tracker = ctx.tracker()?;
    let keys = tracker.store().short_keys()?.len();
    tracker.clear_all()?;
    writeln!(output, "Deleted {keys} keys.")?;
    Ok(())
}
