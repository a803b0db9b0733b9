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
use std::path::Path;

use examprep_core::Fallible;
use examprep_core::fail;
use serde_json::Value;

use crate::cmd::Context;
use crate::term::confirm;

/// Overwrite stored data with an export. Keys absent from the export are
/// left alone.
pub fn import_data(
    ctx: &Context,
    file: &Path,
    force: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    if !file.exists() {
        return fail(format!("file {} does not exist.", file.display()));
    }
    let text = std::fs::read_to_string(file)?;
    let Value::Object(data) = serde_json::from_str::<Value>(&text)? else {
        return fail("import file must contain a JSON object.");
    };
    if !force && !confirm(input, output, "Importing overwrites stored progress. Continue?")? {
        writeln!(output, "Import cancelled.")?;
        return Ok(());
    }
    let mut tracker = ctx.tracker()?;
    tracker.import(&data)?;
    writeln!(output, "Imported {} keys.", data.len())?;
    Ok(())
}
