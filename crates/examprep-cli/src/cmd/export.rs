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
use std::path::PathBuf;

use examprep_core::Fallible;
use serde_json::Value;

use crate::cmd::Context;

/// Write every stored key as one JSON object, to `path` or to `output`.
pub fn export_data(ctx: &Context, path: Option<PathBuf>, output: &mut impl Write) -> Fallible<()> {
    let tracker = ctx.tracker()?;
    let data = tracker.export()?;
    let json = serde_json::to_string_pretty(&Value::Object(data))?;
    match path {
        Some(path) => {
            std::fs::write(&path, json)?;
            writeln!(output, "Exported to {}.", path.display())?;
        }
        None => writeln!(output, "{json}")?,
    }
    Ok(())
}
