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

use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use examprep_core::Fallible;
use examprep_core::QuizMode;
use examprep_core::session::ReviewFilter;

use crate::cmd::Context;
use crate::cmd::clear::clear_data;
use crate::cmd::drill::drill_cards;
use crate::cmd::due::print_due_cards;
use crate::cmd::export::export_data;
use crate::cmd::import::import_data;
use crate::cmd::quiz::take_quiz;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;

/// Environment variable naming the data directory.
pub const DIR_ENV: &str = "EXAMPREP_DIR";

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory. Defaults to $EXAMPREP_DIR, then the current directory.
    #[arg(long, global = true)]
    dir: Option<String>,
    /// Content file. Defaults to `content.json` in the data directory.
    #[arg(long, global = true)]
    content: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show progress and the pass likelihood.
    Stats {
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Print all stored data as JSON.
    Export {
        /// Write to this file instead of standard output.
        #[arg(long)]
        output: Option<String>,
    },
    /// Replace stored data with the contents of an export.
    Import {
        /// Path to a JSON export.
        file: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        force: bool,
    },
    /// Delete all stored data.
    Clear {
        /// Do not ask for confirmation.
        #[arg(long)]
        force: bool,
    },
    /// List the flashcards due for review.
    Due,
    /// Review flashcards.
    Drill {
        /// Which cards to review: all, due, or new.
        #[arg(long, default_value_t = ReviewFilter::Due)]
        filter: ReviewFilter,
    },
    /// Take a quiz.
    Quiz {
        /// Quiz mode: quick, focused, or full.
        #[arg(long, default_value_t = QuizMode::Quick)]
        mode: QuizMode,
        /// Restrict the quiz to one category.
        #[arg(long)]
        category: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let ctx = Context::new(
        resolve_directory(cli.dir)?,
        cli.content.map(PathBuf::from),
    )?;
    let mut input = stdin().lock();
    let mut output = stdout().lock();
    match cli.command {
        Command::Stats { format } => print_stats(&ctx, format, &mut output),
        Command::Export { output: path } => export_data(&ctx, path.map(PathBuf::from), &mut output),
        Command::Import { file, force } => {
            import_data(&ctx, &PathBuf::from(file), force, &mut input, &mut output)
        }
        Command::Clear { force } => clear_data(&ctx, force, &mut input, &mut output),
        Command::Due => print_due_cards(&ctx, &mut output),
        Command::Drill { filter } => drill_cards(&ctx, filter, &mut input, &mut output),
        Command::Quiz { mode, category } => {
            take_quiz(&ctx, mode, category.as_deref(), &mut input, &mut output)
        }
    }
}

fn resolve_directory(dir: Option<String>) -> Fallible<PathBuf> {
    match dir {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => match std::env::var_os(DIR_ENV) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(std::env::current_dir()?),
        },
    }
}
