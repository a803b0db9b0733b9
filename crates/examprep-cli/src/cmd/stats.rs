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
use std::io::Write;

use clap::ValueEnum;
use examprep_core::Fallible;
use examprep_core::prediction::PassLikelihood;
use examprep_core::stats::Dashboard;
use examprep_core::stats::format_duration;
use serde::Serialize;

use crate::cmd::Context;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    dashboard: Dashboard,
    pass_likelihood: PassLikelihood,
}

pub fn print_stats(ctx: &Context, format: StatsFormat, output: &mut impl Write) -> Fallible<()> {
    let tracker = ctx.tracker()?;
    let content = ctx.content_or_default()?;
    let stats = Stats {
        dashboard: tracker.dashboard(&content.categories),
        pass_likelihood: tracker.pass_likelihood(&content.categories),
    };
    match format {
        StatsFormat::Text => write_report(&stats, output),
        StatsFormat::Json => {
            let json = serde_json::to_string_pretty(&stats)?;
            writeln!(output, "{json}")?;
            Ok(())
        }
    }
}

fn write_report(stats: &Stats, out: &mut impl Write) -> Fallible<()> {
    let d = &stats.dashboard;
    let p = &stats.pass_likelihood;
    writeln!(out, "Questions answered: {}", d.questions_answered)?;
    writeln!(out, "Accuracy:           {}%", d.accuracy_percent)?;
    writeln!(out, "Quizzes taken:      {}", d.quizzes_taken)?;
    let today = if d.studied_today { "" } else { " (not yet today)" };
    writeln!(out, "Study streak:       {} days{today}", d.study_streak)?;
    writeln!(
        out,
        "Flashcards:         {} reviewed, {} due, {} reviews",
        d.cards_reviewed, d.cards_due, d.total_reviews
    )?;
    if let Some(category) = &d.last_studied_category {
        writeln!(out, "Last studied:       {category}")?;
    }
    writeln!(out)?;
    writeln!(out, "Pass likelihood: {}% ({})", p.score, p.band)?;
    if !d.categories.is_empty() {
        writeln!(out)?;
        writeln!(out, "Categories:")?;
        for c in &d.categories {
            writeln!(
                out,
                "  {:<30} {:>4} answered  {:>3}% accuracy  {:>3}% complete",
                c.name, c.answered, c.accuracy_percent, c.completion_percent
            )?;
        }
    }
    if !d.recent_quizzes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recent quizzes:")?;
        for q in &d.recent_quizzes {
            writeln!(
                out,
                "  {:<16} {:>3}%  {}  {}",
                q.mode.label(),
                q.percentage,
                if q.passed { "passed" } else { "failed" },
                format_duration(q.time_seconds)
            )?;
        }
    }
    writeln!(out)?;
    let calendar: Vec<String> = d
        .calendar
        .iter()
        .map(|day| format!("{}{}", day.weekday, if day.active() { "*" } else { "" }))
        .collect();
    writeln!(out, "Last 7 days: {}", calendar.join(" "))?;
    Ok(())
}
