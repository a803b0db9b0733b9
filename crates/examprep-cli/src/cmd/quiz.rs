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
use examprep_core::Fallible;
use examprep_core::QuizMode;
use examprep_core::QuizResult;
use examprep_core::QuizSession;
use examprep_core::Tracker;
use examprep_core::session::quiz::SubmitOutcome;
use examprep_core::session::quiz::TickOutcome;
use examprep_core::stats::format_duration;
use examprep_core::types::item::Question;
use rand::Rng;

use crate::cmd::Context;
use crate::term::ask;
use crate::term::confirm;

pub fn take_quiz(
    ctx: &Context,
    mode: QuizMode,
    category: Option<&str>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let mut tracker = ctx.tracker()?;
    let content = ctx.content()?;
    let mut rng = rand::rng();
    run_quiz(
        &mut tracker,
        mode,
        category,
        &content.questions,
        &mut rng,
        input,
        output,
    )
}

enum Step {
    Continue,
    Done,
}

/// Run a quiz interactively. Ends without submitting at end of input or on
/// `q`; a full exam is submitted when its time is up.
pub fn run_quiz<B: Backend, R: Rng + ?Sized>(
    tracker: &mut Tracker<B>,
    mode: QuizMode,
    category: Option<&str>,
    bank: &[Question],
    rng: &mut R,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let mut quiz = QuizSession::generate(mode, category, bank, tracker.config(), rng)?;
    quiz.start(tracker)?;
    writeln!(
        output,
        "{}: {} questions.",
        mode.label(),
        quiz.question_count()
    )?;
    loop {
        if mode.is_timed() && time_is_up(&mut quiz, tracker, true, output)? {
            return Ok(());
        }
        let (Some(index), Some(question)) = (quiz.index(), quiz.current()) else {
            return Ok(());
        };
        write_question(index, quiz.question_count(), question, quiz.current_answer(), output)?;
        let option_count = question.options.len();
        let prompt = "Answer (letter), enter to skip, p = previous, s = submit, q = quit: ";
        let Some(line) = ask(input, output, prompt)? else {
            return quit(output);
        };
        // An answer typed after the deadline does not count.
        if mode.is_timed() && time_is_up(&mut quiz, tracker, false, output)? {
            return Ok(());
        }
        let line = line.trim().to_ascii_lowercase();
        let step = match line.as_str() {
            "q" => return quit(output),
            "" => advance_or_submit(&mut quiz, tracker, input, output)?,
            "p" => {
                quiz.previous()?;
                Step::Continue
            }
            "s" => submit(&mut quiz, tracker, input, output)?,
            answer => match parse_option(answer, option_count) {
                Some(option) => {
                    let feedback = quiz.select_answer(option)?;
                    match feedback.correct_option {
                        None => writeln!(output, "Answer recorded.")?,
                        Some(_) if feedback.correct => writeln!(output, "Correct!")?,
                        Some(correct) => {
                            writeln!(output, "Incorrect. The answer is {}.", letter(correct))?
                        }
                    }
                    if let Some(rationale) = feedback.rationale.filter(|r| !r.is_empty()) {
                        writeln!(output, "{rationale}")?;
                    }
                    advance_or_submit(&mut quiz, tracker, input, output)?
                }
                None => {
                    writeln!(output, "Invalid input.")?;
                    Step::Continue
                }
            },
        };
        if let Step::Done = step {
            return Ok(());
        }
    }
}

/// Advance the countdown of a timed quiz, printing the remaining time (if
/// `show_remaining`), the warning, or the result once time is up. Returns
/// whether the quiz ended.
fn time_is_up<B: Backend>(
    quiz: &mut QuizSession,
    tracker: &mut Tracker<B>,
    show_remaining: bool,
    output: &mut impl Write,
) -> Fallible<bool> {
    match quiz.tick(tracker)? {
        TickOutcome::Running { remaining_seconds } => {
            if show_remaining {
                writeln!(output, "Time remaining: {}", format_duration(remaining_seconds))?;
            }
        }
        TickOutcome::Warning { remaining_seconds } => {
            writeln!(
                output,
                "Warning: only {} left!",
                format_duration(remaining_seconds)
            )?;
        }
        TickOutcome::TimeUp(result) => {
            writeln!(output, "Time is up!")?;
            write_result(&result, output)?;
            return Ok(true);
        }
    }
    Ok(false)
}

fn advance_or_submit<B: Backend>(
    quiz: &mut QuizSession,
    tracker: &mut Tracker<B>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<Step> {
    if quiz.next()? {
        Ok(Step::Continue)
    } else {
        submit(quiz, tracker, input, output)
    }
}

fn submit<B: Backend>(
    quiz: &mut QuizSession,
    tracker: &mut Tracker<B>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<Step> {
    let result = match quiz.submit(tracker, false)? {
        SubmitOutcome::Submitted(result) => result,
        SubmitOutcome::NeedsConfirmation { unanswered } => {
            let prompt = format!("{unanswered} questions are unanswered. Submit anyway?");
            if !confirm(input, output, &prompt)? {
                return Ok(Step::Continue);
            }
            match quiz.submit(tracker, true)? {
                SubmitOutcome::Submitted(result) => result,
                SubmitOutcome::NeedsConfirmation { .. } => return Ok(Step::Continue),
            }
        }
    };
    write_result(&result, output)?;
    Ok(Step::Done)
}

fn quit(output: &mut impl Write) -> Fallible<()> {
    writeln!(output)?;
    writeln!(output, "Quiz abandoned. Nothing was recorded.")?;
    Ok(())
}

fn write_question(
    index: usize,
    count: usize,
    question: &Question,
    selected: Option<usize>,
    output: &mut impl Write,
) -> Fallible<()> {
    writeln!(output)?;
    let category = question.category_name.as_deref().unwrap_or(&question.category);
    writeln!(output, "[{}/{count}] ({category}) {}", index + 1, question.prompt)?;
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(i) { ">" } else { " " };
        writeln!(output, "{marker} {}. {option}", letter(i))?;
    }
    Ok(())
}

fn write_result(result: &QuizResult, output: &mut impl Write) -> Fallible<()> {
    writeln!(output)?;
    writeln!(
        output,
        "Score: {}/{} ({}%), {}.",
        result.correct,
        result.total_questions,
        result.percentage,
        if result.passed { "passed" } else { "not passed" }
    )?;
    writeln!(
        output,
        "Incorrect: {}, unanswered: {}, time: {}.",
        result.incorrect,
        result.unanswered,
        format_duration(result.time_seconds)
    )?;
    Ok(())
}

fn letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn parse_option(answer: &str, option_count: usize) -> Option<usize> {
    let mut chars = answer.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let index = (c.to_ascii_lowercase() as usize).checked_sub('a' as usize)?;
    (index < option_count).then_some(index)
}
