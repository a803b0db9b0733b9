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

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::progress::Tracker;
use crate::rng::shuffle;
use crate::session::Cursor;
use crate::session::SessionState;
use crate::store::Backend;
use crate::types::item::Question;
use crate::types::quiz_result::AnswerCounts;
use crate::types::quiz_result::QuizMode;
use crate::types::quiz_result::QuizResult;
use crate::types::timestamp::Timestamp;

/// Feedback on a selected answer. The correct option and rationale are
/// withheld unless they are shown immediately.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_option: Option<usize>,
    pub rationale: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Some questions are unanswered: submit again with confirmation.
    NeedsConfirmation { unanswered: usize },
    Submitted(QuizResult),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TickOutcome {
    Running { remaining_seconds: u64 },
    /// The first tick inside the warning window.
    Warning { remaining_seconds: u64 },
    /// The deadline passed and the quiz was submitted.
    TimeUp(QuizResult),
}

pub struct QuizSession {
    mode: QuizMode,
    category: Option<String>,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    cursor: Cursor,
    started_at: Option<Timestamp>,
    deadline: Option<Timestamp>,
    warning_seconds: u64,
    warned: bool,
    show_rationale: bool,
    result: Option<QuizResult>,
}

impl QuizSession {
    pub fn new(
        mode: QuizMode,
        category: Option<String>,
        questions: Vec<Question>,
    ) -> Fallible<Self> {
        let cursor = Cursor::new(questions.len(), "quiz")?;
        for question in &questions {
            question.validate()?;
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            mode,
            category,
            questions,
            answers,
            cursor,
            started_at: None,
            deadline: None,
            warning_seconds: 0,
            warned: false,
            show_rationale: true,
            result: None,
        })
    }

    /// Draw a quiz from a question bank: restrict to `category` if given,
    /// shuffle as configured, and keep as many questions as the mode asks.
    pub fn generate<R: Rng + ?Sized>(
        mode: QuizMode,
        category: Option<&str>,
        bank: &[Question],
        config: &Config,
        rng: &mut R,
    ) -> Fallible<Self> {
        let mut pool: Vec<Question> = bank
            .iter()
            .filter(|q| category.is_none_or(|c| q.category == c))
            .cloned()
            .collect();
        if config.quiz.shuffle_questions {
            shuffle(&mut pool, rng);
        }
        pool.truncate(config.question_count(mode));
        if config.quiz.shuffle_answers {
            for question in &mut pool {
                question.shuffle_options(rng);
            }
        }
        log::debug!("Generated {} quiz with {} questions.", mode, pool.len());
        Self::new(mode, category.map(str::to_string), pool)
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.cursor.state()
    }

    pub fn question_count(&self) -> usize {
        self.cursor.len()
    }

    /// Position of the current item, while in progress.
    pub fn index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current(&self) -> Option<&Question> {
        self.cursor.index().map(|i| &self.questions[i])
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.cursor.index().and_then(|i| self.answers[i])
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Start the quiz. A full exam also starts its countdown.
    pub fn start<B: Backend>(&mut self, tracker: &Tracker<B>) -> Fallible<()> {
        self.cursor.start()?;
        let now = tracker.now();
        let quiz = &tracker.config().quiz;
        self.started_at = Some(now);
        self.show_rationale = quiz.show_rationale_immediately;
        if self.mode.is_timed() {
            let seconds = quiz.full_exam_minutes.saturating_mul(60);
            self.deadline = Some(now.plus_seconds(seconds));
            self.warning_seconds = quiz.warning_minutes as u64 * 60;
        }
        log::debug!("Started {} quiz.", self.mode);
        Ok(())
    }

    /// Select an answer for the current question. Selecting again replaces
    /// the earlier answer.
    pub fn select_answer(&mut self, option: usize) -> Fallible<AnswerFeedback> {
        let index = self.cursor.active()?;
        let question = &self.questions[index];
        if option >= question.options.len() {
            return fail(format!("question {} has no option {option}.", question.id));
        }
        self.answers[index] = Some(option);
        let reveal = self.show_rationale;
        Ok(AnswerFeedback {
            correct: question.is_correct(option),
            correct_option: reveal.then_some(question.correct_option),
            rationale: reveal.then(|| question.rationale.clone()),
        })
    }

    pub fn next(&mut self) -> Fallible<bool> {
        self.cursor.next()
    }

    pub fn previous(&mut self) -> Fallible<bool> {
        self.cursor.previous()
    }

    pub fn unanswered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    /// Seconds since the quiz started.
    pub fn elapsed_seconds(&self, now: Timestamp) -> u64 {
        self.started_at.map_or(0, |start| now.seconds_since(start))
    }

    /// Seconds until the deadline, for timed quizzes.
    pub fn remaining_seconds(&self, now: Timestamp) -> Option<u64> {
        self.deadline.map(|deadline| deadline.seconds_since(now))
    }

    /// Submit the quiz. With unanswered questions this only reports how many
    /// there are, unless `confirmed`.
    pub fn submit<B: Backend>(
        &mut self,
        tracker: &mut Tracker<B>,
        confirmed: bool,
    ) -> Fallible<SubmitOutcome> {
        self.cursor.active()?;
        let unanswered = self.unanswered_count();
        if unanswered > 0 && !confirmed {
            return Ok(SubmitOutcome::NeedsConfirmation { unanswered });
        }
        Ok(SubmitOutcome::Submitted(self.finish(tracker)))
    }

    /// Advance the countdown. At or after the deadline the quiz is submitted
    /// without confirmation.
    pub fn tick<B: Backend>(&mut self, tracker: &mut Tracker<B>) -> Fallible<TickOutcome> {
        self.cursor.active()?;
        let Some(deadline) = self.deadline else {
            return fail("quiz is not timed.");
        };
        let now = tracker.now();
        if now >= deadline {
            log::debug!("Time is up.");
            return Ok(TickOutcome::TimeUp(self.finish(tracker)));
        }
        let remaining_seconds = deadline.seconds_since(now);
        if !self.warned && remaining_seconds <= self.warning_seconds {
            self.warned = true;
            return Ok(TickOutcome::Warning { remaining_seconds });
        }
        Ok(TickOutcome::Running { remaining_seconds })
    }

    fn counts(&self) -> AnswerCounts {
        let mut counts = AnswerCounts::default();
        for (question, answer) in self.questions.iter().zip(&self.answers) {
            match answer {
                Some(option) if question.is_correct(*option) => counts.correct += 1,
                Some(_) => counts.incorrect += 1,
                None => counts.unanswered += 1,
            }
        }
        counts
    }

    /// Complete the session and persist its outcome in one write. A
    /// persistence failure is logged and leaves the store untouched: the
    /// session completes regardless.
    fn finish<B: Backend>(&mut self, tracker: &mut Tracker<B>) -> QuizResult {
        let now = tracker.now();
        self.cursor.complete();
        let answered = self.questions.iter().zip(&self.answers).filter_map(|(q, a)| {
            a.map(|option| (q.category.as_str(), q.difficulty, q.is_correct(option)))
        });
        let result = QuizResult::new(
            self.mode,
            self.category.clone(),
            self.counts(),
            self.elapsed_seconds(now),
            tracker.config().exam.passing_score_percent,
            now,
        );
        let result = match tracker.complete_quiz(answered, result.clone()) {
            Ok((stored, _)) => stored,
            Err(e) => {
                log::error!("Failed to record quiz: {e}");
                result
            }
        };
        log::debug!(
            "Submitted {} quiz: {}% ({}).",
            self.mode,
            result.percentage,
            if result.passed { "passed" } else { "failed" }
        );
        self.result = Some(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::clock::Clock;
    use crate::clock::ManualClock;
    use crate::clock::TimeZonePolicy;
    use crate::store::MemoryBackend;
    use crate::types::item::Difficulty;

    const NOON: i64 = 1_735_732_800_000;

    fn tracker() -> (Tracker<MemoryBackend>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(Timestamp::from_millis(NOON).unwrap()));
        let mut config = Config::default();
        config.calendar.timezone = TimeZonePolicy::utc();
        (Tracker::new(MemoryBackend::new(), config, clock.clone()), clock)
    }

    fn question(id: usize, category: &str, difficulty: Difficulty) -> Question {
        Question {
            id: format!("q{id}"),
            category: category.to_string(),
            category_name: None,
            prompt: format!("Question {id}?"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: 0,
            rationale: "Because A.".to_string(),
            difficulty,
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(i, "trauma", Difficulty::Medium)).collect()
    }

    /// An in-memory backend that counts writes, and rejects them once
    /// `full` is set.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        writes: Rc<Cell<usize>>,
        full: Rc<Cell<bool>>,
    }

    impl Backend for CountingBackend {
        fn get(&self, key: &str) -> Fallible<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
            if self.full.get() {
                return fail("storage is full");
            }
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Fallible<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Fallible<Vec<String>> {
            self.inner.keys()
        }
    }

    fn counting_tracker() -> (Tracker<CountingBackend>, Rc<Cell<usize>>, Rc<Cell<bool>>) {
        let (tracker, clock) = tracker();
        let backend = CountingBackend::default();
        let writes = backend.writes.clone();
        let full = backend.full.clone();
        let tracker = Tracker::new(backend, tracker.config().clone(), clock);
        (tracker, writes, full)
    }

    #[test]
    fn test_empty_quiz_rejected() {
        assert!(QuizSession::new(QuizMode::Quick, None, Vec::new()).is_err());
    }

    #[test]
    fn test_invalid_question_rejected() {
        let mut q = question(0, "trauma", Difficulty::Easy);
        q.correct_option = 9;
        assert!(QuizSession::new(QuizMode::Quick, None, vec![q]).is_err());
    }

    #[test]
    fn test_seven_of_ten() -> Fallible<()> {
        let (mut tracker, clock) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(10))?;
        quiz.start(&tracker)?;
        for i in 0..10 {
            let feedback = quiz.select_answer(if i < 7 { 0 } else { 1 })?;
            assert_eq!(feedback.correct, i < 7);
            assert_eq!(feedback.correct_option, Some(0));
            assert_eq!(feedback.rationale.as_deref(), Some("Because A."));
            quiz.next()?;
        }
        clock.advance_seconds(125);
        let SubmitOutcome::Submitted(result) = quiz.submit(&mut tracker, false)? else {
            panic!("expected submission");
        };
        assert_eq!(result.percentage, 70);
        assert!(result.passed);
        assert_eq!(result.time_seconds, 125);
        assert_eq!(result.timestamp, clock.now());
        assert_eq!(quiz.state(), SessionState::Completed);
        let record = tracker.get_progress();
        assert_eq!(record.total_questions, 10);
        assert_eq!(record.correct_answers, 7);
        assert_eq!(record.category("trauma").answered, 10);
        assert_eq!(record.quiz_history, vec![result]);
        assert_eq!(record.study_streak, 1);
        Ok(())
    }

    #[test]
    fn test_not_passed_at_higher_threshold() -> Fallible<()> {
        let (tracker, clock) = tracker();
        let mut config = tracker.config().clone();
        config.exam.passing_score_percent = 71;
        let mut tracker = Tracker::new(MemoryBackend::new(), config, clock);
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(10))?;
        quiz.start(&tracker)?;
        for i in 0..10 {
            quiz.select_answer(if i < 7 { 0 } else { 1 })?;
            quiz.next()?;
        }
        let SubmitOutcome::Submitted(result) = quiz.submit(&mut tracker, false)? else {
            panic!("expected submission");
        };
        assert_eq!(result.percentage, 70);
        assert!(!result.passed);
        Ok(())
    }

    #[test]
    fn test_submit_needs_confirmation() -> Fallible<()> {
        let (mut tracker, _) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(3))?;
        quiz.start(&tracker)?;
        quiz.select_answer(0)?;
        assert_eq!(
            quiz.submit(&mut tracker, false)?,
            SubmitOutcome::NeedsConfirmation { unanswered: 2 }
        );
        assert_eq!(quiz.state(), SessionState::InProgress { index: 0 });
        assert_eq!(tracker.get_progress().total_questions, 0);
        let SubmitOutcome::Submitted(result) = quiz.submit(&mut tracker, true)? else {
            panic!("expected submission");
        };
        assert_eq!(result.unanswered, 2);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.percentage, 33);
        // Unanswered questions are not counted.
        assert_eq!(tracker.get_progress().total_questions, 1);
        Ok(())
    }

    #[test]
    fn test_completed_is_terminal() -> Fallible<()> {
        let (mut tracker, _) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(1))?;
        quiz.start(&tracker)?;
        quiz.select_answer(0)?;
        quiz.submit(&mut tracker, false)?;
        assert!(quiz.select_answer(1).is_err());
        assert!(quiz.next().is_err());
        assert!(quiz.submit(&mut tracker, true).is_err());
        assert_eq!(tracker.get_progress().quiz_history.len(), 1);
        Ok(())
    }

    #[test]
    fn test_select_out_of_range() -> Fallible<()> {
        let (tracker, _) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(1))?;
        assert!(quiz.select_answer(0).is_err());
        quiz.start(&tracker)?;
        assert!(quiz.select_answer(4).is_err());
        assert_eq!(quiz.current_answer(), None);
        Ok(())
    }

    #[test]
    fn test_hard_questions_tracked() -> Fallible<()> {
        let (mut tracker, _) = tracker();
        let qs = vec![
            question(0, "trauma", Difficulty::Hard),
            question(1, "cardiology", Difficulty::Easy),
        ];
        let mut quiz = QuizSession::new(QuizMode::Quick, None, qs)?;
        quiz.start(&tracker)?;
        quiz.select_answer(0)?;
        quiz.next()?;
        quiz.select_answer(2)?;
        quiz.submit(&mut tracker, false)?;
        let record = tracker.get_progress();
        assert_eq!(record.hard_question_progress.answered, 1);
        assert_eq!(record.hard_question_progress.correct, 1);
        assert_eq!(record.category("cardiology").correct, 0);
        Ok(())
    }

    #[test]
    fn test_countdown() -> Fallible<()> {
        let (mut tracker, clock) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Full, None, questions(2))?;
        quiz.start(&tracker)?;
        assert_eq!(
            quiz.tick(&mut tracker)?,
            TickOutcome::Running {
                remaining_seconds: 180 * 60
            }
        );
        clock.advance_seconds(175 * 60);
        assert_eq!(
            quiz.tick(&mut tracker)?,
            TickOutcome::Warning {
                remaining_seconds: 300
            }
        );
        clock.advance_seconds(1);
        assert_eq!(
            quiz.tick(&mut tracker)?,
            TickOutcome::Running {
                remaining_seconds: 299
            }
        );
        quiz.select_answer(0)?;
        clock.advance_seconds(299);
        let TickOutcome::TimeUp(result) = quiz.tick(&mut tracker)? else {
            panic!("expected time up");
        };
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.time_seconds, 180 * 60);
        assert_eq!(quiz.state(), SessionState::Completed);
        assert!(quiz.tick(&mut tracker).is_err());
        Ok(())
    }

    #[test]
    fn test_untimed_tick_fails() -> Fallible<()> {
        let (mut tracker, _) = tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(1))?;
        quiz.start(&tracker)?;
        assert!(quiz.tick(&mut tracker).is_err());
        assert_eq!(quiz.deadline(), None);
        Ok(())
    }

    #[test]
    fn test_rationale_deferred() -> Fallible<()> {
        let (tracker, clock) = tracker();
        let mut config = tracker.config().clone();
        config.quiz.show_rationale_immediately = false;
        let tracker = Tracker::new(MemoryBackend::new(), config, clock);
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(2))?;
        quiz.start(&tracker)?;
        let feedback = quiz.select_answer(1)?;
        assert!(!feedback.correct);
        assert_eq!(feedback.correct_option, None);
        assert_eq!(feedback.rationale, None);
        assert_eq!(quiz.current_answer(), Some(1));
        Ok(())
    }

    #[test]
    fn test_submit_writes_once() -> Fallible<()> {
        let (mut tracker, writes, _) = counting_tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(3))?;
        quiz.start(&tracker)?;
        for _ in 0..3 {
            quiz.select_answer(0)?;
            quiz.next()?;
        }
        quiz.submit(&mut tracker, false)?;
        assert_eq!(writes.get(), 1);
        let record = tracker.get_progress();
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.quiz_history.len(), 1);
        assert_eq!(record.study_streak, 1);
        Ok(())
    }

    #[test]
    fn test_failed_write_stores_nothing() -> Fallible<()> {
        let (mut tracker, writes, full) = counting_tracker();
        let mut quiz = QuizSession::new(QuizMode::Quick, None, questions(2))?;
        quiz.start(&tracker)?;
        quiz.select_answer(0)?;
        full.set(true);
        let SubmitOutcome::Submitted(result) = quiz.submit(&mut tracker, true)? else {
            panic!("expected submission");
        };
        assert_eq!(result.correct, 1);
        assert_eq!(result.unanswered, 1);
        assert_eq!(quiz.state(), SessionState::Completed);
        assert_eq!(quiz.result(), Some(&result));
        assert_eq!(writes.get(), 0);
        let record = tracker.get_progress();
        assert_eq!(record.total_questions, 0);
        assert!(record.quiz_history.is_empty());
        assert_eq!(record.study_streak, 0);
        Ok(())
    }

    #[test]
    fn test_generate() -> Fallible<()> {
        let config = Config::default();
        let mut bank = questions(30);
        bank.extend((30..40).map(|i| question(i, "cardiology", Difficulty::Hard)));
        let mut rng = StdRng::seed_from_u64(7);
        let quick = QuizSession::generate(QuizMode::Quick, None, &bank, &config, &mut rng)?;
        assert_eq!(quick.question_count(), 10);
        let focused = QuizSession::generate(
            QuizMode::Focused,
            Some("cardiology"),
            &bank,
            &config,
            &mut rng,
        )?;
        assert_eq!(focused.question_count(), 10);
        assert!(focused.questions().iter().all(|q| q.category == "cardiology"));
        for q in focused.questions() {
            assert_eq!(q.options[q.correct_option], "A");
        }
        assert!(
            QuizSession::generate(QuizMode::Focused, Some("none"), &bank, &config, &mut rng)
                .is_err()
        );
        Ok(())
    }
}
