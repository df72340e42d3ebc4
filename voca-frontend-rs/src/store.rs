//! The quiz state machine and the learner's durable progress.
//!
//! - Idle: nothing selected. `start_preview`, `start_quiz` or `start_review_quiz` leave it.
//! - Preview: a lesson's words in catalog order. `start_quiz` begins the quiz.
//! - ActiveQuiz: answering. `next_question` on the last question, or `end_quiz`, finishes.
//! - Finished: results on screen. `retry_quiz` reshuffles, `reset_quiz` returns to Idle.
//!
//! Every action that touches [`Progress`] ends with a best-effort save.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use voca_utils::{Lesson, QuizMode, Unit, VocabularyEntry};

use crate::badges::{self, BadgeId};
use crate::challenges::{Challenge, Response};
use crate::config::StoreConfig;
use crate::progress::{self, HistoryEntry, Progress};
use crate::storage::{KeyValueStore, load_progress, save_progress};

/// Which of the four screens applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Preview,
    ActiveQuiz,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    /// No quiz was running, or the current question already had an answer.
    Ignored,
}

/// What finishing a session produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub entry: HistoryEntry,
    pub leveled_up: bool,
    pub new_badges: Vec<BadgeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ActiveLesson {
    unit_number: u32,
    lesson: Lesson,
}

/// Ephemeral state of the current session. Lost on reload.
#[derive(Clone, Debug, Default)]
struct Session {
    /// `None` for a review session.
    active: Option<ActiveLesson>,
    mode: QuizMode,
    question_set: Vec<VocabularyEntry>,
    current_index: usize,
    correct_count: u32,
    wrong_answers: Vec<VocabularyEntry>,
    started_at: Option<DateTime<Utc>>,
    is_quiz_active: bool,
    is_preview_active: bool,
    answered_current: bool,
    finalized: bool,
    challenge: Option<(usize, Challenge)>,
}

pub struct QuizStore<S: KeyValueStore> {
    storage: S,
    config: StoreConfig,
    session: Session,
    progress: Progress,
    rng: Option<ChaCha8Rng>,
}

impl<S: KeyValueStore> QuizStore<S> {
    /// Restore saved progress from `storage`, falling back to a fresh start.
    pub fn load(storage: S, config: StoreConfig) -> Self {
        let progress = load_progress(&storage, &config.storage_key);
        Self::from_progress(storage, config, progress)
    }

    pub fn from_progress(storage: S, config: StoreConfig, progress: Progress) -> Self {
        let rng = config.seed.map(ChaCha8Rng::seed_from_u64);
        Self {
            storage,
            config,
            session: Session::default(),
            progress,
            rng,
        }
    }

    fn persist(&mut self) {
        if let Err(e) = save_progress(&mut self.storage, &self.config.storage_key, &self.progress)
        {
            log::error!("Failed to save progress: {e}");
        }
    }

    fn rng(&mut self, now: DateTime<Utc>) -> &mut ChaCha8Rng {
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| now.timestamp_millis().unsigned_abs());
        self.rng.get_or_insert_with(|| ChaCha8Rng::seed_from_u64(seed))
    }

    fn begin(
        &mut self,
        active: Option<ActiveLesson>,
        mut question_set: Vec<VocabularyEntry>,
        mode: QuizMode,
        now: DateTime<Utc>,
    ) {
        question_set.shuffle(self.rng(now));
        match &active {
            Some(active) => log::info!(
                "Starting {mode} quiz for unit {} lesson {} ({} questions)",
                active.unit_number,
                active.lesson.lesson_number,
                question_set.len()
            ),
            None => log::info!("Starting {mode} review of {} words", question_set.len()),
        }
        self.session = Session {
            active,
            mode,
            question_set,
            started_at: Some(now),
            is_quiz_active: true,
            ..Session::default()
        };
    }

    /// Quiz the whole lesson in random order. Returns `false` for a lesson
    /// without vocabulary.
    pub fn start_quiz(
        &mut self,
        unit: &Unit,
        lesson: &Lesson,
        mode: QuizMode,
        now: DateTime<Utc>,
    ) -> bool {
        if lesson.vocabulary.is_empty() {
            log::warn!(
                "Unit {} lesson {} has no vocabulary, not starting a quiz",
                unit.unit_number,
                lesson.lesson_number
            );
            return false;
        }
        let active = ActiveLesson {
            unit_number: unit.unit_number,
            lesson: lesson.clone(),
        };
        self.begin(Some(active), lesson.vocabulary.clone(), mode, now);
        true
    }

    /// Quiz the words answered wrong so far. Returns `false`, leaving the
    /// state untouched, when there is nothing to review.
    pub fn start_review_quiz(&mut self, mode: QuizMode, now: DateTime<Utc>) -> bool {
        if self.progress.persistent_mistakes.is_empty() {
            log::warn!("Review list is empty, not starting a review quiz");
            return false;
        }
        let question_set = self.progress.mistakes().cloned().collect();
        self.begin(None, question_set, mode, now);
        true
    }

    /// Show a lesson's vocabulary in catalog order, without quizzing.
    pub fn start_preview(&mut self, unit: &Unit, lesson: &Lesson) {
        self.session = Session {
            active: Some(ActiveLesson {
                unit_number: unit.unit_number,
                lesson: lesson.clone(),
            }),
            mode: self.session.mode,
            question_set: lesson.vocabulary.clone(),
            is_preview_active: true,
            ..Session::default()
        };
    }

    /// Record the answer to the current question. Does not advance.
    ///
    /// Wrong answers are queued for review. A correct answer in a review
    /// session takes the word off the queue.
    pub fn submit_answer(&mut self, is_correct: bool, word: &VocabularyEntry) -> AnswerOutcome {
        if !self.session.is_quiz_active {
            log::warn!("Ignoring answer for {:?}: no quiz is running", word.word);
            return AnswerOutcome::Ignored;
        }
        if self.session.answered_current {
            log::warn!(
                "Ignoring answer for {:?}: question {} was already answered",
                word.word,
                self.session.current_index
            );
            return AnswerOutcome::Ignored;
        }
        self.session.answered_current = true;

        if is_correct {
            self.session.correct_count += 1;
            if self.is_review_session() && self.progress.redeem(&word.word) {
                self.persist();
            }
            AnswerOutcome::Correct
        } else {
            self.session.wrong_answers.push(word.clone());
            if self.progress.record_mistake(word) {
                self.persist();
            }
            AnswerOutcome::Wrong
        }
    }

    /// Grade `response` against the current question, then submit it.
    pub fn submit_response(&mut self, response: &Response) -> AnswerOutcome {
        if self.session.answered_current {
            log::warn!("Ignoring response: the current question was already answered");
            return AnswerOutcome::Ignored;
        }
        let Some(challenge) = self.current_challenge() else {
            log::warn!("Ignoring response: no quiz is running");
            return AnswerOutcome::Ignored;
        };
        let is_correct = challenge.grade(response);
        let word = challenge.entry.clone();
        self.submit_answer(is_correct, &word)
    }

    /// Move to the next question. On the last question this finishes the
    /// session instead and returns its summary.
    pub fn next_question(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if !self.session.is_quiz_active {
            log::warn!("Ignoring next question: no quiz is running");
            return None;
        }
        if self.session.current_index + 1 >= self.session.question_set.len() {
            return self.end_quiz(now);
        }
        self.session.current_index += 1;
        self.session.answered_current = false;
        None
    }

    /// Finalize the session: record history, update the streak, award XP and
    /// badges. A session is only finalized once; later calls return `None`.
    pub fn end_quiz(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if self.session.finalized {
            log::warn!("Ignoring end quiz: this session was already recorded");
            return None;
        }
        if self.session.is_preview_active {
            log::warn!("Ignoring end quiz: previews are not recorded");
            return None;
        }

        let total_questions = u32::try_from(self.session.question_set.len()).unwrap_or(u32::MAX);
        let correct_answers = self.session.correct_count;
        let score = progress::score(correct_answers, total_questions);
        let duration_seconds = self
            .session
            .started_at
            .map(|started_at| (now - started_at).num_seconds().max(0).unsigned_abs())
            .unwrap_or(0);

        let entry = HistoryEntry {
            id: self.progress.next_history_id(now),
            date: now,
            unit_number: self.session.active.as_ref().map(|a| a.unit_number),
            lesson_number: self
                .session
                .active
                .as_ref()
                .map(|a| a.lesson.lesson_number),
            mode: self.session.mode,
            total_questions,
            correct_answers,
            percentage: score.percentage,
            duration_seconds,
            xp_gained: score.xp_gained,
        };

        self.progress
            .push_history(entry.clone(), self.config.history_limit);
        self.progress
            .record_study(now, self.config.utc_offset_minutes);
        self.session.is_quiz_active = false;
        self.session.finalized = true;
        self.persist();

        log::info!(
            "Session finished: {correct_answers}/{total_questions} ({}%), {}s, +{} xp, streak {}",
            entry.percentage,
            entry.duration_seconds,
            entry.xp_gained,
            self.progress.streak
        );

        let level_before = self.progress.level;
        self.add_xp(entry.xp_gained);
        let leveled_up = self.progress.level > level_before;
        if leveled_up {
            log::info!("Reached level {}", self.progress.level);
        }
        let new_badges = self.check_achievements(&entry);

        Some(SessionSummary {
            entry,
            leveled_up,
            new_badges,
        })
    }

    /// Start the same lesson (or review) again with a fresh shuffle.
    /// Returns `false` if there is nothing to retry.
    pub fn retry_quiz(&mut self, now: DateTime<Utc>) -> bool {
        let mode = self.session.mode;
        match self.session.active.clone() {
            Some(active) => {
                let question_set = active.lesson.vocabulary.clone();
                if question_set.is_empty() {
                    return false;
                }
                self.begin(Some(active), question_set, mode, now);
                true
            }
            None => self.start_review_quiz(mode, now),
        }
    }

    /// Back to the lesson picker. Progress is untouched.
    pub fn reset_quiz(&mut self) {
        self.session = Session {
            mode: self.session.mode,
            ..Session::default()
        };
    }

    pub fn clear_review_list(&mut self) {
        self.progress.persistent_mistakes.clear();
        log::info!("Review list cleared");
        self.persist();
    }

    pub fn clear_history(&mut self) {
        self.progress.history.clear();
        log::info!("History cleared");
        self.persist();
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.progress.add_xp(amount);
        self.persist();
    }

    /// Award every badge whose condition now holds. Returns the new ones.
    pub fn check_achievements(&mut self, entry: &HistoryEntry) -> Vec<BadgeId> {
        let earned = badges::newly_earned(&self.progress, entry);
        if earned.is_empty() {
            return earned;
        }
        for id in &earned {
            log::info!("Badge earned: {}", badges::badge(*id).name);
        }
        self.progress.earned_badges.extend(earned.iter().copied());
        self.persist();
        earned
    }

    pub fn view_state(&self) -> ViewState {
        if self.session.is_preview_active {
            ViewState::Preview
        } else if self.session.is_quiz_active {
            ViewState::ActiveQuiz
        } else if !self.session.question_set.is_empty() {
            ViewState::Finished
        } else {
            ViewState::Idle
        }
    }

    pub fn current_question(&self) -> Option<&VocabularyEntry> {
        if !self.session.is_quiz_active {
            return None;
        }
        self.session.question_set.get(self.session.current_index)
    }

    /// The current question as it should be asked. Built on first access and
    /// kept until the quiz moves on, so options don't reshuffle on re-render.
    pub fn current_challenge(&mut self) -> Option<&Challenge> {
        if !self.session.is_quiz_active {
            return None;
        }
        let index = self.session.current_index;
        let cached = matches!(&self.session.challenge, Some((cached, _)) if *cached == index);
        if !cached {
            let seed = self.config.seed.unwrap_or_default();
            let rng = self
                .rng
                .get_or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
            let session = &mut self.session;
            let entry = session.question_set.get(index)?;
            let challenge = Challenge::new(entry, session.mode, &session.question_set, rng);
            session.challenge = Some((index, challenge));
        }
        self.session.challenge.as_ref().map(|(_, challenge)| challenge)
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn question_set(&self) -> &[VocabularyEntry] {
        &self.session.question_set
    }

    pub fn session_wrong_answers(&self) -> &[VocabularyEntry] {
        &self.session.wrong_answers
    }

    pub fn correct_count(&self) -> u32 {
        self.session.correct_count
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    pub fn mode(&self) -> QuizMode {
        self.session.mode
    }

    pub fn is_quiz_active(&self) -> bool {
        self.session.is_quiz_active
    }

    pub fn is_preview_active(&self) -> bool {
        self.session.is_preview_active
    }

    /// Whether the current question already has an answer.
    pub fn is_answered(&self) -> bool {
        self.session.answered_current
    }

    /// A session over the review list rather than a lesson.
    pub fn is_review_session(&self) -> bool {
        self.session.active.is_none() && !self.session.question_set.is_empty()
    }

    pub fn active_unit_number(&self) -> Option<u32> {
        self.session.active.as_ref().map(|active| active.unit_number)
    }

    pub fn active_lesson(&self) -> Option<&Lesson> {
        self.session.active.as_ref().map(|active| &active.lesson)
    }
}
