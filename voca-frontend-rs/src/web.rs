use std::cell::RefCell;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use voca_utils::{Catalog, QuizMode, VocabularyEntry};
use wasm_bindgen::prelude::*;

use crate::audio::{AudioCues as _, SoundBoard, SoundEffect};
use crate::badges::{self, BadgeStatus};
use crate::challenges::{Challenge, Response};
use crate::config::StoreConfig;
use crate::progress::{HistoryEntry, ProgressSummary};
use crate::speech::{BrowserRecognizer, BrowserSpeech, SpeechSynthesizer as _};
use crate::storage::LocalStorage;
use crate::store::{AnswerOutcome, QuizStore, SessionSummary, ViewState};
use crate::utils;

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
static LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_from_js(now_ms: f64) -> DateTime<Utc> {
    utils::from_js_millis(now_ms).unwrap_or_else(|| {
        log::warn!("Invalid timestamp {now_ms}, using the current time");
        Utc::now()
    })
}

/// The vocabulary book bundled with the app.
#[wasm_bindgen]
pub fn get_catalog() -> Result<Catalog, JsValue> {
    Catalog::pre_build_up().map_err(js_error)
}

#[wasm_bindgen]
pub struct Voca {
    // never hold a borrow across a call back into JS
    store: RefCell<QuizStore<LocalStorage>>,
    catalog: Catalog,
    speech: RefCell<BrowserSpeech>,
    recognizer: BrowserRecognizer,
    sounds: RefCell<SoundBoard>,
}

#[wasm_bindgen]
impl Voca {
    /// `catalog_json` replaces the bundled vocabulary book when given.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<StoreConfig>, catalog_json: Option<String>) -> Result<Voca, JsValue> {
        LazyLock::force(&LOGGER);

        let catalog = match catalog_json {
            Some(json) => Catalog::from_json(&json),
            None => Catalog::pre_build_up(),
        }
        .inspect_err(|e| log::error!("Error loading catalog: {e}"))
        .map_err(js_error)?;

        let storage = LocalStorage::new()
            .inspect_err(|e| log::error!("Error opening local storage: {e}"))
            .map_err(js_error)?;
        let store = QuizStore::load(storage, config.unwrap_or_default());

        Ok(Self {
            store: RefCell::new(store),
            catalog,
            speech: RefCell::new(BrowserSpeech::new()),
            recognizer: BrowserRecognizer::new(),
            sounds: RefCell::new(SoundBoard::new()),
        })
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog.clone()
    }

    pub fn view_state(&self) -> ViewState {
        self.store.borrow().view_state()
    }

    pub fn start_preview(&self, unit_number: u32, lesson_number: u32) -> Result<(), JsValue> {
        let (unit, lesson) = self.find_lesson(unit_number, lesson_number)?;
        self.store.borrow_mut().start_preview(unit, lesson);
        Ok(())
    }

    pub fn start_quiz(
        &self,
        unit_number: u32,
        lesson_number: u32,
        mode: QuizMode,
        now_ms: f64,
    ) -> Result<bool, JsValue> {
        let (unit, lesson) = self.find_lesson(unit_number, lesson_number)?;
        Ok(self
            .store
            .borrow_mut()
            .start_quiz(unit, lesson, mode, now_from_js(now_ms)))
    }

    pub fn start_review_quiz(&self, mode: QuizMode, now_ms: f64) -> bool {
        self.store
            .borrow_mut()
            .start_review_quiz(mode, now_from_js(now_ms))
    }

    pub fn current_question(&self) -> Option<VocabularyEntry> {
        self.store.borrow().current_question().cloned()
    }

    pub fn current_challenge(&self) -> Option<Challenge> {
        self.store.borrow_mut().current_challenge().cloned()
    }

    /// Record an answer graded elsewhere and play the matching cue.
    pub fn submit_answer(&self, is_correct: bool, word: VocabularyEntry) -> AnswerOutcome {
        let outcome = self.store.borrow_mut().submit_answer(is_correct, &word);
        self.play_outcome(outcome);
        outcome
    }

    pub fn submit_response(&self, response: Response) -> AnswerOutcome {
        let outcome = self.store.borrow_mut().submit_response(&response);
        self.play_outcome(outcome);
        outcome
    }

    pub fn submit_typed(&self, input: String) -> AnswerOutcome {
        self.submit_response(Response::Typed(input))
    }

    pub fn submit_choice(&self, option: String) -> AnswerOutcome {
        self.submit_response(Response::Choice(option))
    }

    /// Grade what the recognizer has heard so far.
    pub fn submit_transcript(&self) -> AnswerOutcome {
        self.recognizer.stop();
        let transcript = self.recognizer.transcript();
        self.submit_response(Response::Spoken(transcript))
    }

    pub fn next_question(&self, now_ms: f64) -> Option<SessionSummary> {
        let summary = self
            .store
            .borrow_mut()
            .next_question(now_from_js(now_ms));
        self.celebrate(summary.as_ref());
        summary
    }

    pub fn end_quiz(&self, now_ms: f64) -> Option<SessionSummary> {
        let summary = self.store.borrow_mut().end_quiz(now_from_js(now_ms));
        self.celebrate(summary.as_ref());
        summary
    }

    pub fn retry_quiz(&self, now_ms: f64) -> bool {
        self.store.borrow_mut().retry_quiz(now_from_js(now_ms))
    }

    pub fn reset_quiz(&self) {
        self.recognizer.stop();
        self.store.borrow_mut().reset_quiz();
    }

    pub fn clear_review_list(&self) {
        self.store.borrow_mut().clear_review_list();
    }

    pub fn clear_history(&self) {
        self.store.borrow_mut().clear_history();
    }

    pub fn question_set(&self) -> Vec<VocabularyEntry> {
        self.store.borrow().question_set().to_vec()
    }

    pub fn session_wrong_answers(&self) -> Vec<VocabularyEntry> {
        self.store.borrow().session_wrong_answers().to_vec()
    }

    pub fn correct_count(&self) -> u32 {
        self.store.borrow().correct_count()
    }

    pub fn current_index(&self) -> usize {
        self.store.borrow().current_index()
    }

    pub fn is_answered(&self) -> bool {
        self.store.borrow().is_answered()
    }

    pub fn mode(&self) -> QuizMode {
        self.store.borrow().mode()
    }

    pub fn is_review_session(&self) -> bool {
        self.store.borrow().is_review_session()
    }

    pub fn active_unit_number(&self) -> Option<u32> {
        self.store.borrow().active_unit_number()
    }

    pub fn active_lesson_number(&self) -> Option<u32> {
        self.store
            .borrow()
            .active_lesson()
            .map(|lesson| lesson.lesson_number)
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        self.store.borrow().progress().summary()
    }

    /// The full durable state, for debugging and export.
    pub fn progress(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.store.borrow().progress()).map_err(js_error)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.store.borrow().progress().history.clone()
    }

    pub fn review_list(&self) -> Vec<VocabularyEntry> {
        self.store.borrow().progress().mistakes().cloned().collect()
    }

    pub fn badges(&self) -> Vec<BadgeStatus> {
        badges::statuses(self.store.borrow().progress())
    }

    pub fn best_score(&self, unit_number: u32, lesson_number: u32) -> Option<u32> {
        self.store
            .borrow()
            .progress()
            .best_score(unit_number, lesson_number)
    }

    pub fn speak(&self, word: String) {
        self.speech.borrow_mut().speak(&word);
    }

    pub fn stop_speaking(&self) {
        self.speech.borrow_mut().cancel();
    }

    pub fn is_tts_supported(&self) -> bool {
        self.speech.borrow().is_supported()
    }

    pub fn play_sound(&self, effect: SoundEffect) {
        self.sounds.borrow_mut().play(effect);
    }

    pub fn is_recognition_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    pub fn start_listening(&self) {
        self.recognizer.start();
    }

    pub fn stop_listening(&self) {
        self.recognizer.stop();
    }

    pub fn reset_transcript(&self) {
        self.recognizer.reset();
    }

    pub fn is_listening(&self) -> bool {
        self.recognizer.is_listening()
    }

    pub fn transcript(&self) -> String {
        self.recognizer.transcript()
    }

    pub fn interim_transcript(&self) -> String {
        self.recognizer.interim_transcript()
    }

    pub fn recognition_error(&self) -> Option<String> {
        self.recognizer.error()
    }
}

impl Voca {
    fn find_lesson(
        &self,
        unit_number: u32,
        lesson_number: u32,
    ) -> Result<(&voca_utils::Unit, &voca_utils::Lesson), JsValue> {
        self.catalog
            .lesson(unit_number, lesson_number)
            .ok_or_else(|| {
                JsValue::from_str(&format!(
                    "Unit {unit_number} lesson {lesson_number} is not in the catalog"
                ))
            })
    }

    fn play_outcome(&self, outcome: AnswerOutcome) {
        if let Some(effect) = SoundEffect::for_outcome(outcome) {
            self.sounds.borrow_mut().play(effect);
        }
    }

    fn celebrate(&self, summary: Option<&SessionSummary>) {
        if summary.is_some_and(|summary| summary.leveled_up) {
            self.sounds.borrow_mut().play(SoundEffect::LevelUp);
        }
    }
}
