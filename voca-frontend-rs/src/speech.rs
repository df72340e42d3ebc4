//! Pronunciation (text-to-speech) and speaking-mode recognition.

use voca_utils::text_cleanup::strip_annotations;

pub const SPEECH_LANGUAGE: &str = "en-US";
pub const SPEECH_RATE: f32 = 0.9;
pub const SPEECH_PITCH: f32 = 1.0;

/// One entry of a recognition event's result list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

/// Running transcript built from recognition events.
///
/// Final results accumulate across events. Interim results only describe
/// what is being heard right now, so each event replaces them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    finalized: String,
    interim: String,
}

impl Transcript {
    /// Apply the results of one event, starting at the event's result index.
    pub fn apply_results(&mut self, results: impl IntoIterator<Item = RecognitionResult>) {
        let mut finalized = String::new();
        let mut interim = String::new();
        for result in results {
            if result.is_final {
                finalized.push_str(&result.transcript);
            } else {
                interim.push_str(&result.transcript);
            }
        }

        if !finalized.is_empty() {
            self.finalized.push(' ');
            self.finalized.push_str(&finalized);
        }
        self.interim = interim;
    }

    pub fn text(&self) -> &str {
        self.finalized.trim()
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty() && self.interim.trim().is_empty()
    }

    pub fn reset(&mut self) {
        self.finalized.clear();
        self.interim.clear();
    }
}

pub trait SpeechSynthesizer {
    fn is_supported(&self) -> bool;

    /// Stop whatever is being said.
    fn cancel(&mut self);

    /// Start saying `text` as-is.
    fn utter(&mut self, text: &str);

    /// Pronounce a catalog word: annotations are dropped and any utterance in
    /// flight is cancelled first.
    fn speak(&mut self, word: &str) {
        if !self.is_supported() {
            return;
        }
        let text = strip_annotations(word);
        self.cancel();
        if !text.is_empty() {
            self.utter(&text);
        }
    }
}

/// Used where no speech engine exists, e.g. the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSpeech;

impl SpeechSynthesizer for SilentSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    fn cancel(&mut self) {}

    fn utter(&mut self, text: &str) {
        log::debug!("No speech synthesis available, not saying {text:?}");
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserRecognizer, BrowserSpeech};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{
        RecognitionResult, SPEECH_LANGUAGE, SPEECH_PITCH, SPEECH_RATE, SpeechSynthesizer,
        Transcript,
    };

    /// `window.speechSynthesis`
    pub struct BrowserSpeech {
        synthesis: Option<web_sys::SpeechSynthesis>,
    }

    impl BrowserSpeech {
        pub fn new() -> Self {
            let synthesis = web_sys::window().and_then(|window| window.speech_synthesis().ok());
            if synthesis.is_none() {
                log::info!("Speech synthesis is not supported in this browser");
            }
            Self { synthesis }
        }
    }

    impl SpeechSynthesizer for BrowserSpeech {
        fn is_supported(&self) -> bool {
            self.synthesis.is_some()
        }

        fn cancel(&mut self) {
            if let Some(synthesis) = &self.synthesis {
                synthesis.cancel();
            }
        }

        fn utter(&mut self, text: &str) {
            let Some(synthesis) = &self.synthesis else {
                return;
            };
            match web_sys::SpeechSynthesisUtterance::new_with_text(text) {
                Ok(utterance) => {
                    utterance.set_lang(SPEECH_LANGUAGE);
                    utterance.set_rate(SPEECH_RATE);
                    utterance.set_pitch(SPEECH_PITCH);
                    synthesis.speak(&utterance);
                }
                Err(e) => log::error!("Could not create utterance: {e:?}"),
            }
        }
    }

    #[derive(Default)]
    struct RecognizerState {
        transcript: Transcript,
        listening: bool,
        error: Option<String>,
    }

    type EventHandler = Closure<dyn FnMut(JsValue)>;

    /// `SpeechRecognition` (or the `webkit` prefixed one), continuous with interim results.
    pub struct BrowserRecognizer {
        recognition: Option<web_sys::SpeechRecognition>,
        state: Rc<RefCell<RecognizerState>>,
        // the browser calls into these, so they must live as long as `recognition`
        _handlers: Vec<EventHandler>,
    }

    fn recognition_constructor() -> Option<js_sys::Function> {
        let window = web_sys::window()?;
        ["SpeechRecognition", "webkitSpeechRecognition"]
            .into_iter()
            .filter_map(|name| js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok())
            .find(|constructor| constructor.is_function())
            .map(|constructor| constructor.unchecked_into())
    }

    fn event_results(event: &web_sys::SpeechRecognitionEvent) -> Vec<RecognitionResult> {
        let Some(results) = event.results() else {
            return Vec::new();
        };
        (event.result_index()..results.length())
            .filter_map(|i| results.get(i))
            .filter_map(|result| {
                let alternative = result.get(0)?;
                Some(RecognitionResult {
                    transcript: alternative.transcript(),
                    is_final: result.is_final(),
                })
            })
            .collect()
    }

    impl BrowserRecognizer {
        pub fn new() -> Self {
            let state = Rc::new(RefCell::new(RecognizerState::default()));

            let recognition = recognition_constructor().and_then(|constructor| {
                js_sys::Reflect::construct(&constructor, &js_sys::Array::new())
                    .inspect_err(|e| log::error!("Could not create speech recognition: {e:?}"))
                    .ok()
            });
            let Some(recognition) = recognition else {
                log::info!("Speech recognition is not supported in this browser");
                return Self {
                    recognition: None,
                    state,
                    _handlers: Vec::new(),
                };
            };
            let recognition: web_sys::SpeechRecognition = recognition.unchecked_into();
            recognition.set_continuous(true);
            recognition.set_interim_results(true);
            recognition.set_lang(SPEECH_LANGUAGE);

            let on_start: EventHandler = {
                let state = state.clone();
                Closure::new(move |_: JsValue| state.borrow_mut().listening = true)
            };
            let on_end: EventHandler = {
                let state = state.clone();
                Closure::new(move |_: JsValue| state.borrow_mut().listening = false)
            };
            let on_result: EventHandler = {
                let state = state.clone();
                Closure::new(move |event: JsValue| {
                    let event: web_sys::SpeechRecognitionEvent = event.unchecked_into();
                    state
                        .borrow_mut()
                        .transcript
                        .apply_results(event_results(&event));
                })
            };
            let on_error: EventHandler = {
                let state = state.clone();
                Closure::new(move |event: JsValue| {
                    let error = js_sys::Reflect::get(&event, &JsValue::from_str("error"))
                        .ok()
                        .and_then(|error| error.as_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    log::error!("Speech recognition error: {error}");
                    let mut state = state.borrow_mut();
                    state.error = Some(error);
                    state.listening = false;
                })
            };

            recognition.set_onstart(Some(on_start.as_ref().unchecked_ref()));
            recognition.set_onend(Some(on_end.as_ref().unchecked_ref()));
            recognition.set_onresult(Some(on_result.as_ref().unchecked_ref()));
            recognition.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            Self {
                recognition: Some(recognition),
                state,
                _handlers: vec![on_start, on_end, on_result, on_error],
            }
        }

        pub fn is_supported(&self) -> bool {
            self.recognition.is_some()
        }

        pub fn start(&self) {
            let Some(recognition) = &self.recognition else {
                return;
            };
            {
                let mut state = self.state.borrow_mut();
                if state.listening {
                    return;
                }
                state.transcript.reset();
                state.error = None;
            }
            if let Err(e) = recognition.start() {
                log::error!("Could not start speech recognition: {e:?}");
            }
        }

        pub fn stop(&self) {
            if let Some(recognition) = &self.recognition {
                if self.state.borrow().listening {
                    recognition.stop();
                }
            }
        }

        pub fn reset(&self) {
            self.state.borrow_mut().transcript.reset();
        }

        pub fn is_listening(&self) -> bool {
            self.state.borrow().listening
        }

        pub fn transcript(&self) -> String {
            self.state.borrow().transcript.text().to_string()
        }

        pub fn interim_transcript(&self) -> String {
            self.state.borrow().transcript.interim().to_string()
        }

        pub fn error(&self) -> Option<String> {
            self.state.borrow().error.clone()
        }
    }

    impl Drop for BrowserRecognizer {
        fn drop(&mut self) {
            if let Some(recognition) = &self.recognition {
                recognition.set_onstart(None);
                recognition.set_onend(None);
                recognition.set_onresult(None);
                recognition.set_onerror(None);
                recognition.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(transcript: &str, is_final: bool) -> RecognitionResult {
        RecognitionResult {
            transcript: transcript.to_string(),
            is_final,
        }
    }

    #[test]
    fn final_results_accumulate() {
        let mut transcript = Transcript::default();
        transcript.apply_results([result("I", false)]);
        assert_eq!(transcript.text(), "");
        assert_eq!(transcript.interim(), "I");

        transcript.apply_results([result("I felt", true), result(" it", false)]);
        assert_eq!(transcript.text(), "I felt");
        assert_eq!(transcript.interim(), " it");

        transcript.apply_results([result("bored", true)]);
        assert_eq!(transcript.text(), "I felt bored");
        assert_eq!(transcript.interim(), "");

        transcript.reset();
        assert!(transcript.is_empty());
    }

    #[derive(Default)]
    struct RecordingSpeech {
        supported: bool,
        log: Vec<String>,
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn cancel(&mut self) {
            self.log.push("cancel".to_string());
        }

        fn utter(&mut self, text: &str) {
            self.log.push(format!("say {text}"));
        }
    }

    #[test]
    fn speak_strips_annotation_and_cancels_first() {
        let mut speech = RecordingSpeech {
            supported: true,
            ..Default::default()
        };
        speech.speak("feel/felt (v.)");
        speech.speak("get up (phr. v.)");
        assert_eq!(
            speech.log,
            vec!["cancel", "say feel/felt", "cancel", "say get up"]
        );
    }

    #[test]
    fn unsupported_speech_does_nothing() {
        let mut speech = RecordingSpeech::default();
        speech.speak("bored (adj.)");
        assert!(speech.log.is_empty());

        SilentSpeech.speak("bored (adj.)");
    }
}
