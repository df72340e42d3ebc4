use enumap::EnuMap;
use serde::{Deserialize, Serialize};

use crate::store::AnswerOutcome;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, tsify::Tsify, EnuMap,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "snake_case")]
pub enum SoundEffect {
    Correct,
    Wrong,
    Click,
    LevelUp,
}

pub const SOUND_PATHS: SoundEffectMap<&str> = SoundEffectMap {
    correct: "/media/sounds/correct.ogg",
    wrong: "/media/sounds/wrong.ogg",
    click: "/media/sounds/click.ogg",
    level_up: "/media/sounds/level_up.ogg",
};

impl SoundEffect {
    pub fn path(self) -> &'static str {
        *SOUND_PATHS.get(&self)
    }

    /// The cue that acknowledges an answer, if it was accepted.
    pub fn for_outcome(outcome: AnswerOutcome) -> Option<Self> {
        match outcome {
            AnswerOutcome::Correct => Some(SoundEffect::Correct),
            AnswerOutcome::Wrong => Some(SoundEffect::Wrong),
            AnswerOutcome::Ignored => None,
        }
    }
}

/// Fire-and-forget sound effects. Playback failures never reach the caller.
pub trait AudioCues {
    fn play(&mut self, effect: SoundEffect);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCues;

impl AudioCues for SilentCues {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("No audio output, skipping {effect:?}");
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::SoundBoard;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{AudioCues, SoundEffect, SoundEffectMap};

    /// One preloaded `<audio>` element per effect.
    pub struct SoundBoard {
        elements: SoundEffectMap<Option<web_sys::HtmlAudioElement>>,
    }

    impl SoundBoard {
        pub fn new() -> Self {
            let elements = SoundEffectMap::from_fn(|effect| {
                let path = effect.path();
                match web_sys::HtmlAudioElement::new_with_src(path) {
                    Ok(element) => {
                        element.load();
                        Some(element)
                    }
                    Err(e) => {
                        log::error!("Could not create audio element for {path}: {e:?}");
                        None
                    }
                }
            });
            Self { elements }
        }
    }

    impl AudioCues for SoundBoard {
        fn play(&mut self, effect: SoundEffect) {
            let Some(element) = self.elements.get(&effect) else {
                return;
            };
            element.set_current_time(0.0);
            match element.play() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        // usually the page has not had a user interaction yet
                        log::info!("Audio play failed for {effect:?}: {e:?}");
                    }
                }),
                Err(e) => log::error!("Audio play failed for {effect:?}: {e:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_effect_has_an_ogg_file() {
        for effect in SoundEffect::VARIANTS {
            assert!(effect.path().starts_with("/media/sounds/"));
            assert!(effect.path().ends_with(".ogg"));
        }
        assert_eq!(SoundEffect::LevelUp.path(), "/media/sounds/level_up.ogg");
    }

    #[test]
    fn outcomes_map_to_cues() {
        assert_eq!(
            SoundEffect::for_outcome(AnswerOutcome::Correct),
            Some(SoundEffect::Correct)
        );
        assert_eq!(
            SoundEffect::for_outcome(AnswerOutcome::Wrong),
            Some(SoundEffect::Wrong)
        );
        assert_eq!(SoundEffect::for_outcome(AnswerOutcome::Ignored), None);
    }
}
