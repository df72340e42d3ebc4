use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use voca_utils::text_cleanup::{is_spoken_answer_correct, is_typed_answer_correct};
use voca_utils::{QuizMode, VocabularyEntry};

/// Wrong options offered next to the correct one in a multiple-choice question.
pub const MAX_DISTRACTORS: usize = 3;

/// How the current question is asked.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub entry: VocabularyEntry,
    pub mode: QuizMode,
    pub prompt: String,
    pub kind: ChallengeKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChallengeKind {
    TypeAnswer,
    MultipleChoice { options: Vec<String>, answer: String },
    Speak,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Response {
    Typed(String),
    Choice(String),
    Spoken(String),
}

fn word_of(entry: &VocabularyEntry) -> &str {
    &entry.word
}

fn meaning_of(entry: &VocabularyEntry) -> &str {
    &entry.meaning
}

impl Challenge {
    /// Build the question for `entry`. Distractors for multiple choice are
    /// drawn from the rest of `question_set`; a short set yields fewer options.
    pub fn new(
        entry: &VocabularyEntry,
        mode: QuizMode,
        question_set: &[VocabularyEntry],
        rng: &mut impl Rng,
    ) -> Self {
        let prompt = match mode {
            QuizMode::KoreanToEnglish | QuizMode::Spelling => entry.meaning.clone(),
            QuizMode::EnglishToKorean | QuizMode::Speaking => entry.display_word(),
        };

        let kind = match mode {
            QuizMode::Spelling => ChallengeKind::TypeAnswer,
            QuizMode::Speaking => ChallengeKind::Speak,
            QuizMode::EnglishToKorean => multiple_choice(entry, question_set, meaning_of, rng),
            QuizMode::KoreanToEnglish => {
                if entry.display_word().contains(' ') {
                    // phrases are too fiddly to type exactly
                    multiple_choice(entry, question_set, word_of, rng)
                } else {
                    ChallengeKind::TypeAnswer
                }
            }
        };

        Challenge {
            entry: entry.clone(),
            mode,
            prompt,
            kind,
        }
    }

    pub fn grade(&self, response: &Response) -> bool {
        match response {
            Response::Typed(input) => is_typed_answer_correct(&self.entry.word, input),
            Response::Spoken(transcript) => is_spoken_answer_correct(&self.entry.word, transcript),
            Response::Choice(option) => match &self.kind {
                ChallengeKind::MultipleChoice { answer, .. } => option == answer,
                ChallengeKind::TypeAnswer | ChallengeKind::Speak => *option == self.entry.word,
            },
        }
    }

    /// Text to pronounce for this question.
    pub fn speech_text(&self) -> String {
        self.entry.display_word()
    }

    pub fn options(&self) -> &[String] {
        match &self.kind {
            ChallengeKind::MultipleChoice { options, .. } => options,
            ChallengeKind::TypeAnswer | ChallengeKind::Speak => &[],
        }
    }
}

fn multiple_choice(
    entry: &VocabularyEntry,
    question_set: &[VocabularyEntry],
    target: fn(&VocabularyEntry) -> &str,
    rng: &mut impl Rng,
) -> ChallengeKind {
    let answer = target(entry);

    let mut candidates: Vec<&str> = Vec::new();
    for other in question_set {
        let text = target(other);
        if other.word != entry.word && text != answer && !candidates.contains(&text) {
            candidates.push(text);
        }
    }

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, MAX_DISTRACTORS)
        .map(|text| text.to_string())
        .collect();
    options.push(answer.to_string());
    options.shuffle(rng);

    ChallengeKind::MultipleChoice {
        options,
        answer: answer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn vocab(word: &str, meaning: &str) -> VocabularyEntry {
        VocabularyEntry {
            word: word.to_string(),
            meaning: meaning.to_string(),
            definition: String::new(),
        }
    }

    fn lesson() -> Vec<VocabularyEntry> {
        vec![
            vocab("feel/felt (v.)", "느끼다"),
            vocab("bored (adj.)", "지루한"),
            vocab("unhappy (adj.)", "행복하지 않은"),
            vocab("terrible (adj.)", "끔찍한"),
            vocab("worried (adj.)", "걱정스러운"),
            vocab("get up (phr. v.)", "일어나다"),
        ]
    }

    #[test]
    fn prompt_and_kind_follow_mode() {
        let words = lesson();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let spelling = Challenge::new(&words[0], QuizMode::Spelling, &words, &mut rng);
        assert_eq!(spelling.prompt, "느끼다");
        assert_eq!(spelling.kind, ChallengeKind::TypeAnswer);

        let typed = Challenge::new(&words[1], QuizMode::KoreanToEnglish, &words, &mut rng);
        assert_eq!(typed.kind, ChallengeKind::TypeAnswer);

        let phrase = Challenge::new(&words[5], QuizMode::KoreanToEnglish, &words, &mut rng);
        assert!(matches!(phrase.kind, ChallengeKind::MultipleChoice { .. }));

        let speaking = Challenge::new(&words[0], QuizMode::Speaking, &words, &mut rng);
        assert_eq!(speaking.prompt, "feel/felt");
        assert_eq!(speaking.kind, ChallengeKind::Speak);
        assert_eq!(speaking.speech_text(), "feel/felt");
    }

    #[test]
    fn four_distinct_options_including_answer() {
        let words = lesson();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let challenge = Challenge::new(&words[2], QuizMode::EnglishToKorean, &words, &mut rng);

        let options = challenge.options();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&"행복하지 않은".to_string()));
        let mut unique = options.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn small_question_sets_give_fewer_options() {
        let words = lesson();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let alone = &words[..1];
        let challenge = Challenge::new(&alone[0], QuizMode::EnglishToKorean, alone, &mut rng);
        assert_eq!(challenge.options(), ["느끼다".to_string()]);

        let pair = &words[..2];
        let challenge = Challenge::new(&pair[1], QuizMode::EnglishToKorean, pair, &mut rng);
        assert_eq!(challenge.options().len(), 2);
    }

    #[test]
    fn duplicate_meanings_are_not_offered_twice() {
        let words = vec![
            vocab("happen (v.)", "일어나다"),
            vocab("get up (phr. v.)", "일어나다"),
            vocab("visit (v.)", "방문하다"),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let challenge = Challenge::new(&words[0], QuizMode::EnglishToKorean, &words, &mut rng);
        assert_eq!(challenge.options().len(), 2);
    }

    #[test]
    fn grading() {
        let words = lesson();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let typed = Challenge::new(&words[0], QuizMode::Spelling, &words, &mut rng);
        assert!(typed.grade(&Response::Typed(" FELT ".to_string())));
        assert!(!typed.grade(&Response::Typed("feeling".to_string())));

        let choice = Challenge::new(&words[3], QuizMode::EnglishToKorean, &words, &mut rng);
        assert!(choice.grade(&Response::Choice("끔찍한".to_string())));
        assert!(!choice.grade(&Response::Choice("지루한".to_string())));

        let spoken = Challenge::new(&words[0], QuizMode::Speaking, &words, &mut rng);
        assert!(spoken.grade(&Response::Spoken("I felt".to_string())));
        assert!(!spoken.grade(&Response::Spoken("fell".to_string())));
    }
}
