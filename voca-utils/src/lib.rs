pub mod text_cleanup;

use std::collections::BTreeSet;

use crate::text_cleanup::strip_annotations;

/// A single word/meaning pair from a lesson.
///
/// `word` can carry a part-of-speech annotation in parentheses and several
/// accepted forms separated by `/`, e.g. `"feel/felt (v.)"`.
#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    tsify::Tsify,
    PartialEq,
    Eq,
    Hash,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct VocabularyEntry {
    pub word: String,
    pub meaning: String,
    pub definition: String,
}

impl VocabularyEntry {
    /// The word as it should be shown or spoken: annotations removed, alternatives kept.
    pub fn display_word(&self) -> String {
        strip_annotations(&self.word)
    }
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    tsify::Tsify,
    PartialEq,
    Eq,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Lesson {
    pub lesson_number: u32,
    pub vocabulary: Vec<VocabularyEntry>,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    tsify::Tsify,
    PartialEq,
    Eq,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Unit {
    pub unit_number: u32,
    pub lessons: Vec<Lesson>,
}

impl Unit {
    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons
            .iter()
            .find(|lesson| lesson.lesson_number == lesson_number)
    }
}

/// The static content a learner studies from. Loaded once and never mutated.
#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    tsify::Tsify,
    PartialEq,
    Eq,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Catalog {
    pub title: String,
    pub units: Vec<Unit>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unit {unit} lesson {lesson} has no vocabulary")]
    EmptyLesson { unit: u32, lesson: u32 },
    #[error("unit {0} appears more than once")]
    DuplicateUnit(u32),
    #[error("unit {unit} lists lesson {lesson} more than once")]
    DuplicateLesson { unit: u32, lesson: u32 },
    #[error("unit {unit} lesson {lesson} contains an entry with a blank word")]
    BlankWord { unit: u32, lesson: u32 },
}

const PRE_BUILD_UP: &str = include_str!("../data/pre_build_up.json");

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The "Pre-Build Up" book that ships with the app.
    pub fn pre_build_up() -> Result<Self, CatalogError> {
        Self::from_json(PRE_BUILD_UP)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen_units = BTreeSet::new();
        for unit in &self.units {
            if !seen_units.insert(unit.unit_number) {
                return Err(CatalogError::DuplicateUnit(unit.unit_number));
            }

            let mut seen_lessons = BTreeSet::new();
            for lesson in &unit.lessons {
                if !seen_lessons.insert(lesson.lesson_number) {
                    return Err(CatalogError::DuplicateLesson {
                        unit: unit.unit_number,
                        lesson: lesson.lesson_number,
                    });
                }
                if lesson.vocabulary.is_empty() {
                    return Err(CatalogError::EmptyLesson {
                        unit: unit.unit_number,
                        lesson: lesson.lesson_number,
                    });
                }
                if lesson
                    .vocabulary
                    .iter()
                    .any(|entry| entry.display_word().is_empty())
                {
                    return Err(CatalogError::BlankWord {
                        unit: unit.unit_number,
                        lesson: lesson.lesson_number,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn unit(&self, unit_number: u32) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.unit_number == unit_number)
    }

    pub fn lesson(&self, unit_number: u32, lesson_number: u32) -> Option<(&Unit, &Lesson)> {
        let unit = self.unit(unit_number)?;
        let lesson = unit.lesson(lesson_number)?;
        Some((unit, lesson))
    }

    pub fn word_count(&self) -> usize {
        self.units
            .iter()
            .flat_map(|unit| &unit.lessons)
            .map(|lesson| lesson.vocabulary.len())
            .sum()
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    tsify::Tsify,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum QuizMode {
    /// Shown the meaning, answer with the English word.
    #[default]
    KoreanToEnglish,
    /// Shown the English word, pick the meaning.
    EnglishToKorean,
    Spelling,
    Speaking,
}
