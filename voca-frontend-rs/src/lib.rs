#![deny(clippy::string_slice)]

pub mod audio;
pub mod badges;
pub mod challenges;
pub mod config;
pub mod progress;
pub mod simulation;
pub mod speech;
pub mod storage;
pub mod store;
mod utils;
#[cfg(target_arch = "wasm32")]
mod web;

pub use audio::SoundEffect;
pub use badges::BadgeId;
pub use challenges::{Challenge, ChallengeKind, Response};
pub use config::StoreConfig;
pub use progress::{HistoryEntry, Progress, ProgressSummary};
pub use simulation::StudySimulation;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use store::{AnswerOutcome, QuizStore, SessionSummary, ViewState};
pub use utils::set_panic_hook;
pub use voca_utils::{Catalog, CatalogError, Lesson, QuizMode, Unit, VocabularyEntry};
#[cfg(target_arch = "wasm32")]
pub use web::{Voca, get_catalog};
