use chrono::{DateTime, Duration, Utc};
use voca_utils::{Catalog, QuizMode};

use crate::storage::KeyValueStore;
use crate::store::{QuizStore, SessionSummary};

/// Plays one lesson per simulated day, working through the catalog in order
/// and wrapping around at the end. Yields each day's session summary.
pub struct StudySimulation<'a, S: KeyValueStore> {
    store: QuizStore<S>,
    catalog: &'a Catalog,
    mode: QuizMode,
    current_time: DateTime<Utc>,
    accuracy_percent: u32,
    seconds_per_answer: i64,
    lesson_cursor: usize,
}

impl<'a, S: KeyValueStore> StudySimulation<'a, S> {
    /// `accuracy_percent` (capped at 100) decides how many answers per
    /// session are correct, spread evenly over the session.
    pub fn new(
        store: QuizStore<S>,
        catalog: &'a Catalog,
        start_time: DateTime<Utc>,
        accuracy_percent: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            mode: QuizMode::default(),
            current_time: start_time,
            accuracy_percent: accuracy_percent.min(100),
            seconds_per_answer: 6,
            lesson_cursor: 0,
        }
    }

    pub fn with_mode(mut self, mode: QuizMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seconds_per_answer(mut self, seconds: i64) -> Self {
        self.seconds_per_answer = seconds.max(0);
        self
    }

    pub fn store(&self) -> &QuizStore<S> {
        &self.store
    }

    pub fn into_store(self) -> QuizStore<S> {
        self.store
    }
}

/// Whether the answer at `index` is correct: the running count of correct
/// answers stays at `accuracy_percent` of the questions asked so far.
fn answers_correctly(index: usize, accuracy_percent: u32) -> bool {
    let accuracy = accuracy_percent as usize;
    (index + 1) * accuracy / 100 > index * accuracy / 100
}

impl<S: KeyValueStore> Iterator for StudySimulation<'_, S> {
    type Item = SessionSummary;

    fn next(&mut self) -> Option<Self::Item> {
        let catalog = self.catalog;
        let lessons: Vec<_> = catalog
            .units
            .iter()
            .flat_map(|unit| unit.lessons.iter().map(move |lesson| (unit, lesson)))
            .collect();
        if lessons.is_empty() {
            return None;
        }
        let (unit, lesson) = lessons[self.lesson_cursor % lessons.len()];
        self.lesson_cursor += 1;

        let day_start = self.current_time;
        if !self.store.start_quiz(unit, lesson, self.mode, day_start) {
            return None;
        }

        let mut now = day_start;
        let mut index = 0;
        let summary = loop {
            let word = self.store.current_question()?.clone();
            now += Duration::seconds(self.seconds_per_answer);
            self.store
                .submit_answer(answers_correctly(index, self.accuracy_percent), &word);
            index += 1;
            if let Some(summary) = self.store.next_question(now) {
                break summary;
            }
        };
        self.store.reset_quiz();

        self.current_time = day_start + Duration::days(1);
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeId;
    use crate::config::StoreConfig;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn simulation(catalog: &Catalog, accuracy_percent: u32) -> StudySimulation<'_, MemoryStore> {
        let config = StoreConfig {
            seed: Some(7),
            ..StoreConfig::default()
        };
        let store = QuizStore::load(MemoryStore::new(), config);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 19, 0, 0).unwrap();
        StudySimulation::new(store, catalog, start, accuracy_percent)
    }

    #[test]
    fn accuracy_is_spread_evenly() {
        let correct = (0..10).filter(|&i| answers_correctly(i, 80)).count();
        assert_eq!(correct, 8);
        assert_eq!((0..7).filter(|&i| answers_correctly(i, 100)).count(), 7);
        assert_eq!((0..7).filter(|&i| answers_correctly(i, 0)).count(), 0);
    }

    #[test]
    fn daily_sessions_build_a_streak() {
        let catalog = Catalog::pre_build_up().unwrap();
        let summaries: Vec<_> = simulation(&catalog, 100).take(4).collect();

        assert_eq!(summaries.len(), 4);
        assert!(summaries.iter().all(|s| s.entry.percentage == 100));
        assert_eq!(summaries[0].new_badges[0], BadgeId::FirstStep);
        assert!(summaries[0].new_badges.contains(&BadgeId::PerfectScore));
        assert!(summaries[2].new_badges.contains(&BadgeId::Streak3));
        assert!(summaries[3].new_badges.is_empty());
    }

    #[test]
    fn lessons_rotate_and_history_grows() {
        let catalog = Catalog::pre_build_up().unwrap();
        let mut simulation = simulation(&catalog, 50);
        let first = simulation.next().unwrap();
        let second = simulation.next().unwrap();
        assert_eq!(first.entry.lesson_number, Some(1));
        assert_eq!(second.entry.lesson_number, Some(2));

        let store = simulation.into_store();
        assert_eq!(store.progress().streak, 2);
        assert_eq!(store.progress().history.len(), 2);
        assert!(!store.progress().persistent_mistakes.is_empty());
    }

    #[test]
    fn enough_sessions_reach_level_five() {
        let catalog = Catalog::pre_build_up().unwrap();
        let leveled: Vec<_> = simulation(&catalog, 100)
            .take(60)
            .filter(|s| s.new_badges.contains(&BadgeId::Level5))
            .collect();
        assert_eq!(leveled.len(), 1);
        assert!(leveled[0].leveled_up);
    }

    #[test]
    fn session_length_follows_answer_pace() {
        let catalog = Catalog::pre_build_up().unwrap();
        let first = simulation(&catalog, 100).next().unwrap();
        assert_eq!(first.entry.duration_seconds, 12 * 6);

        let slow = simulation(&catalog, 100)
            .with_seconds_per_answer(20)
            .next()
            .unwrap();
        assert_eq!(slow.entry.duration_seconds, 12 * 20);

        let clamped = simulation(&catalog, 100)
            .with_seconds_per_answer(-5)
            .next()
            .unwrap();
        assert_eq!(clamped.entry.duration_seconds, 0);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let catalog = Catalog {
            title: "empty".to_string(),
            units: Vec::new(),
        };
        assert_eq!(simulation(&catalog, 100).count(), 0);
    }
}
