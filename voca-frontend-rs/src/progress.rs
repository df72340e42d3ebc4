use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use voca_utils::{QuizMode, VocabularyEntry};

use crate::badges::BadgeId;

pub const XP_PER_CORRECT_ANSWER: u64 = 10;
pub const PERFECT_SCORE_BONUS_XP: u64 = 50;
pub const HIGH_SCORE_BONUS_XP: u64 = 20;
pub const HIGH_SCORE_PERCENTAGE: u32 = 80;
pub const XP_PER_LEVEL: u64 = 1000;

/// One finished session. Never modified after it is recorded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    #[tsify(type = "string")]
    pub date: DateTime<Utc>,
    /// `None` for review sessions
    pub unit_number: Option<u32>,
    pub lesson_number: Option<u32>,
    pub mode: QuizMode,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: u32,
    pub duration_seconds: u64,
    pub xp_gained: u64,
}

/// Everything that survives between sessions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Words answered wrong and not yet redeemed in a review session, keyed by `word`.
    pub persistent_mistakes: IndexMap<String, VocabularyEntry>,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub xp: u64,
    pub level: u32,
    pub streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
    pub earned_badges: BTreeSet<BadgeId>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            persistent_mistakes: IndexMap::new(),
            history: Vec::new(),
            xp: 0,
            level: 1,
            streak: 0,
            last_study_date: None,
            earned_badges: BTreeSet::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "version")]
pub(crate) enum VersionedProgress {
    V1(Progress),
}

impl From<Progress> for VersionedProgress {
    fn from(progress: Progress) -> Self {
        VersionedProgress::V1(progress)
    }
}

impl From<VersionedProgress> for Progress {
    fn from(versioned: VersionedProgress) -> Self {
        match versioned {
            VersionedProgress::V1(progress) => progress,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub percentage: u32,
    pub xp_gained: u64,
}

/// Percentage (rounded half up) and XP earned for `correct` out of `total`.
/// An empty session scores 0.
pub fn score(correct: u32, total: u32) -> Score {
    let percentage = if total == 0 {
        0
    } else {
        let (correct, total) = (u64::from(correct), u64::from(total));
        ((200 * correct + total) / (2 * total)) as u32
    };
    let bonus = if percentage == 100 {
        PERFECT_SCORE_BONUS_XP
    } else if percentage >= HIGH_SCORE_PERCENTAGE {
        HIGH_SCORE_BONUS_XP
    } else {
        0
    };
    Score {
        percentage,
        xp_gained: u64::from(correct) * XP_PER_CORRECT_ANSWER + bonus,
    }
}

pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// The calendar day `timestamp` falls on for a learner whose clock is
/// `utc_offset_minutes` behind UTC.
pub fn local_day(timestamp: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    (timestamp - Duration::minutes(i64::from(utc_offset_minutes))).date_naive()
}

/// Streak after studying on `today`, given the day of the previous session.
pub fn next_streak(streak: u32, last_day: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_day {
        Some(last) if last == today => streak,
        Some(last) if today.pred_opt() == Some(last) => streak + 1,
        _ => 1,
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct LevelTitle {
    pub min_level: u32,
    pub title: &'static str,
    pub icon: &'static str,
}

pub const LEVEL_TITLES: [LevelTitle; 7] = [
    LevelTitle {
        min_level: 1,
        title: "Baby Egg",
        icon: "🥚",
    },
    LevelTitle {
        min_level: 2,
        title: "Wobbly Chick",
        icon: "🐣",
    },
    LevelTitle {
        min_level: 5,
        title: "Smart Owl",
        icon: "🦉",
    },
    LevelTitle {
        min_level: 10,
        title: "Fast Eagle",
        icon: "🦅",
    },
    LevelTitle {
        min_level: 20,
        title: "Wise Wizard",
        icon: "🧙‍♂️",
    },
    LevelTitle {
        min_level: 30,
        title: "Voca King",
        icon: "👑",
    },
    LevelTitle {
        min_level: 50,
        title: "Legendary Dragon",
        icon: "🐉",
    },
];

pub fn level_title(level: u32) -> &'static LevelTitle {
    LEVEL_TITLES
        .iter()
        .rev()
        .find(|title| level >= title.min_level)
        .unwrap_or(&LEVEL_TITLES[0])
}

/// What a dashboard shows about the learner.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub xp: u64,
    pub level: u32,
    pub level_title: String,
    pub level_icon: String,
    pub xp_into_level: u64,
    pub level_progress_percent: u32,
    pub streak: u32,
    pub sessions_recorded: usize,
    pub words_to_review: usize,
    pub earned_badges: Vec<BadgeId>,
}

impl Progress {
    /// Returns `false` if the word was already queued.
    pub(crate) fn record_mistake(&mut self, entry: &VocabularyEntry) -> bool {
        if self.persistent_mistakes.contains_key(&entry.word) {
            return false;
        }
        self.persistent_mistakes
            .insert(entry.word.clone(), entry.clone());
        true
    }

    /// Returns `false` if the word was not queued.
    pub(crate) fn redeem(&mut self, word: &str) -> bool {
        self.persistent_mistakes.shift_remove(word).is_some()
    }

    pub(crate) fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        self.level = level_for_xp(self.xp);
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry, limit: usize) {
        self.history.insert(0, entry);
        self.history.truncate(limit);
    }

    pub(crate) fn record_study(&mut self, now: DateTime<Utc>, utc_offset_minutes: i32) {
        let today = local_day(now, utc_offset_minutes);
        let last_day = self
            .last_study_date
            .map(|last| local_day(last, utc_offset_minutes));
        self.streak = next_streak(self.streak, last_day, today);
        self.last_study_date = Some(now);
    }

    /// Epoch milliseconds of `now`, moved past the newest recorded id if two
    /// sessions end within the same millisecond.
    pub(crate) fn next_history_id(&self, now: DateTime<Utc>) -> i64 {
        let id = now.timestamp_millis();
        match self.history.first() {
            Some(newest) if newest.id >= id => newest.id + 1,
            _ => id,
        }
    }

    pub fn mistakes(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.persistent_mistakes.values()
    }

    pub fn level_title(&self) -> &'static LevelTitle {
        level_title(self.level)
    }

    pub fn xp_into_level(&self) -> u64 {
        self.xp
            .saturating_sub(u64::from(self.level.saturating_sub(1)) * XP_PER_LEVEL)
    }

    pub fn level_progress_percent(&self) -> u32 {
        (self.xp_into_level() * 100 / XP_PER_LEVEL).min(100) as u32
    }

    /// Best percentage ever scored on a lesson, if it has been attempted.
    pub fn best_score(&self, unit_number: u32, lesson_number: u32) -> Option<u32> {
        self.history
            .iter()
            .filter(|entry| {
                entry.unit_number == Some(unit_number) && entry.lesson_number == Some(lesson_number)
            })
            .map(|entry| entry.percentage)
            .max()
    }

    pub fn summary(&self) -> ProgressSummary {
        let title = self.level_title();
        ProgressSummary {
            xp: self.xp,
            level: self.level,
            level_title: title.title.to_string(),
            level_icon: title.icon.to_string(),
            xp_into_level: self.xp_into_level(),
            level_progress_percent: self.level_progress_percent(),
            streak: self.streak,
            sessions_recorded: self.history.len(),
            words_to_review: self.persistent_mistakes.len(),
            earned_badges: self.earned_badges.iter().copied().collect(),
        }
    }
}
