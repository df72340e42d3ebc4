use serde::{Deserialize, Serialize};

use crate::progress::{HistoryEntry, Progress};

#[derive(
    Clone,
    Copy,
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstStep,
    PerfectScore,
    SpeedRacer,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "level_5")]
    Level5,
}

pub struct Badge {
    pub id: BadgeId,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Checked against the progress as it stands after a session has been
    /// recorded, together with that session's history entry.
    pub condition: fn(&Progress, &HistoryEntry) -> bool,
}

pub static BADGES: [Badge; 5] = [
    Badge {
        id: BadgeId::FirstStep,
        icon: "🥚",
        name: "첫 걸음",
        description: "첫 번째 퀴즈를 완료했어요!",
        condition: |progress, _| progress.history.len() == 1,
    },
    Badge {
        id: BadgeId::PerfectScore,
        icon: "💯",
        name: "백점 만점",
        description: "퀴즈에서 100점을 맞았어요!",
        condition: |_, entry| entry.percentage == 100,
    },
    Badge {
        id: BadgeId::SpeedRacer,
        icon: "⚡",
        name: "스피드 레이서",
        description: "30초 안에 퀴즈를 완료했어요!",
        condition: |_, entry| entry.duration_seconds <= 30 && entry.correct_answers >= 5,
    },
    Badge {
        id: BadgeId::Streak3,
        icon: "🔥",
        name: "작심삼일 탈출",
        description: "3일 연속으로 학습했어요!",
        condition: |progress, _| progress.streak >= 3,
    },
    Badge {
        id: BadgeId::Level5,
        icon: "🎓",
        name: "모범생",
        description: "레벨 5를 달성했어요!",
        condition: |progress, _| progress.level >= 5,
    },
];

/// `BADGES` is listed in `BadgeId` declaration order.
pub fn badge(id: BadgeId) -> &'static Badge {
    &BADGES[id as usize]
}

/// Badges not yet earned whose condition now holds.
pub fn newly_earned(progress: &Progress, entry: &HistoryEntry) -> Vec<BadgeId> {
    BADGES
        .iter()
        .filter(|badge| !progress.earned_badges.contains(&badge.id))
        .filter(|badge| (badge.condition)(progress, entry))
        .map(|badge| badge.id)
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStatus {
    pub id: BadgeId,
    pub icon: String,
    pub name: String,
    pub description: String,
    pub earned: bool,
}

/// The full badge list in display order, marking which ones are earned.
pub fn statuses(progress: &Progress) -> Vec<BadgeStatus> {
    BADGES
        .iter()
        .map(|badge| BadgeStatus {
            id: badge.id,
            icon: badge.icon.to_string(),
            name: badge.name.to_string(),
            description: badge.description.to_string(),
            earned: progress.earned_badges.contains(&badge.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use voca_utils::QuizMode;

    fn entry(correct: u32, total: u32, duration_seconds: u64) -> HistoryEntry {
        let score = crate::progress::score(correct, total);
        HistoryEntry {
            id: 1,
            date: Utc::now(),
            unit_number: Some(1),
            lesson_number: Some(1),
            mode: QuizMode::KoreanToEnglish,
            total_questions: total,
            correct_answers: correct,
            percentage: score.percentage,
            duration_seconds,
            xp_gained: score.xp_gained,
        }
    }

    #[test]
    fn first_session_earns_first_step() {
        let mut progress = Progress::default();
        let session = entry(2, 10, 120);
        progress.history.push(session.clone());
        assert_eq!(newly_earned(&progress, &session), vec![BadgeId::FirstStep]);

        progress.history.push(session.clone());
        assert!(newly_earned(&progress, &session).is_empty());
    }

    #[test]
    fn speed_racer_needs_five_correct() {
        let mut progress = Progress::default();
        progress.history = vec![entry(0, 1, 0), entry(0, 1, 0)];

        let quick_but_small = entry(4, 10, 20);
        assert!(!newly_earned(&progress, &quick_but_small).contains(&BadgeId::SpeedRacer));

        let quick = entry(5, 10, 30);
        assert!(newly_earned(&progress, &quick).contains(&BadgeId::SpeedRacer));

        let slow = entry(10, 10, 31);
        let earned = newly_earned(&progress, &slow);
        assert!(!earned.contains(&BadgeId::SpeedRacer));
        assert!(earned.contains(&BadgeId::PerfectScore));
    }

    #[test]
    fn earned_badges_are_not_offered_again() {
        let mut progress = Progress {
            streak: 3,
            level: 5,
            ..Progress::default()
        };
        progress.earned_badges.insert(BadgeId::Streak3);
        let earned = newly_earned(&progress, &entry(1, 10, 100));
        assert_eq!(earned, vec![BadgeId::Level5]);
    }

    #[test]
    fn badge_ids_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&BadgeId::Streak3).unwrap(),
            "\"streak_3\""
        );
        assert_eq!(
            serde_json::to_string(&BadgeId::PerfectScore).unwrap(),
            "\"perfect_score\""
        );
    }

    #[test]
    fn lookup_matches_definition_order() {
        for (index, definition) in BADGES.iter().enumerate() {
            assert_eq!(definition.id as usize, index);
            assert_eq!(badge(definition.id).name, definition.name);
        }
        assert_eq!(badge(BadgeId::Level5).icon, "🎓");
    }

    #[test]
    fn statuses_list_every_badge() {
        let mut progress = Progress::default();
        progress.earned_badges.insert(BadgeId::FirstStep);
        let statuses = statuses(&progress);
        assert_eq!(statuses.len(), BADGES.len());
        assert!(statuses[0].earned);
        assert!(statuses[1..].iter().all(|status| !status.earned));
    }
}
