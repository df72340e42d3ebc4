use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Utc;
use voca_frontend_rs::badges;
use voca_frontend_rs::{
    AnswerOutcome, ChallengeKind, KeyValueStore, QuizStore, Response, SessionSummary,
    VocabularyEntry,
};
use voca_utils::text_cleanup::annotation;

/// Play the quiz that was just started on `store`, one question per line of
/// `input`. Returns `None` if the input ran out before the quiz finished.
pub fn play<S: KeyValueStore>(
    store: &mut QuizStore<S>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Option<SessionSummary>> {
    let total = store.question_set().len();
    loop {
        let Some(challenge) = store.current_challenge().cloned() else {
            return Ok(None);
        };
        writeln!(output)?;
        writeln!(
            output,
            "[{}/{total}] {}",
            store.current_index() + 1,
            challenge.prompt
        )?;
        match &challenge.kind {
            ChallengeKind::MultipleChoice { options, .. } => {
                for (number, option) in options.iter().enumerate() {
                    writeln!(output, "  {}. {option}", number + 1)?;
                }
                write!(output, "Choose: ")?;
            }
            ChallengeKind::TypeAnswer => write!(output, "Type the answer: ")?,
            ChallengeKind::Speak => write!(output, "Say it (type what you said): ")?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            writeln!(output, "Quiz abandoned, no session was recorded.")?;
            return Ok(None);
        }
        let line = line.trim().to_string();

        let response = match &challenge.kind {
            ChallengeKind::MultipleChoice { options, .. } => {
                let chosen = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|number| options.get(number.checked_sub(1)?))
                    .cloned()
                    .unwrap_or(line);
                Response::Choice(chosen)
            }
            ChallengeKind::TypeAnswer => Response::Typed(line),
            ChallengeKind::Speak => Response::Spoken(line),
        };

        match store.submit_response(&response) {
            AnswerOutcome::Correct => writeln!(output, "Correct!")?,
            AnswerOutcome::Wrong => writeln!(
                output,
                "Wrong. {} = {} ({})",
                challenge.entry.word, challenge.entry.meaning, challenge.entry.definition
            )?,
            AnswerOutcome::Ignored => {}
        }

        if let Some(summary) = store.next_question(Utc::now()) {
            return Ok(Some(summary));
        }
    }
}

/// One preview row: the word without its annotation, the annotation in
/// brackets, then the meaning.
pub fn preview_line(entry: &VocabularyEntry) -> String {
    let word = match annotation(&entry.word) {
        Some(annotation) => format!("{} [{annotation}]", entry.display_word()),
        None => entry.display_word(),
    };
    format!("{word:<24} {}", entry.meaning)
}

pub fn print_summary(
    output: &mut impl Write,
    summary: &SessionSummary,
    wrong_answers: &[VocabularyEntry],
) -> Result<()> {
    let entry = &summary.entry;
    writeln!(output)?;
    writeln!(
        output,
        "Score: {}/{} ({}%) in {}s, +{} XP",
        entry.correct_answers,
        entry.total_questions,
        entry.percentage,
        entry.duration_seconds,
        entry.xp_gained
    )?;
    if !wrong_answers.is_empty() {
        writeln!(output, "Words to review:")?;
        for entry in wrong_answers {
            writeln!(output, "  {} = {}", entry.word, entry.meaning)?;
        }
    }
    if summary.leveled_up {
        writeln!(output, "Level up!")?;
    }
    for id in &summary.new_badges {
        let badge = badges::badge(*id);
        writeln!(
            output,
            "New badge: {} {} ({})",
            badge.icon, badge.name, badge.description
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use voca_frontend_rs::{Catalog, MemoryStore, QuizMode, StoreConfig};

    fn store() -> QuizStore<MemoryStore> {
        let config = StoreConfig {
            seed: Some(1),
            ..StoreConfig::default()
        };
        QuizStore::load(MemoryStore::new(), config)
    }

    #[test]
    fn wrong_answers_finish_the_session() {
        let catalog = Catalog::pre_build_up().unwrap();
        let (unit, lesson) = catalog.lesson(1, 1).unwrap();
        let mut store = store();
        store.start_quiz(unit, lesson, QuizMode::Spelling, Utc::now());

        let answers = "nope\n".repeat(lesson.vocabulary.len());
        let mut output = Vec::new();
        let summary = play(&mut store, &mut Cursor::new(answers), &mut output)
            .unwrap()
            .unwrap();

        assert_eq!(summary.entry.correct_answers, 0);
        assert_eq!(
            store.progress().persistent_mistakes.len(),
            lesson.vocabulary.len()
        );
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Wrong. feel/felt (v.) = 느끼다"));
    }

    #[test]
    fn option_numbers_pick_choices() {
        let catalog = Catalog::pre_build_up().unwrap();
        let (unit, lesson) = catalog.lesson(1, 1).unwrap();
        let mut quiz = store();
        quiz.start_quiz(unit, lesson, QuizMode::EnglishToKorean, Utc::now());

        // Same seed, so a second store asks the same questions with the same options.
        let mut answers = String::new();
        let mut rehearsal = store();
        rehearsal.start_quiz(unit, lesson, QuizMode::EnglishToKorean, Utc::now());
        for _ in 0..lesson.vocabulary.len() {
            let challenge = rehearsal.current_challenge().cloned().unwrap();
            let number = challenge
                .options()
                .iter()
                .position(|option| option == &challenge.entry.meaning)
                .unwrap();
            answers.push_str(&format!("{}\n", number + 1));
            rehearsal.submit_response(&Response::Choice(challenge.entry.meaning.clone()));
            rehearsal.next_question(Utc::now());
        }

        let summary = play(&mut quiz, &mut Cursor::new(answers), &mut Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(summary.entry.percentage, 100);
    }

    #[test]
    fn running_out_of_input_records_nothing() {
        let catalog = Catalog::pre_build_up().unwrap();
        let (unit, lesson) = catalog.lesson(2, 1).unwrap();
        let mut store = store();
        store.start_quiz(unit, lesson, QuizMode::Spelling, Utc::now());

        let mut output = Vec::new();
        let summary = play(&mut store, &mut Cursor::new("x\n"), &mut output).unwrap();
        assert!(summary.is_none());
        assert!(store.progress().history.is_empty());
        assert_eq!(store.progress().persistent_mistakes.len(), 1);
        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with("Quiz abandoned, no session was recorded.\n"));

        let mut output = Vec::new();
        let summary = store.end_quiz(Utc::now()).unwrap();
        print_summary(&mut output, &summary, store.session_wrong_answers()).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Score: 0/12"));
        assert!(output.contains("Words to review:"));
    }

    #[test]
    fn summary_lists_the_words_missed() {
        let catalog = Catalog::pre_build_up().unwrap();
        let (unit, lesson) = catalog.lesson(1, 1).unwrap();
        let mut store = store();
        store.start_quiz(unit, lesson, QuizMode::Spelling, Utc::now());

        let mut answers = String::new();
        for (index, entry) in store.question_set().iter().enumerate() {
            if index < 2 {
                answers.push_str("nope\n");
            } else {
                let word = entry.display_word();
                let first_form = word.split('/').next().unwrap();
                answers.push_str(&format!("{first_form}\n"));
            }
        }
        let summary = play(&mut store, &mut Cursor::new(answers), &mut Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(summary.entry.correct_answers, 10);

        let mut output = Vec::new();
        print_summary(&mut output, &summary, store.session_wrong_answers()).unwrap();
        let output = String::from_utf8(output).unwrap();
        for entry in &store.question_set()[..2] {
            assert!(output.contains(&format!("  {} = {}", entry.word, entry.meaning)));
        }
        assert_eq!(output.matches(" = ").count(), 2);
    }

    #[test]
    fn preview_shows_annotations_apart() {
        let entry = VocabularyEntry {
            word: "feel/felt (v.)".to_string(),
            meaning: "느끼다".to_string(),
            definition: "to experience an emotion".to_string(),
        };
        assert_eq!(preview_line(&entry), format!("{:<24} 느끼다", "feel/felt [v.]"));

        let plain = VocabularyEntry {
            word: "ready".to_string(),
            ..entry
        };
        assert_eq!(preview_line(&plain), format!("{:<24} 느끼다", "ready"));
    }
}
