mod file_store;
mod session;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use voca_frontend_rs::{
    Catalog, MemoryStore, QuizMode, QuizStore, StoreConfig, StudySimulation, badges,
};

use crate::file_store::FileStore;

/// Practice vocabulary from the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Vocabulary catalog as JSON (defaults to the bundled Pre-Build Up book)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Where progress is saved
    #[arg(long, global = true, default_value = ".voca")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List units and lessons with your best scores
    Lessons,
    /// Show a lesson's words without quizzing
    Preview {
        #[arg(short, long)]
        unit: u32,
        #[arg(short, long)]
        lesson: u32,
    },
    /// Take a lesson quiz
    Quiz {
        #[arg(short, long)]
        unit: u32,
        #[arg(short, long)]
        lesson: u32,
        /// korean_to_english, english_to_korean, spelling or speaking
        #[arg(short, long, default_value_t = QuizMode::KoreanToEnglish)]
        mode: QuizMode,
    },
    /// Quiz the words you got wrong before
    Review {
        #[arg(short, long, default_value_t = QuizMode::KoreanToEnglish)]
        mode: QuizMode,
    },
    /// Level, streak, badges and recent sessions
    Stats,
    /// Forget the words queued for review
    ClearReview,
    /// Delete the session history
    ClearHistory,
    /// Play a lesson a day at a fixed accuracy, without touching saved progress
    Simulate {
        #[arg(short, long, default_value_t = 30)]
        days: usize,
        /// Percentage of answers that are correct
        #[arg(short, long, default_value_t = 80)]
        accuracy: u32,
        #[arg(short, long, default_value_t = QuizMode::KoreanToEnglish)]
        mode: QuizMode,
        /// Simulated time spent on each answer
        #[arg(long, default_value_t = 6)]
        seconds_per_answer: i64,
    },
    /// Print the JSON schema a custom catalog must follow
    Schema,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            Catalog::from_json(&json)
                .with_context(|| format!("Invalid catalog {}", path.display()))
        }
        None => Catalog::pre_build_up().context("Bundled catalog is invalid"),
    }?;
    log::info!(
        "Loaded catalog {:?}: {} units, {} words",
        catalog.title,
        catalog.units.len(),
        catalog.word_count()
    );
    Ok(catalog)
}

fn store_config() -> StoreConfig {
    StoreConfig {
        utc_offset_minutes: -Local::now().offset().local_minus_utc() / 60,
        ..StoreConfig::default()
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let catalog = load_catalog(args.catalog.as_ref())?;
    let file_store = FileStore::new(&args.data_dir);
    log::debug!("Progress directory: {}", file_store.dir().display());
    let mut store = QuizStore::load(file_store, store_config());
    let mut stdout = io::stdout().lock();

    match args.command {
        Command::Lessons => {
            writeln!(stdout, "{}", catalog.title)?;
            for unit in &catalog.units {
                writeln!(stdout, "Unit {}", unit.unit_number)?;
                for lesson in &unit.lessons {
                    let best = store
                        .progress()
                        .best_score(unit.unit_number, lesson.lesson_number)
                        .map(|best| format!("best {best}%"))
                        .unwrap_or_else(|| "not attempted".to_string());
                    writeln!(
                        stdout,
                        "  Lesson {:>2}: {:>2} words, {best}",
                        lesson.lesson_number,
                        lesson.vocabulary.len()
                    )?;
                }
            }
            writeln!(stdout, "{} words to review", store.progress().mistakes().count())?;
        }
        Command::Preview { unit, lesson } => {
            let Some((unit, lesson)) = catalog.lesson(unit, lesson) else {
                bail!("Unit {unit} lesson {lesson} is not in the catalog");
            };
            store.start_preview(unit, lesson);
            writeln!(
                stdout,
                "Unit {} lesson {}",
                unit.unit_number, lesson.lesson_number
            )?;
            for entry in store.question_set() {
                writeln!(stdout, "  {}", session::preview_line(entry))?;
                writeln!(stdout, "  {:<24} {}", "", entry.definition)?;
            }
        }
        Command::Quiz { unit, lesson, mode } => {
            let Some((unit, lesson)) = catalog.lesson(unit, lesson) else {
                bail!("Unit {unit} lesson {lesson} is not in the catalog");
            };
            if !store.start_quiz(unit, lesson, mode, Utc::now()) {
                bail!("Lesson has no vocabulary");
            }
            if let Some(summary) =
                session::play(&mut store, &mut io::stdin().lock(), &mut stdout)?
            {
                session::print_summary(&mut stdout, &summary, store.session_wrong_answers())?;
            }
        }
        Command::Review { mode } => {
            if !store.start_review_quiz(mode, Utc::now()) {
                writeln!(stdout, "Nothing to review. Well done!")?;
                return Ok(());
            }
            if let Some(summary) =
                session::play(&mut store, &mut io::stdin().lock(), &mut stdout)?
            {
                session::print_summary(&mut stdout, &summary, store.session_wrong_answers())?;
            }
        }
        Command::Stats => {
            let summary = store.progress().summary();
            writeln!(
                stdout,
                "{} Level {} {} ({} XP, {}% to next level)",
                summary.level_icon,
                summary.level,
                summary.level_title,
                summary.xp,
                summary.level_progress_percent
            )?;
            writeln!(stdout, "Streak: {} day(s)", summary.streak)?;
            writeln!(stdout, "Words to review: {}", summary.words_to_review)?;
            writeln!(stdout, "Badges:")?;
            for status in badges::statuses(store.progress()) {
                let mark = if status.earned { "x" } else { " " };
                writeln!(
                    stdout,
                    "  [{mark}] {} {}: {}",
                    status.icon, status.name, status.description
                )?;
            }
            writeln!(stdout, "Recent sessions:")?;
            for entry in store.progress().history.iter().take(10) {
                let lesson = match (entry.unit_number, entry.lesson_number) {
                    (Some(unit), Some(lesson)) => format!("unit {unit} lesson {lesson}"),
                    _ => "review".to_string(),
                };
                writeln!(
                    stdout,
                    "  {} {lesson} ({}): {}/{} ({}%)",
                    entry.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.mode,
                    entry.correct_answers,
                    entry.total_questions,
                    entry.percentage
                )?;
            }
        }
        Command::ClearReview => {
            store.clear_review_list();
            writeln!(stdout, "Review list cleared")?;
        }
        Command::ClearHistory => {
            store.clear_history();
            writeln!(stdout, "History cleared")?;
        }
        Command::Simulate {
            days,
            accuracy,
            mode,
            seconds_per_answer,
        } => {
            let config = StoreConfig {
                seed: Some(0),
                ..store_config()
            };
            let simulated = QuizStore::load(MemoryStore::new(), config);
            let simulation =
                StudySimulation::new(simulated, &catalog, Utc::now(), accuracy)
                .with_mode(mode)
                .with_seconds_per_answer(seconds_per_answer);
            for (day, summary) in simulation.take(days).enumerate() {
                let entry = &summary.entry;
                write!(
                    stdout,
                    "Day {:>3}: unit {} lesson {:>2} {:>3}% in {}s +{} XP",
                    day + 1,
                    entry.unit_number.unwrap_or_default(),
                    entry.lesson_number.unwrap_or_default(),
                    entry.percentage,
                    entry.duration_seconds,
                    entry.xp_gained
                )?;
                if summary.leveled_up {
                    write!(stdout, ", level up")?;
                }
                for id in &summary.new_badges {
                    write!(stdout, ", {}", badges::badge(*id).name)?;
                }
                writeln!(stdout)?;
            }
        }
        Command::Schema => {
            let schema = schemars::schema_for!(Catalog);
            writeln!(stdout, "{}", serde_json::to_string_pretty(&schema)?)?;
        }
    }

    Ok(())
}
