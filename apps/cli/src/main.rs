mod db;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use kotoba_core::{
    Clock, Flashcard, LessonContent, LessonStore, ProfileManager, QuizContent, QuizQuestion,
    QuizStore, SearchIndex, SearchScope, StorageBackend, SystemClock,
};

use db::SqliteStorage;

#[derive(Parser)]
#[command(name = "kotoba", about = "KotobaMaster Pocket, survival Japanese from the terminal", version)]
struct Cli {
    /// Use a specific database file (default: the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the learner profile
    Profile,

    /// Change the profile name
    SetName {
        name: String,
    },

    /// Store a profile image reference
    SetAvatar {
        image_ref: String,
    },

    /// Reset points, level and recent lessons (streak and goals survive)
    Reset,

    /// List lessons with completion
    Lessons,

    /// Create a custom lesson; each card is "front|furigana|back"
    AddLesson {
        title: String,
        #[arg(required = true)]
        cards: Vec<String>,
    },

    /// Delete a custom lesson by list position (built-ins are protected)
    DeleteLesson {
        index: usize,
    },

    /// Mark a flashcard completed: lesson number, then 1-based card position
    CompleteCard {
        lesson: u32,
        card: usize,
    },

    /// Record today's writing practice
    Practice,

    /// List quizzes with best scores
    Quizzes,

    /// Create a custom quiz; each question is "question|furigana|correct|wrong,..."
    AddQuiz {
        title: String,
        #[arg(required = true)]
        questions: Vec<String>,
    },

    /// Delete a custom quiz by list position (built-ins are protected)
    DeleteQuiz {
        index: usize,
    },

    /// Record a finished quiz attempt, naming the correctly answered
    /// questions by 1-based position
    QuizResult {
        quiz: u32,
        #[arg(long = "correct", value_delimiter = ',')]
        correct: Vec<usize>,
    },

    /// Search all flashcards
    Search {
        query: String,
        /// Also scan user-authored lessons
        #[arg(long)]
        include_custom: bool,
    },
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kotobamaster")
        .join("kotoba.db")
}

/// "front|furigana|back", with an empty middle field for cards without a
/// reading.
fn parse_card(spec: &str) -> anyhow::Result<Flashcard> {
    let mut parts = spec.splitn(3, '|');
    let (Some(front), Some(furigana), Some(back)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("card {spec:?} is not front|furigana|back");
    };
    let furigana = (!furigana.is_empty()).then(|| furigana.to_string());
    Ok(Flashcard::new(front.to_string(), furigana, back.to_string()))
}

/// "question|furigana|correct|wrong,wrong,...".
fn parse_question(spec: &str) -> anyhow::Result<QuizQuestion> {
    let mut parts = spec.splitn(4, '|');
    let (Some(question), Some(furigana), Some(correct), Some(wrong)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        bail!("question {spec:?} is not question|furigana|correct|wrong,...");
    };
    let furigana = (!furigana.is_empty()).then(|| furigana.to_string());
    let wrong_answers = wrong
        .split(',')
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    Ok(QuizQuestion::new(
        question.to_string(),
        furigana,
        correct.to_string(),
        wrong_answers,
    ))
}

/// Sorted, deduplicated 1-based positions, so a repeated position on the
/// command line cannot double-award points.
fn unique_positions(mut positions: Vec<usize>) -> Vec<usize> {
    positions.sort_unstable();
    positions.dedup();
    positions
}

fn find_lesson(store: &LessonStore, number: u32) -> anyhow::Result<LessonContent> {
    store
        .lessons()
        .iter()
        .find(|l| l.lesson_number == number)
        .cloned()
        .with_context(|| format!("no lesson {number}"))
}

fn find_quiz(store: &QuizStore, number: u32) -> anyhow::Result<QuizContent> {
    store
        .quizzes()
        .iter()
        .find(|q| q.lesson_number == number)
        .cloned()
        .with_context(|| format!("no quiz {number}"))
}

fn print_profile(profile: &ProfileManager) {
    let user = profile.profile();
    let name = if user.name.is_empty() { "(unnamed)" } else { &user.name };
    println!("{name} - level {} ({} points)", user.level, user.points);
    println!(
        "  {} to next level ({:.0}% through level {})",
        user.points_to_next_level(),
        user.level_progress() * 100.0,
        user.level
    );
    println!("  streak: {} days", user.streak);
    let goals = &user.daily_goals;
    println!(
        "  today: {} lessons, practice {}, quiz {}",
        goals.lessons_completed,
        if goals.practice_completed { "done" } else { "pending" },
        if goals.quiz_completed { "done" } else { "pending" },
    );
    if !user.recent_lessons.is_empty() {
        println!("  continue learning:");
        for summary in &user.recent_lessons {
            println!(
                "    {} ({}) - {:.0}%",
                summary.title,
                summary.description,
                summary.progress * 100.0
            );
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .init();

    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let storage: Arc<dyn StorageBackend> =
        Arc::new(SqliteStorage::open(&db_path).context("opening database")?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut profile = ProfileManager::load(storage.clone(), clock.clone());
    profile.subscribe_points(Box::new(|points| println!("Points: {points}")));

    // Every invocation counts as a session activation.
    profile.update_streak();
    profile.reset_daily_goals_if_needed();

    let mut lessons = LessonStore::load(storage.clone(), clock.clone());
    let mut quizzes = QuizStore::load(storage, clock);

    match cli.command {
        Command::Profile => print_profile(&profile),

        Command::SetName { name } => {
            profile.update_name(name);
            print_profile(&profile);
        }

        Command::SetAvatar { image_ref } => {
            profile.update_profile_image(image_ref);
            println!("Profile image updated");
        }

        Command::Reset => {
            profile.reset_progress();
            print_profile(&profile);
        }

        Command::Lessons => {
            for (index, lesson) in lessons.lessons().iter().enumerate() {
                println!(
                    "[{index}] Lesson {}: {} - {} cards, {:.0}% complete",
                    lesson.lesson_number,
                    lesson.title,
                    lesson.flashcards.len(),
                    lessons.get_progress(lesson.id) * 100.0
                );
            }
        }

        Command::AddLesson { title, cards } => {
            let cards = cards
                .iter()
                .map(|spec| parse_card(spec))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let id = lessons.create_custom_lesson(title, cards)?;
            let lesson = lessons.get(id).expect("just created");
            println!("Created lesson {}: {}", lesson.lesson_number, lesson.title);
        }

        Command::DeleteLesson { index } => {
            lessons.delete_lesson(index)?;
            println!("Deleted lesson at index {index}");
        }

        Command::CompleteCard { lesson, card } => {
            let content = find_lesson(&lessons, lesson)?;
            let Some(flashcard) = content.flashcards.get(card.saturating_sub(1)) else {
                bail!(
                    "lesson {lesson} has {} cards, no card {card}",
                    content.flashcards.len()
                );
            };
            let was_complete = lessons.get_progress(content.id) >= 1.0;
            lessons.mark_card_completed(content.id, flashcard.id);
            println!(
                "{} - {} marked complete ({:.0}%)",
                flashcard.front,
                flashcard.back,
                lessons.get_progress(content.id) * 100.0
            );

            if let Some(summary) = lessons.lesson_accessed(content.id) {
                profile.add_lesson(summary);
            }
            if !was_complete && lessons.get_progress(content.id) >= 1.0 {
                profile.update_daily_goals(true, false, false);
                println!("Lesson {lesson} finished!");
            }
        }

        Command::Practice => {
            profile.update_daily_goals(false, true, false);
            println!("Practice recorded for today");
        }

        Command::Quizzes => {
            for (index, quiz) in quizzes.quizzes().iter().enumerate() {
                println!(
                    "[{index}] Quiz {}: {} - {} questions, best score {}",
                    quiz.lesson_number,
                    quiz.title,
                    quiz.questions.len(),
                    quizzes.get_best_score(quiz.id)
                );
            }
        }

        Command::AddQuiz { title, questions } => {
            let questions = questions
                .iter()
                .map(|spec| parse_question(spec))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let id = quizzes.create_custom_quiz(title, questions)?;
            let quiz = quizzes.get(id).expect("just created");
            println!("Created quiz {}: {}", quiz.lesson_number, quiz.title);
        }

        Command::DeleteQuiz { index } => {
            quizzes.delete_quiz(index)?;
            println!("Deleted quiz at index {index}");
        }

        Command::QuizResult { quiz, correct } => {
            let content = find_quiz(&quizzes, quiz)?;
            let correct = unique_positions(correct);
            for position in &correct {
                let Some(question) = content.questions.get(position.saturating_sub(1)) else {
                    bail!(
                        "quiz {quiz} has {} questions, no question {position}",
                        content.questions.len()
                    );
                };
                quizzes.record_correct_answer(content.id, question.id);
                profile.add_points(1);
            }
            quizzes.update_quiz_score(content.id, correct.len() as u32);
            profile.update_daily_goals(false, false, true);
            println!(
                "Score {}/{} - best score {}",
                correct.len(),
                content.questions.len(),
                quizzes.get_best_score(content.id)
            );
        }

        Command::Search { query, include_custom } => {
            let scope = if include_custom {
                SearchScope::IncludeCustom
            } else {
                SearchScope::CatalogOnly
            };
            // A one-shot host has no keystrokes to coalesce.
            let index = SearchIndex::from_store(&lessons, scope).debounced(Duration::ZERO);
            match index.search(&query).await {
                Some(results) if !results.is_empty() => {
                    for result in results {
                        let reading = result
                            .furigana
                            .as_deref()
                            .map(|f| format!(" ({f})"))
                            .unwrap_or_default();
                        println!(
                            "{}{reading} - {}  [Lesson {}: {}]",
                            result.japanese, result.english, result.lesson_number, result.lesson_title
                        );
                    }
                }
                _ => println!("No results for {query:?}"),
            }
        }
    }

    Ok(())
}
