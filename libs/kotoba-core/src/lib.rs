//! Core learner-progress and content-store library for KotobaMaster Pocket.
//!
//! Provides:
//! - Content types (lessons, flashcards, quizzes) and the built-in catalog
//! - Learner profile with points, leveling, streaks and daily goals
//! - Lesson and quiz stores merging catalog content with user-authored
//!   content and persisted progress
//! - Debounced, last-request-wins flashcard search
//!
//! The library owns no storage medium of its own: hosts supply a
//! [`StorageBackend`] for persistence and a [`Clock`] for the current date,
//! which keeps streak and daily-goal rules deterministic under test.

pub mod catalog;
pub mod clock;
pub mod error;
pub mod lessons;
pub mod profile;
pub mod quizzes;
pub mod search;
pub mod storage;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, StoreError};
pub use lessons::{LessonProgress, LessonStore};
pub use profile::{DailyGoals, ProfileManager, UserProfile};
pub use quizzes::{QuizProgress, QuizStore};
pub use search::{search, SearchIndex, SearchScope};
pub use storage::{MemoryStorage, StorageBackend};
pub use types::{
    Flashcard, LessonContent, LessonSummary, Origin, QuizContent, QuizQuestion, SearchResult,
};
