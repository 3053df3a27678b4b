//! Lesson store: catalog lessons merged with user-authored lessons, plus
//! per-card completion tracking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::clock::Clock;
use crate::error::{Result, StoreError};
use crate::storage::{load_json, save_json, StorageBackend, KEY_CUSTOM_LESSONS, KEY_LESSON_PROGRESS};
use crate::types::{Flashcard, LessonContent, LessonSummary, Origin};

/// Per-lesson completion state, keyed by lesson id in the persisted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub completed_cards: HashSet<Uuid>,
    pub last_access_date: DateTime<Utc>,
}

/// Owns the merged lesson list and the progress map.
///
/// Catalog lessons come first, ordered by lesson number, and are recomputed
/// from code on every load; only the custom suffix is persisted.
pub struct LessonStore {
    lessons: Vec<LessonContent>,
    progress: HashMap<Uuid, LessonProgress>,
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl LessonStore {
    /// Merges the catalog with persisted custom lessons and loads the
    /// progress map. Absent or malformed records yield empty defaults.
    pub fn load(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        let mut lessons = catalog::lessons();
        let custom: Vec<LessonContent> =
            load_json(storage.as_ref(), KEY_CUSTOM_LESSONS).unwrap_or_default();
        lessons.extend(custom);

        let progress = load_json(storage.as_ref(), KEY_LESSON_PROGRESS).unwrap_or_default();

        Self {
            lessons,
            progress,
            storage,
            clock,
        }
    }

    pub fn lessons(&self) -> &[LessonContent] {
        &self.lessons
    }

    pub fn get(&self, lesson_id: Uuid) -> Option<&LessonContent> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    fn persist_custom(&self) {
        let custom: Vec<&LessonContent> = self
            .lessons
            .iter()
            .filter(|l| l.origin == Origin::Custom)
            .collect();
        save_json(self.storage.as_ref(), KEY_CUSTOM_LESSONS, &custom);
    }

    fn persist_progress(&self) {
        save_json(self.storage.as_ref(), KEY_LESSON_PROGRESS, &self.progress);
    }

    /// Validates, appends and persists a user-authored lesson. The new
    /// lesson is numbered past the highest existing number, so numbers
    /// stay unique across delete-then-create sequences.
    pub fn create_custom_lesson(
        &mut self,
        title: String,
        flashcards: Vec<Flashcard>,
    ) -> Result<Uuid> {
        let lesson_number = self
            .lessons
            .iter()
            .map(|l| l.lesson_number)
            .max()
            .unwrap_or(0)
            + 1;
        let lesson = LessonContent::custom(lesson_number, title, flashcards)?;
        let id = lesson.id;
        self.lessons.push(lesson);
        self.persist_custom();
        Ok(id)
    }

    /// Removes the lesson at `index`. Catalog lessons are protected: the
    /// attempt is rejected and the list is left unchanged.
    pub fn delete_lesson(&mut self, index: usize) -> Result<()> {
        let lesson = self.lessons.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.lessons.len(),
        })?;
        if lesson.origin == Origin::Builtin {
            tracing::warn!(index, "refusing to delete built-in lesson");
            return Err(StoreError::BuiltinProtected { index });
        }
        self.lessons.remove(index);
        self.persist_custom();
        Ok(())
    }

    /// Marks a card completed. Idempotent: re-marking an already-completed
    /// card only refreshes the access date.
    pub fn mark_card_completed(&mut self, lesson_id: Uuid, card_id: Uuid) {
        let now = self.clock.now();
        let progress = self.progress.entry(lesson_id).or_insert(LessonProgress {
            completed_cards: HashSet::new(),
            last_access_date: now,
        });
        progress.completed_cards.insert(card_id);
        progress.last_access_date = now;
        self.persist_progress();
    }

    /// Completion ratio in `[0, 1]`; `0.0` for unknown lessons, lessons
    /// without progress, or lessons with no flashcards.
    pub fn get_progress(&self, lesson_id: Uuid) -> f64 {
        let (Some(progress), Some(lesson)) = (self.progress.get(&lesson_id), self.get(lesson_id))
        else {
            return 0.0;
        };
        if lesson.flashcards.is_empty() {
            return 0.0;
        }
        progress.completed_cards.len() as f64 / lesson.flashcards.len() as f64
    }

    /// Builds the summary the profile's recent-lessons list wants. Returns
    /// `None` for unknown ids.
    pub fn lesson_accessed(&self, lesson_id: Uuid) -> Option<LessonSummary> {
        let lesson = self.get(lesson_id)?;
        Some(LessonSummary {
            id: lesson.id,
            title: lesson.title.clone(),
            description: format!("Lesson {}", lesson.lesson_number),
            progress: self.get_progress(lesson_id),
            last_accessed: self.clock.now(),
        })
    }
}
