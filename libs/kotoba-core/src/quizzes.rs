//! Quiz store: catalog quizzes merged with user-authored quizzes, plus
//! score tracking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::clock::Clock;
use crate::error::{Result, StoreError};
use crate::storage::{load_json, save_json, StorageBackend, KEY_CUSTOM_QUIZZES, KEY_QUIZ_PROGRESS};
use crate::types::{Origin, QuizContent, QuizQuestion};

/// Per-quiz results, keyed by quiz id in the persisted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizProgress {
    pub correct_answers: HashSet<Uuid>,
    pub last_attempt_date: DateTime<Utc>,
    pub best_score: u32,
}

/// Owns the merged quiz list and the results map.
pub struct QuizStore {
    quizzes: Vec<QuizContent>,
    results: HashMap<Uuid, QuizProgress>,
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl QuizStore {
    /// Merges the catalog with persisted custom quizzes and loads the
    /// results map. Absent or malformed records yield empty defaults.
    pub fn load(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        let mut quizzes = catalog::quizzes();
        let custom: Vec<QuizContent> =
            load_json(storage.as_ref(), KEY_CUSTOM_QUIZZES).unwrap_or_default();
        quizzes.extend(custom);

        let results = load_json(storage.as_ref(), KEY_QUIZ_PROGRESS).unwrap_or_default();

        Self {
            quizzes,
            results,
            storage,
            clock,
        }
    }

    pub fn quizzes(&self) -> &[QuizContent] {
        &self.quizzes
    }

    pub fn get(&self, quiz_id: Uuid) -> Option<&QuizContent> {
        self.quizzes.iter().find(|q| q.id == quiz_id)
    }

    fn persist_custom(&self) {
        let custom: Vec<&QuizContent> = self
            .quizzes
            .iter()
            .filter(|q| q.origin == Origin::Custom)
            .collect();
        save_json(self.storage.as_ref(), KEY_CUSTOM_QUIZZES, &custom);
    }

    fn persist_results(&self) {
        save_json(self.storage.as_ref(), KEY_QUIZ_PROGRESS, &self.results);
    }

    fn entry(&mut self, quiz_id: Uuid) -> &mut QuizProgress {
        let now = self.clock.now();
        self.results.entry(quiz_id).or_insert(QuizProgress {
            correct_answers: HashSet::new(),
            last_attempt_date: now,
            best_score: 0,
        })
    }

    /// Validates, appends and persists a user-authored quiz. Numbered past
    /// the highest existing number, like lessons.
    pub fn create_custom_quiz(&mut self, title: String, questions: Vec<QuizQuestion>) -> Result<Uuid> {
        let lesson_number = self
            .quizzes
            .iter()
            .map(|q| q.lesson_number)
            .max()
            .unwrap_or(0)
            + 1;
        let quiz = QuizContent::custom(lesson_number, title, questions)?;
        let id = quiz.id;
        self.quizzes.push(quiz);
        self.persist_custom();
        Ok(id)
    }

    /// Removes the quiz at `index`, with the same catalog protection rule
    /// as lessons.
    pub fn delete_quiz(&mut self, index: usize) -> Result<()> {
        let quiz = self.quizzes.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.quizzes.len(),
        })?;
        if quiz.origin == Origin::Builtin {
            tracing::warn!(index, "refusing to delete built-in quiz");
            return Err(StoreError::BuiltinProtected { index });
        }
        self.quizzes.remove(index);
        self.persist_custom();
        Ok(())
    }

    /// Records a finished attempt: the best score is a monotonic max.
    pub fn update_quiz_score(&mut self, quiz_id: Uuid, score: u32) {
        let now = self.clock.now();
        let progress = self.entry(quiz_id);
        progress.last_attempt_date = now;
        progress.best_score = progress.best_score.max(score);
        self.persist_results();
    }

    /// Remembers that a question was answered correctly at least once.
    pub fn record_correct_answer(&mut self, quiz_id: Uuid, question_id: Uuid) {
        let now = self.clock.now();
        let progress = self.entry(quiz_id);
        progress.correct_answers.insert(question_id);
        progress.last_attempt_date = now;
        self.persist_results();
    }

    /// Best score ever achieved, `0` when the quiz was never attempted.
    pub fn get_best_score(&self, quiz_id: Uuid) -> u32 {
        self.results.get(&quiz_id).map_or(0, |p| p.best_score)
    }
}
