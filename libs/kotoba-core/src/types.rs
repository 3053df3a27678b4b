//! Content types shared by the stores and the search index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Where a piece of content came from.
///
/// Catalog content ships with the application and is immutable; only custom
/// content may be deleted, and only custom content is ever persisted in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Builtin,
    Custom,
}

impl Default for Origin {
    fn default() -> Self {
        // Only custom content is serialized, so anything deserialized
        // without an explicit origin is custom.
        Self::Custom
    }
}

/// A single front/back vocabulary unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furigana: Option<String>,
    pub back: String,
    /// Opaque reference into the host's media store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
}

impl Flashcard {
    pub fn new(front: String, furigana: Option<String>, back: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            front,
            furigana,
            back,
            front_image: None,
            back_image: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.front.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "front" });
        }
        if self.back.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "back" });
        }
        Ok(())
    }
}

/// An ordered set of flashcards. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContent {
    pub id: Uuid,
    pub lesson_number: u32,
    pub title: String,
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub origin: Origin,
}

impl LessonContent {
    /// A user-authored lesson. Title and every flashcard must pass the
    /// non-empty precondition; callers surface the error before saving.
    pub fn custom(lesson_number: u32, title: String, flashcards: Vec<Flashcard>) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "title" });
        }
        if flashcards.is_empty() {
            return Err(StoreError::EmptyField { field: "flashcards" });
        }
        for card in &flashcards {
            card.validate()?;
        }
        Ok(Self {
            id: Uuid::new_v4(),
            lesson_number,
            title,
            flashcards,
            origin: Origin::Custom,
        })
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furigana: Option<String>,
    pub correct_answer: String,
    pub wrong_answers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
}

impl QuizQuestion {
    pub fn new(
        question: String,
        furigana: Option<String>,
        correct_answer: String,
        wrong_answers: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question,
            furigana,
            correct_answer,
            wrong_answers,
            question_image: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "question" });
        }
        if self.correct_answer.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "correct_answer" });
        }
        if self.wrong_answers.iter().all(|a| a.trim().is_empty()) {
            return Err(StoreError::EmptyField { field: "wrong_answers" });
        }
        Ok(())
    }
}

/// An ordered set of quiz questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizContent {
    pub id: Uuid,
    pub lesson_number: u32,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub origin: Origin,
}

impl QuizContent {
    pub fn custom(lesson_number: u32, title: String, questions: Vec<QuizQuestion>) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "title" });
        }
        if questions.is_empty() {
            return Err(StoreError::EmptyField { field: "questions" });
        }
        for question in &questions {
            question.validate()?;
        }
        Ok(Self {
            id: Uuid::new_v4(),
            lesson_number,
            title,
            questions,
            origin: Origin::Custom,
        })
    }
}

/// What the home screen shows for a recently accessed lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Completion ratio in `[0, 1]`.
    pub progress: f64,
    pub last_accessed: DateTime<Utc>,
}

/// One matching flashcard, at most one per card regardless of how many
/// fields matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: Uuid,
    pub japanese: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furigana: Option<String>,
    pub english: String,
    pub lesson_number: u32,
    pub lesson_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_lesson_rejects_blank_title() {
        let cards = vec![Flashcard::new("水".into(), None, "Water".into())];
        let err = LessonContent::custom(5, "   ".into(), cards).unwrap_err();
        assert!(matches!(err, StoreError::EmptyField { field: "title" }));
    }

    #[test]
    fn custom_lesson_rejects_empty_card_fields() {
        let cards = vec![Flashcard::new("水".into(), None, "".into())];
        let err = LessonContent::custom(5, "Vocab".into(), cards).unwrap_err();
        assert!(matches!(err, StoreError::EmptyField { field: "back" }));
    }

    #[test]
    fn custom_quiz_requires_a_wrong_answer() {
        let question = QuizQuestion::new("水".into(), None, "Water".into(), vec!["".into()]);
        let err = QuizContent::custom(2, "Quiz".into(), vec![question]).unwrap_err();
        assert!(matches!(err, StoreError::EmptyField { field: "wrong_answers" }));
    }

    #[test]
    fn deserialized_content_defaults_to_custom_origin() {
        let card = Flashcard::new("駅".into(), None, "Station".into());
        let lesson = LessonContent::custom(5, "Travel".into(), vec![card]).unwrap();
        let mut value = serde_json::to_value(&lesson).unwrap();
        value.as_object_mut().unwrap().remove("origin");
        let decoded: LessonContent = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.origin, Origin::Custom);
    }
}
