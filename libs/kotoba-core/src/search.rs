//! Free-text flashcard search.
//!
//! Matching itself is a pure scan; [`SearchIndex`] wraps it with the
//! debounce and last-request-wins behavior the as-you-type flow needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::lessons::LessonStore;
use crate::types::{LessonContent, Origin, SearchResult};

/// How long a query sits before executing, so that one scan serves a burst
/// of keystrokes.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Which lessons a [`SearchIndex`] scans. Whether user-authored lessons
/// are searchable is the host's call, not a hard-coded rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    CatalogOnly,
    IncludeCustom,
}

/// Case-insensitive substring search across front text, back text and
/// furigana. Each flashcard contributes at most one result, and results
/// are ordered by lesson number with catalog card order preserved within
/// a lesson.
pub fn search(lessons: &[LessonContent], query: &str) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = Vec::new();
    for lesson in lessons {
        for card in &lesson.flashcards {
            let matches = card.front.to_lowercase().contains(&query)
                || card.back.to_lowercase().contains(&query)
                || card
                    .furigana
                    .as_ref()
                    .is_some_and(|f| f.to_lowercase().contains(&query));
            if matches {
                results.push(SearchResult {
                    id: card.id,
                    japanese: card.front.clone(),
                    furigana: card.furigana.clone(),
                    english: card.back.clone(),
                    lesson_number: lesson.lesson_number,
                    lesson_title: lesson.title.clone(),
                });
            }
        }
    }

    // Stable, so ties keep their within-lesson order.
    results.sort_by_key(|r| r.lesson_number);
    results
}

/// Debounced search over a snapshot of lesson content.
///
/// Queries issued while an earlier one is still waiting out its debounce
/// supersede it: the superseded call resolves to `None` and only the most
/// recent query produces results.
pub struct SearchIndex {
    lessons: Arc<Vec<LessonContent>>,
    generation: AtomicU64,
    debounce: Duration,
}

impl SearchIndex {
    pub fn new(lessons: Vec<LessonContent>) -> Self {
        Self::with_debounce(lessons, DEBOUNCE)
    }

    pub fn with_debounce(lessons: Vec<LessonContent>, debounce: Duration) -> Self {
        Self {
            lessons: Arc::new(lessons),
            generation: AtomicU64::new(0),
            debounce,
        }
    }

    /// Snapshots the lessons a store currently holds, restricted to the
    /// given scope. Rebuild the index after the store changes.
    pub fn from_store(store: &LessonStore, scope: SearchScope) -> Self {
        let lessons = store
            .lessons()
            .iter()
            .filter(|l| scope == SearchScope::IncludeCustom || l.origin == Origin::Builtin)
            .cloned()
            .collect();
        Self::new(lessons)
    }

    /// Overrides the debounce window; `Duration::ZERO` disables it for
    /// one-shot hosts.
    pub fn debounced(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Runs `query` after the debounce window, unless a newer query has
    /// been issued in the meantime.
    pub async fn search(&self, query: &str) -> Option<Vec<SearchResult>> {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != issued {
            // A newer query superseded this one while it was waiting.
            return None;
        }
        Some(search(&self.lessons, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_water_in_lesson_one() {
        let results = search(&catalog::lessons(), "水");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].english, "Water");
        assert_eq!(results[0].lesson_number, 1);
        assert_eq!(results[0].lesson_title, "Japanese Survival Words");
    }

    #[test]
    fn blank_query_yields_no_results() {
        let lessons = catalog::lessons();
        assert!(search(&lessons, "").is_empty());
        assert!(search(&lessons, "   ").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_across_fields() {
        let lessons = catalog::lessons();

        // English back text, wrong case.
        let results = search(&lessons, "hospital");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].japanese, "病院");

        // Furigana field.
        let results = search(&lessons, "くうこう");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].english, "Airport");
    }

    #[test]
    fn card_matching_on_multiple_fields_appears_once() {
        // "きゃ" matches both the front of the KYA card and nothing else
        // twice; "ひ" matches fronts and furigana across lessons but each
        // card only once.
        let lessons = catalog::lessons();
        let results = search(&lessons, "きゃ");
        let kya: Vec<_> = results.iter().filter(|r| r.english == "KYA").collect();
        assert_eq!(kya.len(), 1);
    }

    #[test]
    fn results_are_ordered_by_lesson_number() {
        let lessons = catalog::lessons();
        // "GO" hits lesson 3 fronts/backs ("ご" -> GO) and lesson 1 backs
        // ("Good morning", ...).
        let results = search(&lessons, "go");
        assert!(!results.is_empty());
        let numbers: Vec<u32> = results.iter().map(|r| r.lesson_number).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
    }

    #[tokio::test]
    async fn newer_query_supersedes_older_in_flight_query() {
        let index = Arc::new(SearchIndex::with_debounce(
            catalog::lessons(),
            Duration::from_millis(50),
        ));

        let stale_index = index.clone();
        let stale = tokio::spawn(async move { stale_index.search("水").await });

        // Give the first query time to enter its debounce window, then
        // supersede it.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fresh = index.search("駅").await;

        assert_eq!(stale.await.unwrap(), None);
        let results = fresh.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].english, "Station");
    }

    #[tokio::test]
    async fn uncontested_query_completes() {
        let index = SearchIndex::with_debounce(catalog::lessons(), Duration::from_millis(5));
        let results = index.search("water").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].japanese, "水");
    }
}
