//! The fixed set of built-in lessons and quizzes.
//!
//! Catalog content is constructed once at startup and is read-only
//! thereafter; it is recomputed from code on every launch and never
//! serialized. Ids are UUIDv5 over a fixed namespace and the entry's
//! position so that persisted progress keyed by id survives restarts.

use uuid::Uuid;

use crate::types::{Flashcard, LessonContent, Origin, QuizContent, QuizQuestion};

/// Namespace for catalog ids. Arbitrary but fixed forever.
const CATALOG_NAMESPACE: Uuid = Uuid::from_u128(0x8f4e_1b2a_6c3d_4e5f_9a0b_1c2d_3e4f_5a6b);

fn lesson_id(lesson_number: u32) -> Uuid {
    Uuid::new_v5(&CATALOG_NAMESPACE, format!("lesson-{lesson_number}").as_bytes())
}

fn quiz_id(lesson_number: u32) -> Uuid {
    Uuid::new_v5(&CATALOG_NAMESPACE, format!("quiz-{lesson_number}").as_bytes())
}

fn card(lesson_number: u32, front: &str, furigana: Option<&str>, back: &str) -> Flashcard {
    Flashcard {
        id: Uuid::new_v5(
            &CATALOG_NAMESPACE,
            format!("lesson-{lesson_number}/card-{front}").as_bytes(),
        ),
        front: front.to_string(),
        furigana: furigana.map(str::to_string),
        back: back.to_string(),
        front_image: None,
        back_image: None,
    }
}

fn question(
    quiz_number: u32,
    text: &str,
    furigana: Option<&str>,
    correct: &str,
    wrong: &[&str],
) -> QuizQuestion {
    QuizQuestion {
        id: Uuid::new_v5(
            &CATALOG_NAMESPACE,
            format!("quiz-{quiz_number}/question-{text}").as_bytes(),
        ),
        question: text.to_string(),
        furigana: furigana.map(str::to_string),
        correct_answer: correct.to_string(),
        wrong_answers: wrong.iter().map(|s| s.to_string()).collect(),
        question_image: None,
    }
}

fn lesson(lesson_number: u32, title: &str, flashcards: Vec<Flashcard>) -> LessonContent {
    LessonContent {
        id: lesson_id(lesson_number),
        lesson_number,
        title: title.to_string(),
        flashcards,
        origin: Origin::Builtin,
    }
}

/// All built-in lessons, ordered by lesson number.
pub fn lessons() -> Vec<LessonContent> {
    vec![survival_words(), at_the_airport(), hiragana_3(), hiragana_4()]
}

/// All built-in quizzes, ordered by lesson number.
pub fn quizzes() -> Vec<QuizContent> {
    vec![basic_greetings_quiz()]
}

fn survival_words() -> LessonContent {
    let n = 1;
    lesson(
        n,
        "Japanese Survival Words",
        vec![
            card(n, "こんにちは", None, "Hello"),
            card(n, "ありがとう", None, "Thank you"),
            card(n, "すみません", None, "Excuse me / Sorry"),
            card(n, "はい", None, "Yes"),
            card(n, "いいえ", None, "No"),
            card(n, "おはよう", None, "Good morning"),
            card(n, "こんばんは", None, "Good evening"),
            card(n, "おやすみなさい", None, "Good night"),
            card(n, "お願いします", None, "Please"),
            card(n, "わかりません", None, "I don't understand"),
            card(n, "英語を話せますか", None, "Can you speak English?"),
            card(n, "いくらですか", None, "How much is it?"),
            card(n, "どこですか", None, "Where is it?"),
            card(n, "トイレ", None, "Toilet"),
            card(n, "大丈夫ですか", None, "Are you okay?"),
            card(n, "助けて", None, "Help"),
            card(n, "病院", None, "Hospital"),
            card(n, "水", None, "Water"),
            card(n, "食べ物", None, "Food"),
            card(n, "駅", None, "Station"),
        ],
    )
}

fn at_the_airport() -> LessonContent {
    let n = 2;
    lesson(
        n,
        "At the airport",
        vec![
            card(n, "空港", Some("くうこう"), "Airport"),
            card(n, "パスポート", None, "Passport"),
            card(n, "搭乗券", Some("とうじょうけん"), "Boarding pass"),
            card(n, "荷物", Some("にもつ"), "Luggage"),
            card(n, "税関", Some("ぜいかん"), "Customs"),
            card(n, "両替", Some("りょうがえ"), "Currency exchange"),
            card(n, "出口", Some("でぐち"), "Exit"),
            card(n, "入口", Some("いりぐち"), "Entrance"),
            card(n, "飛行機", Some("ひこうき"), "Airplane"),
            card(n, "切符", Some("きっぷ"), "Ticket"),
        ],
    )
}

fn hiragana_3() -> LessonContent {
    let n = 3;
    lesson(
        n,
        "Hiragana 3",
        vec![
            // GA-row
            card(n, "が", None, "GA"),
            card(n, "ぎ", None, "GI"),
            card(n, "ぐ", None, "GU"),
            card(n, "げ", None, "GE"),
            card(n, "ご", None, "GO"),
            // ZA-row
            card(n, "ざ", None, "ZA"),
            card(n, "じ", None, "JI"),
            card(n, "ず", None, "ZU"),
            card(n, "ぜ", None, "ZE"),
            card(n, "ぞ", None, "ZO"),
            // DA-row
            card(n, "だ", None, "DA"),
            card(n, "ぢ", None, "JI (rare)"),
            card(n, "づ", None, "ZU (rare)"),
            card(n, "で", None, "DE"),
            card(n, "ど", None, "DO"),
            // BA-row
            card(n, "ば", None, "BA"),
            card(n, "び", None, "BI"),
            card(n, "ぶ", None, "BU"),
            card(n, "べ", None, "BE"),
            card(n, "ぼ", None, "BO"),
            // PA-row
            card(n, "ぱ", None, "PA"),
            card(n, "ぴ", None, "PI"),
            card(n, "ぷ", None, "PU"),
            card(n, "ぺ", None, "PE"),
            card(n, "ぽ", None, "PO"),
        ],
    )
}

fn hiragana_4() -> LessonContent {
    let n = 4;
    lesson(
        n,
        "Hiragana 4",
        vec![
            card(n, "きゃ", None, "KYA"),
            card(n, "きゅ", None, "KYU"),
            card(n, "きょ", None, "KYO"),
            card(n, "ぎゃ", None, "GYA"),
            card(n, "ぎゅ", None, "GYU"),
            card(n, "ぎょ", None, "GYO"),
            card(n, "しゃ", None, "SHA"),
            card(n, "しゅ", None, "SHU"),
            card(n, "しょ", None, "SHO"),
            card(n, "ちゃ", None, "CHA"),
            card(n, "ちゅ", None, "CHU"),
            card(n, "ちょ", None, "CHO"),
            card(n, "にゃ", None, "NYA"),
            card(n, "にゅ", None, "NYU"),
            card(n, "にょ", None, "NYO"),
            card(n, "ひゃ", None, "HYA"),
            card(n, "ひゅ", None, "HYU"),
            card(n, "ひょ", None, "HYO"),
            card(n, "みゃ", None, "MYA"),
            card(n, "みゅ", None, "MYU"),
            card(n, "みょ", None, "MYO"),
            card(n, "りゃ", None, "RYA"),
            card(n, "りゅ", None, "RYU"),
            card(n, "りょ", None, "RYO"),
            card(n, "びゃ", None, "BYA"),
            card(n, "びゅ", None, "BYU"),
            card(n, "びょ", None, "BYO"),
            card(n, "ぴゃ", None, "PYA"),
            card(n, "ぴゅ", None, "PYU"),
            card(n, "ぴょ", None, "PYO"),
        ],
    )
}

fn basic_greetings_quiz() -> QuizContent {
    let n = 1;
    QuizContent {
        id: quiz_id(n),
        lesson_number: n,
        title: "Basic Greetings Quiz".to_string(),
        origin: Origin::Builtin,
        questions: vec![
            question(
                n,
                "おはよう",
                Some("ohayou"),
                "Good morning",
                &["Good evening", "Good afternoon", "Hello"],
            ),
            question(
                n,
                "こんにちは",
                Some("konnichiwa"),
                "Good afternoon",
                &["Good morning", "Good night", "Goodbye"],
            ),
            question(
                n,
                "ありがとう",
                Some("arigatou"),
                "Thank you",
                &["Please", "Excuse me", "You're welcome"],
            ),
            question(
                n,
                "おやすみなさい",
                Some("oyasuminasai"),
                "Good night",
                &["Good morning", "Goodbye", "Welcome"],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_by_lesson_number() {
        let lessons = lessons();
        assert_eq!(lessons.len(), 4);
        let numbers: Vec<u32> = lessons.iter().map(|l| l.lesson_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(lessons.iter().all(|l| l.origin == Origin::Builtin));
    }

    #[test]
    fn catalog_quizzes_are_builtin() {
        let quizzes = quizzes();
        assert!(!quizzes.is_empty());
        assert!(quizzes.iter().all(|q| q.origin == Origin::Builtin));
    }

    #[test]
    fn survival_words_has_twenty_cards() {
        assert_eq!(lessons()[0].flashcards.len(), 20);
    }

    #[test]
    fn ids_are_stable_across_constructions() {
        let a = lessons();
        let b = lessons();
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].flashcards[17].id, b[0].flashcards[17].id);
        let (qa, qb) = (quizzes(), quizzes());
        assert_eq!(qa[0].id, qb[0].id);
        assert_eq!(qa[0].questions[1].id, qb[0].questions[1].id);
    }

    #[test]
    fn card_ids_are_unique() {
        let mut ids: Vec<Uuid> = lessons()
            .iter()
            .flat_map(|l| l.flashcards.iter().map(|c| c.id))
            .collect();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }
}
