//! Learner profile: points, leveling, streaks and daily goals.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::{load_json, save_json, StorageBackend, KEY_USER};
use crate::types::LessonSummary;

/// Points needed to advance one level.
const POINTS_PER_LEVEL: u32 = 100;

/// How many recently accessed lessons the profile remembers.
const RECENT_LESSONS_CAP: usize = 5;

/// The per-day checklist. Replaced wholesale at day rollover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub lessons_completed: u32,
    pub practice_completed: bool,
    pub quiz_completed: bool,
    pub last_reset_date: NaiveDate,
}

impl DailyGoals {
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            lessons_completed: 0,
            practice_completed: false,
            quiz_completed: false,
            last_reset_date: today,
        }
    }
}

/// The learner's cumulative state.
///
/// `level` is always recomputed from `points`, never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub points: u32,
    pub level: u32,
    /// Opaque reference into the host's media store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Most-recent-first, at most [`RECENT_LESSONS_CAP`] entries.
    pub recent_lessons: Vec<LessonSummary>,
    pub streak: u32,
    pub last_login_date: NaiveDate,
    pub daily_goals: DailyGoals,
}

impl UserProfile {
    fn fresh(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            points: 0,
            level: 1,
            profile_image: None,
            recent_lessons: Vec::new(),
            streak: 0,
            // A day in the past, so the first session activation lands in
            // the consecutive-day branch and starts the streak at 1.
            last_login_date: today - Duration::days(1),
            daily_goals: DailyGoals::empty(today),
        }
    }

    /// Points still needed to reach the next level.
    pub fn points_to_next_level(&self) -> u32 {
        POINTS_PER_LEVEL - self.points % POINTS_PER_LEVEL
    }

    /// Progress through the current level, in `[0, 1)`.
    pub fn level_progress(&self) -> f64 {
        f64::from(self.points % POINTS_PER_LEVEL) / f64::from(POINTS_PER_LEVEL)
    }
}

/// Level derived from a point total.
pub fn level_for_points(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

/// Callback invoked with the new point total after every award.
pub type PointsObserver = Box<dyn Fn(u32) + Send + Sync>;

/// Owns the learner profile and the rules that mutate it.
///
/// Every mutating call writes the whole profile through to storage before
/// returning.
pub struct ProfileManager {
    profile: UserProfile,
    storage: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    points_observers: Vec<PointsObserver>,
}

impl ProfileManager {
    /// Deserializes the profile, falling back to a fresh one when the
    /// record is absent or malformed.
    pub fn load(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        let profile =
            load_json(storage.as_ref(), KEY_USER).unwrap_or_else(|| UserProfile::fresh(clock.today()));
        Self {
            profile,
            storage,
            clock,
            points_observers: Vec::new(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Registers a points-changed observer. Observers fire after the new
    /// total has been persisted.
    pub fn subscribe_points(&mut self, observer: PointsObserver) {
        self.points_observers.push(observer);
    }

    fn save(&self) {
        save_json(self.storage.as_ref(), KEY_USER, &self.profile);
    }

    pub fn update_name(&mut self, name: String) {
        self.profile.name = name;
        self.save();
    }

    pub fn update_profile_image(&mut self, image_ref: String) {
        self.profile.profile_image = Some(image_ref);
        self.save();
    }

    /// Awards points and recomputes the level.
    pub fn add_points(&mut self, points: u32) {
        self.profile.points += points;
        self.profile.level = level_for_points(self.profile.points);
        self.save();
        for observer in &self.points_observers {
            observer(self.profile.points);
        }
    }

    /// Prepends a lesson summary, dropping the oldest beyond the cap.
    pub fn add_lesson(&mut self, summary: LessonSummary) {
        self.profile.recent_lessons.insert(0, summary);
        self.profile.recent_lessons.truncate(RECENT_LESSONS_CAP);
        self.save();
    }

    /// Clears points, level and recent lessons. Streak and daily goals are
    /// deliberately untouched.
    pub fn reset_progress(&mut self) {
        self.profile.points = 0;
        self.profile.level = 1;
        self.profile.recent_lessons.clear();
        self.save();
    }

    /// Called once per session activation.
    ///
    /// A gap of two or more days resets the streak to 1, not 0: the streak
    /// always counts today.
    pub fn update_streak(&mut self) {
        let today = self.clock.today();
        let yesterday = today - Duration::days(1);

        if self.profile.last_login_date == yesterday {
            self.profile.streak += 1;
        } else if self.profile.last_login_date != today {
            self.profile.streak = 1;
        }

        self.profile.last_login_date = today;
        self.save();
    }

    /// Replaces the daily goals with the empty template at day rollover.
    /// Idempotent within the same day.
    pub fn reset_daily_goals_if_needed(&mut self) {
        let today = self.clock.today();
        if self.profile.daily_goals.last_reset_date != today {
            self.profile.daily_goals = DailyGoals::empty(today);
            self.save();
        }
    }

    /// Increments or sets only the goals passed as true.
    pub fn update_daily_goals(
        &mut self,
        lesson_completed: bool,
        practice_completed: bool,
        quiz_completed: bool,
    ) {
        if lesson_completed {
            self.profile.daily_goals.lessons_completed += 1;
        }
        if practice_completed {
            self.profile.daily_goals.practice_completed = true;
        }
        if quiz_completed {
            self.profile.daily_goals.quiz_completed = true;
        }
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    fn manager() -> (ProfileManager, Arc<MemoryStorage>, Arc<FixedClock>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 11, 19, 12, 0, 0).unwrap(),
        ));
        let manager = ProfileManager::load(storage.clone(), clock.clone());
        (manager, storage, clock)
    }

    fn summary(title: &str) -> LessonSummary {
        LessonSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Lesson 1".to_string(),
            progress: 0.0,
            last_accessed: Utc.with_ymd_and_hms(2024, 11, 19, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn fresh_profile_defaults() {
        let (manager, _, _) = manager();
        let profile = manager.profile();
        assert_eq!(profile.points, 0);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.streak, 0);
        assert_eq!(profile.daily_goals.lessons_completed, 0);
        assert!(profile.recent_lessons.is_empty());
    }

    #[test]
    fn level_is_derived_from_points() {
        let (mut manager, _, _) = manager();
        manager.add_points(250);
        assert_eq!(manager.profile().level, 3);
        assert_eq!(manager.profile().level_progress(), 0.5);
        assert_eq!(manager.profile().points_to_next_level(), 50);

        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(99), 1);
        assert_eq!(level_for_points(100), 2);
    }

    #[test]
    fn add_points_notifies_observers_with_new_total() {
        let (mut manager, _, _) = manager();
        let seen = Arc::new(AtomicU32::new(0));
        let seen_by_observer = seen.clone();
        manager.subscribe_points(Box::new(move |points| {
            seen_by_observer.store(points, Ordering::SeqCst);
        }));
        manager.add_points(7);
        manager.add_points(3);
        assert_eq!(seen.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn recent_lessons_keep_at_most_five_most_recent_first() {
        let (mut manager, _, _) = manager();
        for i in 0..6 {
            manager.add_lesson(summary(&format!("lesson {i}")));
        }
        let titles: Vec<&str> = manager
            .profile()
            .recent_lessons
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["lesson 5", "lesson 4", "lesson 3", "lesson 2", "lesson 1"]
        );
    }

    #[test]
    fn reset_progress_keeps_streak_and_goals() {
        let (mut manager, _, _) = manager();
        manager.add_points(120);
        manager.update_streak();
        manager.update_daily_goals(true, false, true);
        manager.reset_progress();

        let profile = manager.profile();
        assert_eq!(profile.points, 0);
        assert_eq!(profile.level, 1);
        assert!(profile.recent_lessons.is_empty());
        assert_eq!(profile.streak, 1);
        assert_eq!(profile.daily_goals.lessons_completed, 1);
        assert!(profile.daily_goals.quiz_completed);
    }

    #[test]
    fn first_session_starts_the_streak_at_one() {
        let (mut manager, _, _) = manager();
        assert_eq!(manager.profile().streak, 0);
        manager.update_streak();
        assert_eq!(manager.profile().streak, 1);
    }

    #[test]
    fn streak_increments_on_consecutive_days() {
        let (mut manager, _, clock) = manager();
        manager.update_streak();
        assert_eq!(manager.profile().streak, 1);

        clock.advance_days(1);
        manager.update_streak();
        assert_eq!(manager.profile().streak, 2);

        clock.advance_days(1);
        manager.update_streak();
        assert_eq!(manager.profile().streak, 3);
    }

    #[test]
    fn streak_is_idempotent_within_a_day() {
        let (mut manager, _, _) = manager();
        manager.update_streak();
        manager.update_streak();
        assert_eq!(manager.profile().streak, 1);
    }

    #[test]
    fn skipping_a_day_resets_streak_to_one() {
        let (mut manager, _, clock) = manager();
        manager.update_streak();
        clock.advance_days(1);
        manager.update_streak();
        assert_eq!(manager.profile().streak, 2);

        clock.advance_days(3);
        manager.update_streak();
        assert_eq!(manager.profile().streak, 1);
    }

    #[test]
    fn daily_goals_reset_at_day_rollover() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 11, 19, 23, 50, 0).unwrap(),
        ));
        let mut manager = ProfileManager::load(storage, clock.clone());

        manager.update_daily_goals(true, true, false);
        manager.reset_daily_goals_if_needed();
        // Same day: nothing changes.
        assert_eq!(manager.profile().daily_goals.lessons_completed, 1);
        assert!(manager.profile().daily_goals.practice_completed);

        // Cross midnight.
        clock.set(Utc.with_ymd_and_hms(2024, 11, 20, 0, 10, 0).unwrap());
        manager.reset_daily_goals_if_needed();
        let goals = &manager.profile().daily_goals;
        assert_eq!(goals.lessons_completed, 0);
        assert!(!goals.practice_completed);
        assert!(!goals.quiz_completed);
        assert_eq!(goals.last_reset_date, clock.today());

        // Idempotent within the new day.
        manager.reset_daily_goals_if_needed();
        assert_eq!(manager.profile().daily_goals.last_reset_date, clock.today());
    }

    #[test]
    fn profile_round_trips_through_storage() {
        let (mut manager, storage, clock) = manager();
        manager.update_name("Daniel".to_string());
        manager.update_profile_image("avatar-1".to_string());
        manager.add_points(42);
        manager.add_lesson(summary("Japanese Survival Words"));

        let reloaded = ProfileManager::load(storage, clock);
        assert_eq!(reloaded.profile(), manager.profile());
    }

    #[test]
    fn malformed_profile_record_falls_back_to_fresh() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(KEY_USER, b"{ definitely not a profile");
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 11, 19, 12, 0, 0).unwrap(),
        ));
        let manager = ProfileManager::load(storage, clock);
        assert_eq!(manager.profile().points, 0);
        assert_eq!(manager.profile().level, 1);
    }
}
