//! The study state store: single owner of learner progress.
//!
//! Every mutation goes through a method here and is immediately written to
//! storage as one blob. Writes that fail are logged and dropped; the
//! in-memory state stays authoritative for the rest of the session.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::cell::Cell;

use crate::config;
use crate::content::Catalog;
use crate::db::{LogOnError, Storage, StorageError};
use crate::domain::{Language, StudyState, WordRecord, WordStatus};
use crate::session::WordView;
use crate::srs::{self, GroupStats, Ordering};

/// Source of "today" for streaks and history rows.
pub trait Clock {
  fn today(&self) -> NaiveDate;
}

/// UTC calendar date of the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate {
    Utc::now().date_naive()
  }
}

/// A clock pinned to a date that tests can move forward.
#[derive(Debug, Clone)]
pub struct FixedClock {
  date: Cell<NaiveDate>,
}

impl FixedClock {
  pub fn new(date: NaiveDate) -> Self {
    Self { date: Cell::new(date) }
  }

  pub fn set(&self, date: NaiveDate) {
    self.date.set(date);
  }
}

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    self.date.get()
  }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn today(&self) -> NaiveDate {
    (**self).today()
  }
}

pub struct StudyStore<'c, S: Storage> {
  catalog: &'c Catalog,
  storage: S,
  clock: Box<dyn Clock + 'c>,
  key: String,
  state: StudyState,
  view: WordView<'c>,
}

impl<'c, S: Storage> StudyStore<'c, S> {
  /// Start a session: load saved state (or defaults), clamp the day to the
  /// catalog, apply the streak rule and persist the result.
  pub fn open(catalog: &'c Catalog, storage: S, clock: impl Clock + 'c) -> Self {
    Self::open_with_key(catalog, storage, clock, config::STORAGE_KEY)
  }

  pub fn open_with_key(catalog: &'c Catalog, storage: S, clock: impl Clock + 'c, key: &str) -> Self {
    let mut state = match storage.load(key).log_warn_default("Failed to load study state") {
      Some(blob) => StudyState::from_json_lenient(&blob),
      None => {
        tracing::info!("No saved study state, starting fresh");
        StudyState::default()
      }
    };
    state.current_day = srs::clamp_day(i64::from(state.current_day), catalog.max_day());

    let mut store = Self {
      catalog,
      storage,
      clock: Box::new(clock),
      key: key.to_string(),
      state,
      view: WordView::default(),
    };
    store.rebuild_view();

    let today = store.clock.today();
    if store.state.touch_streak(today) {
      tracing::debug!("Study streak is now {} day(s)", store.state.streak);
    }
    store.persist();
    store
  }

  pub fn state(&self) -> &StudyState {
    &self.state
  }

  pub fn catalog(&self) -> &'c Catalog {
    self.catalog
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  pub fn into_storage(self) -> S {
    self.storage
  }

  pub fn view(&self) -> &WordView<'c> {
    &self.view
  }

  pub fn view_mut(&mut self) -> &mut WordView<'c> {
    &mut self.view
  }

  pub fn max_day(&self) -> u32 {
    self.catalog.max_day()
  }

  /// Words in the current ordering of the active list.
  pub fn active_words(&self) -> &[&'c WordRecord] {
    self.view.words()
  }

  pub fn status_of(&self, id: &str) -> WordStatus {
    self.state.status_of(id)
  }

  /// Change the review day; out-of-range requests are clamped. Resets the
  /// active list to catalog order.
  pub fn set_day(&mut self, requested: i64) -> u32 {
    let day = srs::clamp_day(requested, self.catalog.max_day());
    if day != self.state.current_day {
      self.state.current_day = day;
      self.persist();
    }
    self.rebuild_view();
    day
  }

  /// Record a learner judgment. Ids not in the catalog are ignored.
  pub fn set_word_status(&mut self, id: &str, status: WordStatus) {
    if !self.catalog.contains(id) {
      tracing::debug!("Ignoring status change for unknown word id '{}'", id);
      return;
    }

    self.state.apply_status(id, status);
    let today = self.clock.today();
    self.state.record_history(today);
    self.persist();
  }

  /// Forget every status. Red counts and history are left alone.
  pub fn clear_all_statuses(&mut self) {
    self.state.word_statuses.clear();
    self.persist();
  }

  /// Forget the statuses of one group.
  pub fn clear_group_statuses(&mut self, group: u32) {
    let catalog = self.catalog;
    self.state.word_statuses.retain(|id, _| {
      catalog
        .get(id)
        .is_none_or(|w| w.group_number != group)
    });
    self.persist();
  }

  /// Restore defaults for everything except settings.
  pub fn reset_all(&mut self) {
    self.state.reset_keep_settings();
    self.persist();
    self.rebuild_view();
  }

  pub fn set_language(&mut self, language: Language) {
    self.state.settings.language = language;
    self.persist();
  }

  /// Non-finite rates are ignored.
  pub fn set_tts_speed(&mut self, rate: f32) {
    if !rate.is_finite() {
      tracing::debug!("Ignoring speech rate {}", rate);
      return;
    }
    self.state.settings.tts_speed = rate.clamp(config::TTS_MIN_RATE, config::TTS_MAX_RATE);
    self.persist();
  }

  pub fn mark_instructions_seen(&mut self) {
    if !self.state.has_seen_instructions {
      self.state.has_seen_instructions = true;
      self.persist();
    }
  }

  pub fn group_stats(&self, group: u32) -> GroupStats {
    srs::group_stats(self.catalog, &self.state.word_statuses, group)
  }

  pub fn all_group_stats(&self) -> Vec<GroupStats> {
    srs::all_group_stats(self.catalog, &self.state.word_statuses)
  }

  pub fn resolve(&self, token: &str) -> Option<&'c WordRecord> {
    self.catalog.resolve(token)
  }

  pub fn apply_ordering(&mut self, ordering: Ordering) {
    self.apply_ordering_with(ordering, &mut rand::rng());
  }

  /// Reorder the active list. Statuses are read, never written.
  pub fn apply_ordering_with<R: Rng + ?Sized>(&mut self, ordering: Ordering, rng: &mut R) {
    let catalog_order = srs::active_words(self.catalog, self.state.current_day);
    let reordered = srs::apply_ordering_with(
      ordering,
      self.view.words(),
      &catalog_order,
      &self.state.word_statuses,
      rng,
    );
    self.view.reorder(reordered);
  }

  fn rebuild_view(&mut self) {
    self.view = WordView::new(srs::active_words(self.catalog, self.state.current_day));
  }

  /// Write the whole state. Failures are logged and swallowed.
  fn persist(&mut self) {
    let _ = self.try_persist().log_warn("Failed to save study state");
  }

  fn try_persist(&mut self) -> Result<(), StorageError> {
    let blob = self.state.to_json()?;
    self.storage.save(&self.key, &blob)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::MemoryStorage;
  use crate::testing::{date, grouped_catalog, sample_catalog, FailingStorage};
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn open<'c>(catalog: &'c Catalog, storage: MemoryStorage, today: &str) -> StudyStore<'c, MemoryStorage> {
    StudyStore::open(catalog, storage, FixedClock::new(date(today)))
  }

  fn saved_state(store: &StudyStore<'_, MemoryStorage>) -> StudyState {
    let blob = store.storage().get(config::STORAGE_KEY).expect("state was saved");
    StudyState::from_json_lenient(blob)
  }

  #[test]
  fn test_first_run_defaults_and_streak() {
    let catalog = sample_catalog();
    let store = open(&catalog, MemoryStorage::new(), "2024-01-01");

    assert_eq!(store.state().current_day, 1);
    assert_eq!(store.state().streak, 1);
    assert_eq!(store.state().last_study_date, Some(date("2024-01-01")));
    assert_eq!(saved_state(&store), *store.state());
  }

  #[test]
  fn test_streak_across_sessions() {
    let catalog = sample_catalog();
    let store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    let store = open(&catalog, store.into_storage(), "2024-01-02");
    assert_eq!(store.state().streak, 2);

    let store = open(&catalog, store.into_storage(), "2024-01-02");
    assert_eq!(store.state().streak, 2);

    let store = open(&catalog, store.into_storage(), "2024-01-05");
    assert_eq!(store.state().streak, 1);
    assert_eq!(store.state().last_study_date, Some(date("2024-01-05")));
  }

  #[test]
  fn test_set_day_clamps() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");

    assert_eq!(store.set_day(0), 1);
    assert_eq!(store.state().current_day, 1);

    let max = store.max_day();
    assert_eq!(store.set_day(i64::from(max) + 100), max);
    assert_eq!(store.state().current_day, max);
    assert_eq!(saved_state(&store).current_day, max);
  }

  #[test]
  fn test_saved_day_beyond_catalog_is_clamped_on_load() {
    let catalog = sample_catalog();
    let storage = MemoryStorage::with_blob(config::STORAGE_KEY, r#"{"currentDay": 400}"#);
    let store = open(&catalog, storage, "2024-01-01");
    assert_eq!(store.state().current_day, catalog.max_day());
  }

  #[test]
  fn test_set_day_resets_view_to_catalog_order() {
    let catalog = grouped_catalog(3, 10);
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_day(3);
    store.apply_ordering_with(Ordering::ShuffleAll, &mut StdRng::seed_from_u64(5));
    store.view_mut().set_focus(Some(4));

    store.set_day(2);
    let expected: Vec<_> = catalog.words().iter().take(20).collect();
    assert_eq!(store.active_words(), expected.as_slice());
    assert_eq!(store.view().focus(), None);
  }

  #[test]
  fn test_red_count_counts_every_unknown_mark() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");

    store.set_word_status("w1", WordStatus::Unknown);
    store.set_word_status("w1", WordStatus::Unknown);
    store.set_word_status("w1", WordStatus::Known);
    store.set_word_status("w1", WordStatus::Unset);

    let mut store = open(&catalog, store.into_storage(), "2024-01-02");
    store.set_word_status("w1", WordStatus::Unknown);

    assert_eq!(store.state().red_count("w1"), 3);
    assert_eq!(store.status_of("w1"), WordStatus::Unknown);
  }

  #[test]
  fn test_unknown_id_is_noop() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    let writes = store.storage().writes;

    store.set_word_status("nope", WordStatus::Unknown);
    assert!(store.state().word_statuses.is_empty());
    assert!(store.state().red_counts.is_empty());
    assert!(store.state().study_history.is_empty());
    assert_eq!(store.storage().writes, writes);
  }

  #[test]
  fn test_every_mutation_is_persisted() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");

    store.set_word_status("w2", WordStatus::Known);
    assert_eq!(saved_state(&store).status_of("w2"), WordStatus::Known);

    store.set_language(Language::En);
    assert_eq!(saved_state(&store).settings.language, Language::En);

    store.mark_instructions_seen();
    assert!(saved_state(&store).has_seen_instructions);

    store.clear_all_statuses();
    assert!(saved_state(&store).word_statuses.is_empty());
  }

  #[test]
  fn test_history_tracks_global_counts_per_day() {
    let catalog = sample_catalog();
    let clock = FixedClock::new(date("2024-01-01"));
    let mut store = StudyStore::open(&catalog, MemoryStorage::new(), &clock);

    store.set_word_status("w1", WordStatus::Known);
    store.set_word_status("w2", WordStatus::Unknown);
    clock.set(date("2024-01-02"));
    store.set_word_status("w3", WordStatus::Known);

    let history = &store.state().study_history;
    assert_eq!(history.len(), 2);
    assert_eq!((history[0].known_count, history[0].unknown_count, history[0].total_reviewed), (1, 1, 2));
    assert_eq!((history[1].known_count, history[1].unknown_count, history[1].total_reviewed), (2, 1, 3));
  }

  #[test]
  fn test_clear_all_keeps_red_counts_and_history() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_word_status("w1", WordStatus::Unknown);
    store.set_word_status("w3", WordStatus::Known);
    store.set_word_status("w4", WordStatus::Unknown);
    let red_before = store.state().red_counts.clone();
    let history_before = store.state().study_history.clone();

    store.clear_all_statuses();

    for stats in store.all_group_stats() {
      assert_eq!((stats.known, stats.unknown), (0, 0), "group {}", stats.group);
    }
    assert_eq!(store.state().red_counts, red_before);
    assert_eq!(store.state().study_history, history_before);
  }

  #[test]
  fn test_clear_group_statuses_only_touches_that_group() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_word_status("w1", WordStatus::Known);
    store.set_word_status("w3", WordStatus::Unknown);
    store.set_word_status("w4", WordStatus::Known);

    store.clear_group_statuses(2);

    assert_eq!(store.status_of("w1"), WordStatus::Known);
    assert_eq!(store.status_of("w3"), WordStatus::Unset);
    assert_eq!(store.status_of("w4"), WordStatus::Unset);
    assert_eq!(store.state().red_count("w3"), 1);
  }

  #[test]
  fn test_reset_all_keeps_settings() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_language(Language::En);
    store.set_day(3);
    store.set_word_status("w1", WordStatus::Unknown);

    store.reset_all();

    assert_eq!(store.state().settings.language, Language::En);
    assert_eq!(store.state().current_day, 1);
    assert!(store.state().red_counts.is_empty());
    assert_eq!(store.state().streak, 0);
    assert_eq!(store.active_words().len(), 2);
    assert_eq!(saved_state(&store), *store.state());
  }

  #[test]
  fn test_write_failure_keeps_memory_state() {
    let catalog = sample_catalog();
    let mut store = StudyStore::open(&catalog, FailingStorage, FixedClock::new(date("2024-01-01")));

    store.set_word_status("w1", WordStatus::Unknown);
    store.set_day(2);

    assert_eq!(store.status_of("w1"), WordStatus::Unknown);
    assert_eq!(store.state().red_count("w1"), 1);
    assert_eq!(store.state().current_day, 2);
  }

  #[test]
  fn test_malformed_saved_state_recovers() {
    let catalog = sample_catalog();
    let storage = MemoryStorage::with_blob(config::STORAGE_KEY, "definitely not json");
    let store = open(&catalog, storage, "2024-01-01");
    assert_eq!(store.state().current_day, 1);
    assert_eq!(store.state().streak, 1);
  }

  #[test]
  fn test_sort_by_color_does_not_touch_statuses() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_day(2);
    store.set_word_status("w3", WordStatus::Known);
    store.set_word_status("w1", WordStatus::Unknown);
    let before = store.state().clone();

    store.apply_ordering(Ordering::SortByColor);

    let order: Vec<_> = store.active_words().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(order, vec!["w3", "w1", "w2", "w4"]);
    assert_eq!(*store.state(), before);
  }

  #[test]
  fn test_ordering_back_to_catalog() {
    let catalog = grouped_catalog(2, 10);
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_day(2);
    store.apply_ordering_with(Ordering::ShuffleWithinGroups, &mut StdRng::seed_from_u64(9));
    store.apply_ordering(Ordering::Catalog);

    let expected: Vec<_> = catalog.words().iter().collect();
    assert_eq!(store.active_words(), expected.as_slice());
  }

  #[test]
  fn test_tts_speed_is_clamped() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_tts_speed(9.0);
    assert!((store.state().settings.tts_speed - config::TTS_MAX_RATE).abs() < f32::EPSILON);
    store.set_tts_speed(0.7);
    assert!((store.state().settings.tts_speed - 0.7).abs() < f32::EPSILON);
  }

  #[test]
  fn test_non_finite_tts_speed_keeps_settings() {
    let catalog = sample_catalog();
    let mut store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    store.set_language(Language::En);
    store.set_tts_speed(0.5);
    store.set_tts_speed("NaN".parse().unwrap());
    store.set_tts_speed(f32::INFINITY);
    assert!((store.state().settings.tts_speed - 0.5).abs() < f32::EPSILON);

    let store = open(&catalog, store.into_storage(), "2024-01-01");
    assert_eq!(store.state().settings.language, Language::En);
    assert!((store.state().settings.tts_speed - 0.5).abs() < f32::EPSILON);
  }

  #[test]
  fn test_saturated_streak_does_not_overflow() {
    let catalog = sample_catalog();
    let storage = MemoryStorage::with_blob(
      config::STORAGE_KEY,
      r#"{"lastStudyDate":"2024-01-01","streak":4294967295}"#,
    );
    let store = open(&catalog, storage, "2024-01-02");
    assert_eq!(store.state().streak, u32::MAX);
    assert_eq!(store.state().last_study_date, Some(date("2024-01-02")));
  }

  #[test]
  fn test_load_failure_starts_fresh() {
    let catalog = sample_catalog();
    let store = StudyStore::open(&catalog, FailingStorage, FixedClock::new(date("2024-01-01")));
    assert_eq!(store.state().current_day, 1);
    assert_eq!(store.state().streak, 1);
    assert!(store.state().word_statuses.is_empty());
  }

  #[test]
  fn test_resolve_through_store() {
    let catalog = sample_catalog();
    let store = open(&catalog, MemoryStorage::new(), "2024-01-01");
    assert_eq!(store.resolve("students").map(|w| w.id.as_str()), Some("w2"));
    assert!(store.resolve("xyzzynotaword").is_none());
  }
}
