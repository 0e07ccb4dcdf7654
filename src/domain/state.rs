//! Persisted learner progress.
//!
//! The JSON shape (camelCase keys, `"green"`/`"red"` statuses, empty string
//! for a missing study date) is kept compatible with blobs saved by earlier
//! versions of the app. Loading is field-by-field: anything missing or
//! malformed falls back to its default without discarding the rest.

use chrono::{Days, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::word::WordStatus;

/// Display language. Has no effect on stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Cn,
  En,
}

impl Language {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "cn" | "zh" => Some(Self::Cn),
      "en" => Some(Self::En),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cn => "cn",
      Self::En => "en",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
  pub language: Language,
  pub tts_speed: f32,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      language: Language::Cn,
      tts_speed: 1.0,
    }
  }
}

/// One row of the daily audit log. Counts are global snapshots taken at the
/// last status change of that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
  pub date: NaiveDate,
  #[serde(rename = "greenCount")]
  pub known_count: u32,
  #[serde(rename = "redCount")]
  pub unknown_count: u32,
  pub total_reviewed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyState {
  pub current_day: u32,
  #[serde(with = "status_map")]
  pub word_statuses: BTreeMap<String, WordStatus>,
  pub red_counts: BTreeMap<String, u32>,
  #[serde(with = "date_or_empty")]
  pub last_study_date: Option<NaiveDate>,
  pub streak: u32,
  pub settings: Settings,
  pub study_history: Vec<StudyStats>,
  pub has_seen_instructions: bool,
}

impl Default for StudyState {
  fn default() -> Self {
    Self {
      current_day: 1,
      word_statuses: BTreeMap::new(),
      red_counts: BTreeMap::new(),
      last_study_date: None,
      streak: 0,
      settings: Settings::default(),
      study_history: Vec::new(),
      has_seen_instructions: false,
    }
  }
}

impl StudyState {
  /// Parse a saved blob, defaulting every top-level field that is absent or
  /// fails to parse. A blob that is not a JSON object yields full defaults.
  pub fn from_json_lenient(blob: &str) -> Self {
    let value: Value = match serde_json::from_str(blob) {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("Saved study state is not valid JSON, using defaults: {}", e);
        return Self::default();
      }
    };

    let Some(obj) = value.as_object() else {
      tracing::warn!("Saved study state is not an object, using defaults");
      return Self::default();
    };

    let mut state = Self::default();
    merge_field(obj, "currentDay", &mut state.current_day, parse);
    merge_field(obj, "wordStatuses", &mut state.word_statuses, |v| status_map::deserialize(v));
    merge_field(obj, "redCounts", &mut state.red_counts, parse);
    merge_field(obj, "lastStudyDate", &mut state.last_study_date, |v| {
      date_or_empty::deserialize(v)
    });
    merge_field(obj, "streak", &mut state.streak, parse);
    merge_field(obj, "settings", &mut state.settings, parse);
    merge_field(obj, "studyHistory", &mut state.study_history, parse);
    merge_field(obj, "hasSeenInstructions", &mut state.has_seen_instructions, parse);
    state
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }

  pub fn status_of(&self, id: &str) -> WordStatus {
    self.word_statuses.get(id).copied().unwrap_or(WordStatus::Unset)
  }

  pub fn red_count(&self, id: &str) -> u32 {
    self.red_counts.get(id).copied().unwrap_or(0)
  }

  pub fn known_count(&self) -> u32 {
    self.count_status(WordStatus::Known)
  }

  pub fn unknown_count(&self) -> u32 {
    self.count_status(WordStatus::Unknown)
  }

  fn count_status(&self, status: WordStatus) -> u32 {
    self.word_statuses.values().filter(|s| **s == status).count() as u32
  }

  /// Store or clear a status. Marking unknown always bumps the red counter,
  /// even when the word was already unknown.
  pub fn apply_status(&mut self, id: &str, status: WordStatus) {
    match status {
      WordStatus::Unset => {
        self.word_statuses.remove(id);
      }
      WordStatus::Known => {
        self.word_statuses.insert(id.to_string(), WordStatus::Known);
      }
      WordStatus::Unknown => {
        self.word_statuses.insert(id.to_string(), WordStatus::Unknown);
        *self.red_counts.entry(id.to_string()).or_insert(0) += 1;
      }
    }
  }

  /// Upsert the history row for `today` with the current global counts.
  pub fn record_history(&mut self, today: NaiveDate) {
    let known = self.known_count();
    let unknown = self.unknown_count();

    let pos = self.study_history.partition_point(|h| h.date < today);
    match self.study_history.get_mut(pos) {
      Some(entry) if entry.date == today => {
        entry.known_count = known;
        entry.unknown_count = unknown;
        entry.total_reviewed = known + unknown;
      }
      _ => self.study_history.insert(
        pos,
        StudyStats {
          date: today,
          known_count: known,
          unknown_count: unknown,
          total_reviewed: known + unknown,
        },
      ),
    }
  }

  /// Apply the consecutive-day rule. Returns false when `today` is already
  /// the last study date and nothing changed.
  pub fn touch_streak(&mut self, today: NaiveDate) -> bool {
    if self.last_study_date == Some(today) {
      return false;
    }
    self.streak = next_streak(self.last_study_date, self.streak, today);
    self.last_study_date = Some(today);
    true
  }

  /// Restore defaults, keeping only the learner's settings.
  pub fn reset_keep_settings(&mut self) {
    let settings = std::mem::take(&mut self.settings);
    *self = Self {
      settings,
      ..Self::default()
    };
  }
}

/// Streak after a session start on `today`.
pub fn next_streak(last: Option<NaiveDate>, streak: u32, today: NaiveDate) -> u32 {
  match last {
    Some(last) if last == today => streak,
    Some(last) if last.checked_add_days(Days::new(1)) == Some(today) => streak.saturating_add(1),
    _ => 1,
  }
}

fn parse<T: DeserializeOwned>(v: &Value) -> Result<T, serde_json::Error> {
  T::deserialize(v)
}

fn merge_field<T>(
  obj: &Map<String, Value>,
  key: &str,
  slot: &mut T,
  parse: impl FnOnce(&Value) -> Result<T, serde_json::Error>,
) {
  let Some(raw) = obj.get(key) else {
    return;
  };
  match parse(raw) {
    Ok(v) => *slot = v,
    Err(e) => tracing::warn!("Ignoring malformed saved field '{}': {}", key, e),
  }
}

/// Status map where `null` and `"unset"` values mean "no entry".
mod status_map {
  use super::WordStatus;
  use serde::{Deserialize, Deserializer, Serialize, Serializer};
  use std::collections::BTreeMap;

  pub fn serialize<S: Serializer>(
    map: &BTreeMap<String, WordStatus>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    map.serialize(serializer)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<BTreeMap<String, WordStatus>, D::Error> {
    let raw = BTreeMap::<String, Option<WordStatus>>::deserialize(deserializer)?;
    Ok(
      raw
        .into_iter()
        .filter_map(|(id, status)| match status {
          Some(WordStatus::Unset) | None => None,
          Some(s) => Some((id, s)),
        })
        .collect(),
    )
  }
}

/// `YYYY-MM-DD`, with the empty string standing for "never".
mod date_or_empty {
  use chrono::NaiveDate;
  use serde::{de, Deserialize, Deserializer, Serializer};

  const FORMAT: &str = "%Y-%m-%d";

  pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
      Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
      None => serializer.serialize_str(""),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
      None | Some("") => Ok(None),
      Some(s) => NaiveDate::parse_from_str(s, FORMAT).map(Some).map_err(de::Error::custom),
    }
  }
}
