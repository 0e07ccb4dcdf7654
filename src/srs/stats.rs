//! Progress statistics derived from the study state

use crate::config;
use crate::content::Catalog;
use crate::domain::{StudyState, StudyStats, WordRecord, WordStatus};

/// Catalog-wide totals for the stats panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverallStats {
  pub total: usize,
  pub known: usize,
  pub unknown: usize,
}

impl OverallStats {
  pub fn reviewed(&self) -> usize {
    self.known + self.unknown
  }

  pub fn known_rate(&self) -> f64 {
    if self.total > 0 {
      self.known as f64 / self.total as f64
    } else {
      0.0
    }
  }
}

pub fn overall_stats(catalog: &Catalog, state: &StudyState) -> OverallStats {
  OverallStats {
    total: catalog.len(),
    known: state.known_count() as usize,
    unknown: state.unknown_count() as usize,
  }
}

/// Words marked unknown most often, highest count first. Ties keep id order;
/// ids no longer in the catalog are skipped.
pub fn hardest_words<'c>(catalog: &'c Catalog, state: &StudyState, limit: usize) -> Vec<(&'c WordRecord, u32)> {
  let mut counts: Vec<(&String, &u32)> = state.red_counts.iter().collect();
  counts.sort_by(|a, b| b.1.cmp(a.1));

  counts
    .into_iter()
    .take(limit)
    .filter_map(|(id, &count)| catalog.get(id).map(|w| (w, count)))
    .collect()
}

/// The most recent `days` history rows, oldest first.
pub fn recent_history(state: &StudyState, days: usize) -> &[StudyStats] {
  let len = state.study_history.len();
  &state.study_history[len.saturating_sub(days)..]
}

/// One export line per word currently marked unknown, in catalog order.
pub fn unknown_word_lines(catalog: &Catalog, state: &StudyState) -> Vec<String> {
  catalog
    .words()
    .iter()
    .filter(|w| state.status_of(&w.id) == WordStatus::Unknown)
    .map(|w| format!("{} {} ({}) - {}", w.word, w.ipa, w.part_of_speech, w.chinese))
    .collect()
}

/// Rounded percentage, `"0%"` when there is nothing to divide by.
pub fn format_percent(value: usize, total: usize) -> String {
  if total == 0 {
    return "0%".to_string();
  }
  format!("{}%", ((value as f64 / total as f64) * 100.0).round() as u64)
}

pub fn default_hardest_words<'c>(catalog: &'c Catalog, state: &StudyState) -> Vec<(&'c WordRecord, u32)> {
  hardest_words(catalog, state, config::HARDEST_WORDS_LIMIT)
}
