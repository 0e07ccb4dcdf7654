//! Cumulative day progression.
//!
//! Day N reviews every group up to and including N. Advancing the day only
//! ever adds words; nothing already introduced drops out.

use std::collections::BTreeMap;

use crate::content::Catalog;
use crate::domain::{WordRecord, WordStatus};

/// Per-group counts for the stats panel and group headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
  pub group: u32,
  pub total: usize,
  pub known: usize,
  pub unknown: usize,
}

impl GroupStats {
  pub fn unset(&self) -> usize {
    self.total - self.known - self.unknown
  }
}

/// Words reviewable on `day`, in catalog order.
pub fn active_words(catalog: &Catalog, day: u32) -> Vec<&WordRecord> {
  catalog
    .words()
    .iter()
    .filter(|w| w.group_number <= day)
    .collect()
}

/// Words of exactly one group, in catalog order.
pub fn group_words(catalog: &Catalog, group: u32) -> Vec<&WordRecord> {
  catalog
    .words()
    .iter()
    .filter(|w| w.group_number == group)
    .collect()
}

/// Distinct group numbers, ascending.
pub fn group_numbers(catalog: &Catalog) -> Vec<u32> {
  let mut groups: Vec<u32> = catalog.words().iter().map(|w| w.group_number).collect();
  groups.sort_unstable();
  groups.dedup();
  groups
}

/// Status counts within one group, independent of the current day.
pub fn group_stats(
  catalog: &Catalog,
  statuses: &BTreeMap<String, WordStatus>,
  group: u32,
) -> GroupStats {
  let mut stats = GroupStats {
    group,
    total: 0,
    known: 0,
    unknown: 0,
  };

  for word in catalog.words().iter().filter(|w| w.group_number == group) {
    stats.total += 1;
    match statuses.get(&word.id) {
      Some(WordStatus::Known) => stats.known += 1,
      Some(WordStatus::Unknown) => stats.unknown += 1,
      _ => {}
    }
  }
  stats
}

pub fn all_group_stats(catalog: &Catalog, statuses: &BTreeMap<String, WordStatus>) -> Vec<GroupStats> {
  group_numbers(catalog)
    .into_iter()
    .map(|g| group_stats(catalog, statuses, g))
    .collect()
}

/// Clamp a requested day into `[1, max_day]`.
pub fn clamp_day(requested: i64, max_day: u32) -> u32 {
  let max_day = max_day.max(1);
  requested.clamp(1, i64::from(max_day)) as u32
}
