//! Reorderings of the active word list.
//!
//! All transforms return a new list and leave statuses alone. The `_with`
//! variants take the random source so tests can seed it.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::domain::{WordRecord, WordStatus};

/// How the presentation layer wants the active list ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
  /// Catalog order (what a day change resets to)
  Catalog,
  ShuffleAll,
  ShuffleWithinGroups,
  /// Known first, then unknown, then unset
  SortByColor,
}

impl Ordering {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "catalog" | "order" => Some(Self::Catalog),
      "shuffle" | "shuffle-all" => Some(Self::ShuffleAll),
      "shuffle-groups" | "shuffle-within" => Some(Self::ShuffleWithinGroups),
      "sort" | "color" => Some(Self::SortByColor),
      _ => None,
    }
  }
}

pub fn shuffle_all<'a>(list: &[&'a WordRecord]) -> Vec<&'a WordRecord> {
  shuffle_all_with(list, &mut rand::rng())
}

/// Uniform permutation of the whole list, ignoring groups.
pub fn shuffle_all_with<'a, R: Rng + ?Sized>(list: &[&'a WordRecord], rng: &mut R) -> Vec<&'a WordRecord> {
  let mut shuffled = list.to_vec();
  shuffled.shuffle(rng);
  shuffled
}

pub fn shuffle_within_groups<'a>(list: &[&'a WordRecord]) -> Vec<&'a WordRecord> {
  shuffle_within_groups_with(list, &mut rand::rng())
}

/// Shuffle each group independently and lay the groups out in ascending
/// group order. No word leaves its group's block.
pub fn shuffle_within_groups_with<'a, R: Rng + ?Sized>(
  list: &[&'a WordRecord],
  rng: &mut R,
) -> Vec<&'a WordRecord> {
  let mut groups: BTreeMap<u32, Vec<&'a WordRecord>> = BTreeMap::new();
  for word in list {
    groups.entry(word.group_number).or_default().push(*word);
  }

  let mut result = Vec::with_capacity(list.len());
  for (_, mut members) in groups {
    members.shuffle(rng);
    result.extend(members);
  }
  result
}

/// Stable three-way partition: known, unknown, unset.
pub fn sort_by_color<'a>(
  list: &[&'a WordRecord],
  statuses: &BTreeMap<String, WordStatus>,
) -> Vec<&'a WordRecord> {
  let mut known = Vec::new();
  let mut unknown = Vec::new();
  let mut unset = Vec::new();

  for word in list {
    match statuses.get(&word.id) {
      Some(WordStatus::Known) => known.push(*word),
      Some(WordStatus::Unknown) => unknown.push(*word),
      _ => unset.push(*word),
    }
  }

  known.extend(unknown);
  known.extend(unset);
  known
}

/// Apply an ordering to `list`. `Catalog` returns `catalog_order` unchanged.
pub fn apply_ordering_with<'a, R: Rng + ?Sized>(
  ordering: Ordering,
  list: &[&'a WordRecord],
  catalog_order: &[&'a WordRecord],
  statuses: &BTreeMap<String, WordStatus>,
  rng: &mut R,
) -> Vec<&'a WordRecord> {
  match ordering {
    Ordering::Catalog => catalog_order.to_vec(),
    Ordering::ShuffleAll => shuffle_all_with(list, rng),
    Ordering::ShuffleWithinGroups => shuffle_within_groups_with(list, rng),
    Ordering::SortByColor => sort_by_color(list, statuses),
  }
}
