//! Session-local view of the active words.
//!
//! The view is never persisted: it is rebuilt from the catalog whenever the
//! day changes and reshuffled on request. It also carries the keyboard
//! focus cursor used for arrow-key navigation.

use crate::config;
use crate::domain::WordRecord;

/// Arrow-key movement. Up and down jump a whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Left,
  Right,
  Up,
  Down,
}

impl Direction {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "left" | "h" => Some(Self::Left),
      "right" | "l" => Some(Self::Right),
      "up" | "k" => Some(Self::Up),
      "down" | "j" => Some(Self::Down),
      _ => None,
    }
  }

  fn offset(&self) -> i64 {
    let jump = config::GROUP_SIZE as i64;
    match self {
      Self::Left => -1,
      Self::Right => 1,
      Self::Up => -jump,
      Self::Down => jump,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct WordView<'c> {
  words: Vec<&'c WordRecord>,
  focus: Option<usize>,
}

impl<'c> WordView<'c> {
  pub fn new(words: Vec<&'c WordRecord>) -> Self {
    Self { words, focus: None }
  }

  pub fn words(&self) -> &[&'c WordRecord] {
    &self.words
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Replace the ordering, keeping the focus index where it is.
  pub fn reorder(&mut self, words: Vec<&'c WordRecord>) {
    self.words = words;
    if self.focus.is_some_and(|i| i >= self.words.len()) {
      self.focus = None;
    }
  }

  pub fn focus(&self) -> Option<usize> {
    self.focus
  }

  pub fn focused(&self) -> Option<&'c WordRecord> {
    self.focus.and_then(|i| self.words.get(i).copied())
  }

  /// Focus an index; out-of-range clears the focus.
  pub fn set_focus(&mut self, index: Option<usize>) {
    self.focus = index.filter(|&i| i < self.words.len());
  }

  /// Focus a word by id if it is in the view.
  pub fn focus_word(&mut self, id: &str) -> Option<usize> {
    let pos = self.words.iter().position(|w| w.id == id)?;
    self.focus = Some(pos);
    Some(pos)
  }

  /// Move the cursor, clamped to the list. With no focus the cursor starts
  /// just before the first word.
  pub fn move_focus(&mut self, direction: Direction) -> Option<usize> {
    if self.words.is_empty() {
      return None;
    }
    let max_index = self.words.len() as i64 - 1;
    let current = self.focus.map_or(-1, |i| i as i64);
    let next = (current + direction.offset()).clamp(0, max_index) as usize;
    self.focus = Some(next);
    self.focus
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::grouped_catalog;

  #[test]
  fn test_move_focus_from_nothing() {
    let catalog = grouped_catalog(3, 50);
    let mut view = WordView::new(catalog.words().iter().collect());

    assert_eq!(view.move_focus(Direction::Right), Some(0));

    let mut view = WordView::new(catalog.words().iter().collect());
    assert_eq!(view.move_focus(Direction::Left), Some(0));

    let mut view = WordView::new(catalog.words().iter().collect());
    assert_eq!(view.move_focus(Direction::Down), Some(49));
  }

  #[test]
  fn test_move_focus_jumps_a_group() {
    let catalog = grouped_catalog(3, 50);
    let mut view = WordView::new(catalog.words().iter().collect());
    view.set_focus(Some(10));

    assert_eq!(view.move_focus(Direction::Down), Some(60));
    assert_eq!(view.move_focus(Direction::Down), Some(110));
    assert_eq!(view.move_focus(Direction::Down), Some(149));
    assert_eq!(view.move_focus(Direction::Up), Some(99));
    assert_eq!(view.move_focus(Direction::Up), Some(49));
    assert_eq!(view.move_focus(Direction::Up), Some(0));
    assert_eq!(view.move_focus(Direction::Left), Some(0));
  }

  #[test]
  fn test_move_focus_empty_view() {
    let mut view = WordView::default();
    assert_eq!(view.move_focus(Direction::Right), None);
    assert!(view.focused().is_none());
  }

  #[test]
  fn test_set_focus_out_of_range_clears() {
    let catalog = grouped_catalog(1, 5);
    let mut view = WordView::new(catalog.words().iter().collect());
    view.set_focus(Some(2));
    assert_eq!(view.focused().map(|w| w.id.as_str()), Some(catalog.words()[2].id.as_str()));
    view.set_focus(Some(5));
    assert_eq!(view.focus(), None);
  }

  #[test]
  fn test_reorder_keeps_focus_index() {
    let catalog = grouped_catalog(1, 5);
    let mut view = WordView::new(catalog.words().iter().collect());
    view.set_focus(Some(3));
    let reversed: Vec<_> = catalog.words().iter().rev().collect();
    view.reorder(reversed);
    assert_eq!(view.focus(), Some(3));
    assert_eq!(view.focused().map(|w| w.id.as_str()), Some(catalog.words()[1].id.as_str()));
  }

  #[test]
  fn test_focus_word() {
    let catalog = grouped_catalog(1, 5);
    let mut view = WordView::new(catalog.words().iter().collect());
    let id = catalog.words()[4].id.clone();
    assert_eq!(view.focus_word(&id), Some(4));
    assert_eq!(view.focus_word("missing"), None);
    assert_eq!(view.focus(), Some(4));
  }

  #[test]
  fn test_direction_from_str() {
    assert_eq!(Direction::from_str("up"), Some(Direction::Up));
    assert_eq!(Direction::from_str("j"), Some(Direction::Down));
    assert_eq!(Direction::from_str("diagonal"), None);
  }
}
