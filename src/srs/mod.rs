pub mod ordering;
pub mod progression;
pub mod stats;

pub use ordering::{
  apply_ordering_with, shuffle_all, shuffle_all_with, shuffle_within_groups, shuffle_within_groups_with,
  sort_by_color, Ordering,
};
pub use progression::{active_words, all_group_stats, clamp_day, group_numbers, group_stats, group_words, GroupStats};
pub use stats::{format_percent, default_hardest_words, hardest_words, overall_stats, recent_history, unknown_word_lines, OverallStats};
