pub mod state;
pub mod word;

pub use state::{next_streak, Language, Settings, StudyState, StudyStats};
pub use word::{WordRecord, WordStatus};
