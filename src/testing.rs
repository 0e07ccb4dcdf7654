//! Test fixtures shared across modules.
//!
//! Provides small catalogs with known group layouts, date helpers and a
//! storage backend that always fails.

use chrono::NaiveDate;

use crate::content::Catalog;
use crate::db::{Storage, StorageError};
use crate::domain::WordRecord;

/// A word whose `day` equals its group, with placeholder display fields.
pub fn word(id: &str, text: &str, group: u32) -> WordRecord {
    WordRecord {
        id: id.to_string(),
        word: text.to_string(),
        chinese: String::new(),
        ipa: format!("/{text}/"),
        part_of_speech: "n.".to_string(),
        example_sentence: String::new(),
        synonyms: Vec::new(),
        day: group,
        group_number: group,
    }
}

/// Six words over three groups:
///
/// | id | word    | group |
/// |----|---------|-------|
/// | w1 | apple   | 1     |
/// | w2 | student | 1     |
/// | w3 | study   | 2     |
/// | w4 | abandon | 2     |
/// | w5 | hope    | 3     |
/// | w6 | run     | 3     |
pub fn sample_catalog() -> Catalog {
    let entries = [
        ("w1", "apple", "苹果", 1),
        ("w2", "student", "学生", 1),
        ("w3", "study", "学习", 2),
        ("w4", "abandon", "放弃", 2),
        ("w5", "hope", "希望", 3),
        ("w6", "run", "跑", 3),
    ];

    let words = entries
        .into_iter()
        .map(|(id, text, chinese, group)| {
            let mut record = word(id, text, group);
            record.chinese = chinese.to_string();
            record.example_sentence = format!("An example with {text} in it.");
            record
        })
        .collect();
    Catalog::new(words).expect("sample catalog is valid")
}

/// `groups` groups of `per_group` words each, ids `g{group}-{n}`.
pub fn grouped_catalog(groups: u32, per_group: u32) -> Catalog {
    let words = (1..=groups)
        .flat_map(|g| (0..per_group).map(move |n| word(&format!("g{g}-{n}"), &format!("word{g}x{n}"), g)))
        .collect();
    Catalog::new(words).expect("grouped catalog is valid")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Storage that refuses every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStorage;

impl Storage for FailingStorage {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn save(&mut self, _key: &str, _blob: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}
