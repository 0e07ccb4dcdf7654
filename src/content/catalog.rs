//! Word catalog loading - reads the generated word list from its JSON asset.
//!
//! The asset is a JSON array of word records in study order, produced
//! offline by the dictionary pipeline. It is loaded once at startup and
//! never changes while the app runs.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::lookup::{self, Segment, WordIndex};
use crate::domain::WordRecord;

/// Immutable, ordered word list with its lookup structures.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    words: Vec<WordRecord>,
    by_id: HashMap<String, usize>,
    index: WordIndex,
    max_day: u32,
}

/// A word (or the text between words) of a sentence, with the catalog entry
/// the word resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedSegment<'t, 'c> {
    pub text: &'t str,
    pub word: Option<&'c WordRecord>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and duplicate words.
    pub fn new(words: Vec<WordRecord>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(words.len());
        let mut seen_words = HashSet::with_capacity(words.len());
        let mut last_group = 0;

        for (pos, record) in words.iter().enumerate() {
            if by_id.insert(record.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(record.id.clone()));
            }
            if !seen_words.insert(record.word.to_lowercase()) {
                return Err(CatalogError::DuplicateWord(record.word.clone()));
            }
            if record.group_number < last_group {
                tracing::warn!(
                    "Group number decreases at '{}' ({} after {})",
                    record.word,
                    record.group_number,
                    last_group
                );
            }
            last_group = record.group_number;
        }

        let index = WordIndex::build(words.iter().map(|w| w.word.as_str()));
        // Empty catalogs still have day 1
        let max_day = words.iter().map(|w| w.day).max().unwrap_or(1).max(1);

        Ok(Self {
            words,
            by_id,
            index,
            max_day,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let words: Vec<WordRecord> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse("<inline>".into(), e.to_string()))?;
        Self::new(words)
    }

    /// Load the catalog asset from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(path.display().to_string(), e.to_string()))?;

        let words: Vec<WordRecord> = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Parse(path.display().to_string(), e.to_string()))?;

        let catalog = Self::new(words)?;
        tracing::debug!(
            "Loaded {} words (max day {}) from {}",
            catalog.len(),
            catalog.max_day,
            path.display()
        );
        Ok(catalog)
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Largest `day` in the catalog, at least 1.
    pub fn max_day(&self) -> u32 {
        self.max_day
    }

    pub fn get(&self, id: &str) -> Option<&WordRecord> {
        self.by_id.get(id).map(|&pos| &self.words[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Resolve free text (a synonym, a word inside a sentence) to an entry.
    pub fn resolve(&self, token: &str) -> Option<&WordRecord> {
        self.index.resolve(token).map(|pos| &self.words[pos])
    }

    /// Split text into words and separators, linking each word to the entry
    /// it resolves to.
    pub fn link_tokens<'t>(&self, text: &'t str) -> Vec<LinkedSegment<'t, '_>> {
        lookup::split_words(text)
            .into_iter()
            .map(|token| LinkedSegment {
                text: token.text,
                word: if token.is_word { self.resolve(token.text) } else { None },
            })
            .collect()
    }

    /// Example sentence of a word with its inflections marked.
    pub fn highlighted_example<'a>(&self, record: &'a WordRecord) -> Vec<Segment<'a>> {
        lookup::highlight(&record.example_sentence, &record.word)
    }

    /// Case-insensitive substring search over headwords, plain substring
    /// over translations. A blank query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&WordRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let lower = query.to_lowercase();

        self.words
            .iter()
            .filter(|w| w.word.to_lowercase().contains(&lower) || w.chinese.contains(query))
            .take(limit)
            .collect()
    }
}

/// Catalog loading errors.
#[derive(Debug)]
pub enum CatalogError {
    FileNotFound(String),
    Io(String, String),
    Parse(String, String),
    DuplicateId(String),
    DuplicateWord(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::FileNotFound(path) => write!(f, "Catalog file not found: {}", path),
            CatalogError::Io(path, err) => write!(f, "IO error reading {}: {}", path, err),
            CatalogError::Parse(path, err) => write!(f, "Parse error in {}: {}", path, err),
            CatalogError::DuplicateId(id) => write!(f, "Duplicate word id in catalog: {}", id),
            CatalogError::DuplicateWord(word) => write!(f, "Duplicate word in catalog: {}", word),
        }
    }
}

impl std::error::Error for CatalogError {}
