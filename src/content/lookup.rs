//! Text-to-catalog resolution.
//!
//! The index maps lowercase surface forms to catalog positions. Tokens that
//! miss are retried through a fixed list of suffix-stripping rules; the
//! first rule that hits wins. This is string slicing, not stemming, and the
//! rule order is part of the observable behavior.

use std::collections::HashMap;

/// Suffixes probed in order after an exact miss.
pub const SUFFIXES: [&str; 10] = ["s", "es", "ed", "ing", "er", "est", "ly", "tion", "ment", "ness"];

/// Endings rewritten to `y` after the suffix rules (`studied`, `studies`).
const Y_ENDINGS: [&str; 2] = ["ied", "ies"];

/// Lowercase word text -> catalog position.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    positions: HashMap<String, usize>,
}

impl WordIndex {
    /// Build from words in catalog order. Later duplicates overwrite earlier
    /// ones; the catalog rejects duplicates before getting here.
    pub fn build<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let positions = words
            .into_iter()
            .enumerate()
            .map(|(i, w)| (w.to_lowercase(), i))
            .collect();
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn get(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Resolve a free-text token to a catalog position.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        let lower = token.to_lowercase();
        let lower = lower.trim();

        if let Some(pos) = self.get(lower) {
            return Some(pos);
        }

        for suffix in SUFFIXES {
            let Some(stem) = lower.strip_suffix(suffix) else {
                continue;
            };
            let stem_len = stem.chars().count();

            if stem_len > 2 {
                if let Some(pos) = self.get(stem) {
                    return Some(pos);
                }
            }

            if let Some(pos) = self.get(&format!("{stem}e")) {
                return Some(pos);
            }

            // stopped -> stop
            if stem_len > 2 {
                if let Some(shorter) = undouble(stem) {
                    if let Some(pos) = self.get(shorter) {
                        return Some(pos);
                    }
                }
            }
        }

        for ending in Y_ENDINGS {
            if let Some(base) = lower.strip_suffix(ending) {
                if let Some(pos) = self.get(&format!("{base}y")) {
                    return Some(pos);
                }
            }
        }

        None
    }
}

/// Drop the last character when it repeats the one before it.
fn undouble(stem: &str) -> Option<&str> {
    let mut rev = stem.char_indices().rev();
    let (last_idx, last) = rev.next()?;
    let (_, prev) = rev.next()?;
    (last == prev).then(|| &stem[..last_idx])
}

/// A run of text that is either a word (ASCII letters) or everything between
/// words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_word: bool,
}

/// Split text into alternating word / non-word tokens. Concatenating the
/// token texts gives back the input.
pub fn split_words(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let is_word = c.is_ascii_alphabetic();
        match in_word {
            Some(current) if current == is_word => {}
            Some(current) => {
                tokens.push(Token {
                    text: &text[start..i],
                    is_word: current,
                });
                start = i;
                in_word = Some(is_word);
            }
            None => in_word = Some(is_word),
        }
    }

    if let Some(current) = in_word {
        tokens.push(Token {
            text: &text[start..],
            is_word: current,
        });
    }
    tokens
}

/// Part of an example sentence, marked when it is an inflection of the
/// card's headword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Mark every case-insensitive occurrence of `target` together with the
/// letters that follow it (`abandon` highlights `abandoned`).
pub fn highlight<'a>(sentence: &'a str, target: &str) -> Vec<Segment<'a>> {
    let target = target.trim();
    if target.is_empty() {
        return plain_segment(sentence);
    }

    // ASCII lowercasing keeps byte offsets aligned with `sentence`.
    let haystack = sentence.to_ascii_lowercase();
    let needle = target.to_ascii_lowercase();
    let bytes = haystack.as_bytes();

    let mut segments = Vec::new();
    let mut pos = 0;
    while let Some(found) = haystack[pos..].find(&needle) {
        let start = pos + found;
        let mut end = start + needle.len();
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }

        if start > pos {
            segments.push(Segment {
                text: &sentence[pos..start],
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: &sentence[start..end],
            highlighted: true,
        });
        pos = end;
    }

    if pos < sentence.len() {
        segments.push(Segment {
            text: &sentence[pos..],
            highlighted: false,
        });
    }
    segments
}

fn plain_segment(sentence: &str) -> Vec<Segment<'_>> {
    if sentence.is_empty() {
        Vec::new()
    } else {
        vec![Segment {
            text: sentence,
            highlighted: false,
        }]
    }
}
