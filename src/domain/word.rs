use serde::{Deserialize, Serialize};

/// A single vocabulary entry from the catalog asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
  pub id: String,
  pub word: String,
  pub chinese: String,
  pub ipa: String,
  pub part_of_speech: String,
  pub example_sentence: String,
  #[serde(default)]
  pub synonyms: Vec<String>,
  /// Day at which this word first becomes reviewable
  pub day: u32,
  /// 50-word batch used for display chunking and jump navigation
  pub group_number: u32,
}

/// Learner judgment for a word. `Unset` is never stored; it is the
/// absence of an entry in the status map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordStatus {
  #[serde(rename = "green", alias = "known")]
  Known,
  #[serde(rename = "red", alias = "unknown")]
  Unknown,
  #[serde(rename = "unset")]
  Unset,
}

impl WordStatus {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "known" | "green" | "g" => Some(Self::Known),
      "unknown" | "red" | "r" => Some(Self::Unknown),
      "unset" | "none" | "w" => Some(Self::Unset),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Known => "known",
      Self::Unknown => "unknown",
      Self::Unset => "unset",
    }
  }
}

impl std::fmt::Display for WordStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_word_record_deserializes_camel_case() {
    let json = r#"{
      "id": "w1",
      "word": "abandon",
      "chinese": "放弃",
      "ipa": "/əˈbændən/",
      "partOfSpeech": "v.",
      "exampleSentence": "They had to abandon the car.",
      "synonyms": ["desert", "leave"],
      "day": 1,
      "groupNumber": 1
    }"#;

    let record: WordRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.id, "w1");
    assert_eq!(record.part_of_speech, "v.");
    assert_eq!(record.synonyms, vec!["desert", "leave"]);
    assert_eq!(record.group_number, 1);
  }

  #[test]
  fn test_word_record_missing_synonyms_defaults_empty() {
    let json = r#"{"id":"w2","word":"ability","chinese":"能力","ipa":"","partOfSpeech":"n.",
      "exampleSentence":"","day":1,"groupNumber":1}"#;
    let record: WordRecord = serde_json::from_str(json).unwrap();
    assert!(record.synonyms.is_empty());
  }

  #[test]
  fn test_status_serializes_as_colors() {
    assert_eq!(serde_json::to_string(&WordStatus::Known).unwrap(), "\"green\"");
    assert_eq!(serde_json::to_string(&WordStatus::Unknown).unwrap(), "\"red\"");
  }

  #[test]
  fn test_status_accepts_aliases() {
    let known: WordStatus = serde_json::from_str("\"known\"").unwrap();
    let unknown: WordStatus = serde_json::from_str("\"unknown\"").unwrap();
    assert_eq!(known, WordStatus::Known);
    assert_eq!(unknown, WordStatus::Unknown);
  }

  #[test]
  fn test_status_from_str() {
    assert_eq!(WordStatus::from_str("known"), Some(WordStatus::Known));
    assert_eq!(WordStatus::from_str("r"), Some(WordStatus::Unknown));
    assert_eq!(WordStatus::from_str("unset"), Some(WordStatus::Unset));
    assert_eq!(WordStatus::from_str("maybe"), None);
  }

  #[test]
  fn test_status_as_str_roundtrip() {
    for status in [WordStatus::Known, WordStatus::Unknown, WordStatus::Unset] {
      assert_eq!(WordStatus::from_str(status.as_str()), Some(status));
    }
  }
}
