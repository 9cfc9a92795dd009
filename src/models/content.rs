//! Content items supplied by the external content repository.
//!
//! Passages, word lists and questions are immutable once loaded and are keyed
//! by difficulty band.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Beginner,
    Elementary,
    Intermediate,
    Advanced,
}

impl Band {
    pub const ALL: [Band; 4] = [
        Band::Beginner,
        Band::Elementary,
        Band::Intermediate,
        Band::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Beginner => "beginner",
            Band::Elementary => "elementary",
            Band::Intermediate => "intermediate",
            Band::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(Band::Beginner),
            "elementary" => Some(Band::Elementary),
            "intermediate" => Some(Band::Intermediate),
            "advanced" => Some(Band::Advanced),
            _ => None,
        }
    }

    /// Position on the beginner..advanced scale, starting at 0.
    pub fn rank(&self) -> u8 {
        match self {
            Band::Beginner => 0,
            Band::Elementary => 1,
            Band::Intermediate => 2,
            Band::Advanced => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub id: String,
    pub band: Band,
    pub title: String,
    pub word_count: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WordListKind {
    /// Real sight words (word recognition).
    Real,
    /// Pronounceable non-words (decoding).
    Pseudo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub id: String,
    pub band: Band,
    pub kind: WordListKind,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionCategory {
    Literal,
    Inferential,
    Vocab,
    Sequence,
    MainIdea,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Literal => "literal",
            QuestionCategory::Inferential => "inferential",
            QuestionCategory::Vocab => "vocab",
            QuestionCategory::Sequence => "sequence",
            QuestionCategory::MainIdea => "main-idea",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub passage_id: String,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub correct_index: usize,
    pub category: QuestionCategory,
    pub difficulty: Band,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_round_trips_through_its_string_form() {
        for band in Band::ALL {
            assert_eq!(Band::parse(band.as_str()), Some(band));
        }
        assert_eq!(Band::parse("expert"), None);
    }

    #[test]
    fn main_idea_category_uses_kebab_case() {
        let json = serde_json::to_string(&QuestionCategory::MainIdea).unwrap();
        assert_eq!(json, "\"main-idea\"");
    }

    #[test]
    fn bands_order_from_beginner_to_advanced() {
        assert!(Band::Beginner < Band::Elementary);
        assert!(Band::Intermediate < Band::Advanced);
        assert_eq!(Band::Advanced.rank(), 3);
    }
}
