use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::content::{QuestionCategory, WordListKind};
use super::marks::{ErrorMark, ErrorType};
use super::response::{ItemResponse, QuestionResponse};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PartKind {
    Orf,
    WordList,
    Pseudowords,
    Comprehension,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Orf => "orf",
            PartKind::WordList => "wordList",
            PartKind::Pseudowords => "pseudowords",
            PartKind::Comprehension => "comprehension",
        }
    }

    /// Word list flavour backing a trial part.
    pub fn word_list_kind(&self) -> Option<WordListKind> {
        match self {
            PartKind::WordList => Some(WordListKind::Real),
            PartKind::Pseudowords => Some(WordListKind::Pseudo),
            PartKind::Orf | PartKind::Comprehension => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PartStatus {
    Completed,
    Skipped,
}

/// Correct/total counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn new(correct: u32, total: u32) -> Self {
        Self { correct, total }
    }

    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Fluency metrics for one oral reading. Computed, never patched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrfMetrics {
    pub total_words: u32,
    pub words_correct: u32,
    pub errors_total: u32,
    pub accuracy_pct: u32,
    pub wcpm: u32,
    pub self_corrections: u32,
    pub error_rate: u32,
}

/// Per error type counts. `marked` includes self-corrected marks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTypeCount {
    pub marked: u32,
    pub corrected: u32,
}

pub type ErrorBreakdown = BTreeMap<ErrorType, ErrorTypeCount>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrfResult {
    pub passage_id: String,
    pub metrics: OrfMetrics,
    pub errors: Vec<ErrorMark>,
    pub breakdown: ErrorBreakdown,
    pub low_confidence: bool,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrialSummary {
    pub correct_items: u32,
    pub incorrect_items: u32,
    pub total_items: u32,
    pub accuracy_pct: u32,
    pub items_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordTrialResult {
    pub list_id: String,
    pub kind: WordListKind,
    pub responses: Vec<ItemResponse>,
    pub summary: TrialSummary,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensionSummary {
    pub correct_answers: u32,
    pub total_questions: u32,
    pub by_type: BTreeMap<QuestionCategory, Tally>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensionResult {
    pub passage_id: String,
    pub responses: Vec<QuestionResponse>,
    pub summary: ComprehensionSummary,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "part", rename_all = "camelCase")]
pub enum PartResult {
    Orf(OrfResult),
    WordList(WordTrialResult),
    Pseudowords(WordTrialResult),
    Comprehension(ComprehensionResult),
}

impl PartResult {
    pub fn kind(&self) -> PartKind {
        match self {
            PartResult::Orf(_) => PartKind::Orf,
            PartResult::WordList(_) => PartKind::WordList,
            PartResult::Pseudowords(_) => PartKind::Pseudowords,
            PartResult::Comprehension(_) => PartKind::Comprehension,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        match self {
            PartResult::Orf(result) => result.duration_secs,
            PartResult::WordList(result) | PartResult::Pseudowords(result) => result.duration_secs,
            PartResult::Comprehension(result) => result.duration_secs,
        }
    }
}

/// What the orchestrator kept for one selected part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartOutcome {
    pub kind: PartKind,
    pub status: PartStatus,
    pub result: Option<PartResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_correct_answers_separately() {
        let mut tally = Tally::default();
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally, Tally::new(2, 3));
        assert!(!tally.is_empty());
    }

    #[test]
    fn part_result_is_tagged_by_part() {
        let result = PartResult::Comprehension(ComprehensionResult {
            passage_id: "p1".into(),
            responses: Vec::new(),
            summary: ComprehensionSummary::default(),
            duration_secs: 12,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["part"], "comprehension");
        assert_eq!(result.kind(), PartKind::Comprehension);
        assert_eq!(result.duration_secs(), 12);
    }
}
