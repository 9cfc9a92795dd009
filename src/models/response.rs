use serde::{Deserialize, Serialize};

use super::content::QuestionCategory;

/// One word or pseudoword trial, in presentation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub item_text: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

/// One answered comprehension question. Skipped questions have no record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub question_id: String,
    pub selected_index: usize,
    pub is_correct: bool,
    pub question_type: QuestionCategory,
}
