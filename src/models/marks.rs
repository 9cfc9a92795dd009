use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Substitution,
    Omission,
    Insertion,
    Reversal,
    Hesitation,
    Unknown,
}

impl ErrorType {
    /// Operator palette order.
    pub const PALETTE: [ErrorType; 6] = [
        ErrorType::Substitution,
        ErrorType::Omission,
        ErrorType::Insertion,
        ErrorType::Reversal,
        ErrorType::Hesitation,
        ErrorType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Substitution => "substitution",
            ErrorType::Omission => "omission",
            ErrorType::Insertion => "insertion",
            ErrorType::Reversal => "reversal",
            ErrorType::Hesitation => "hesitation",
            ErrorType::Unknown => "unknown",
        }
    }

    /// Next entry in the palette, wrapping around.
    pub fn next(&self) -> ErrorType {
        let position = Self::PALETTE
            .iter()
            .position(|candidate| candidate == self)
            .unwrap_or(0);
        Self::PALETTE[(position + 1) % Self::PALETTE.len()]
    }
}

impl Default for ErrorType {
    fn default() -> Self {
        ErrorType::Substitution
    }
}

/// A reading error attached to one word position of the passage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMark {
    pub word_index: usize,
    pub word_text: String,
    pub error_type: ErrorType,
    pub corrected: bool,
}

impl ErrorMark {
    pub fn new(word_index: usize, word_text: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            word_index,
            word_text: word_text.into(),
            error_type,
            corrected: false,
        }
    }

    pub fn self_corrected(mut self) -> Self {
        self.corrected = true;
        self
    }
}
