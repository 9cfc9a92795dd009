//! Read-only content lookup injected into the orchestrator.

mod library;

pub use library::ContentLibrary;

use crate::models::{Band, Passage, Question, WordList, WordListKind};

/// Source of passages, word lists and questions keyed by band.
///
/// Lookups never fail for a missing band: implementations substitute the first
/// available item of any band and only return `None` when they hold nothing of
/// that kind at all.
pub trait ContentProvider: Send + Sync {
    fn get_passage(&self, band: Band) -> Option<Passage>;

    fn get_word_list(&self, band: Band, kind: WordListKind) -> Option<WordList>;

    /// Questions attached to a passage, in presentation order.
    fn get_questions(&self, passage_id: &str) -> Vec<Question>;
}
