//! Per-part state machines driven by operator input.
//!
//! Each part walks a closed set of phases. Operations that do not fit the
//! current phase return a [`PhaseError`] and leave the session untouched.

pub mod comprehension;
pub mod orf;
pub mod word_trial;

use thiserror::Error;

pub use comprehension::{AnswerFeedback, ComprehensionPhase, ComprehensionSession};
pub use orf::{OrfPhase, OrfSession};
pub use word_trial::{TrialAction, TrialPhase, WordTrialSession};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("{action} is not allowed during the {phase} phase")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("word {index} is outside the passage ({len} words)")]
    WordOutOfRange { index: usize, len: usize },

    #[error("word {0} has no error mark")]
    NotMarked(usize),

    #[error("choice {choice} is not one of the {available} choices")]
    InvalidChoice { choice: usize, available: usize },

    #[error("question has already been answered")]
    AlreadyAnswered,

    #[error("an answer or skip is required before advancing")]
    AnswerRequired,
}

pub type PhaseResult<T> = std::result::Result<T, PhaseError>;
