pub mod attempt;
pub mod content;
pub mod marks;
pub mod part;
pub mod placement;
pub mod profile;
pub mod response;

pub use attempt::{AttemptContext, AttemptRecord};
pub use content::{Band, Choice, Passage, Question, QuestionCategory, WordList, WordListKind};
pub use marks::{ErrorMark, ErrorType};
pub use part::{
    ComprehensionResult, ComprehensionSummary, ErrorBreakdown, ErrorTypeCount, OrfMetrics,
    OrfResult, PartKind, PartOutcome, PartResult, PartStatus, Tally, TrialSummary,
    WordTrialResult,
};
pub use placement::{LearnerGroup, PlacementLevel, PlacementPlan, PlacementResult, PlanStep};
pub use profile::{Confidence, DomainScore, ReadingDomain, ReadingProfile};
pub use response::{ItemResponse, QuestionResponse};
