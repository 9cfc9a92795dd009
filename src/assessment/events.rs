use serde::Serialize;

use crate::models::{
    AttemptRecord, PartKind, PartOutcome, PartStatus, PlacementPlan, PlacementResult,
    ReadingProfile,
};

/// Outbound messages emitted by the orchestrator. The persistence sink listens
/// for `AttemptCompleted`; everything else is informational.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AssessmentEvent {
    #[serde(rename_all = "camelCase")]
    AssessmentStarted {
        attempt_id: String,
        parts: Vec<PartKind>,
    },
    #[serde(rename_all = "camelCase")]
    PartStarted { part: PartKind, index: usize },
    #[serde(rename_all = "camelCase")]
    PartFinished { part: PartKind, status: PartStatus },
    #[serde(rename_all = "camelCase")]
    AttemptCompleted { record: Box<AttemptRecord> },
    #[serde(rename_all = "camelCase")]
    AssessmentCancelled { attempt_id: String },
}

/// Everything shown to the operator once the assessment reaches its result.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOutcome {
    pub profile: ReadingProfile,
    pub parts: Vec<PartOutcome>,
    pub placement: PlacementResult,
    pub plan: PlacementPlan,
    pub record: AttemptRecord,
}

/// Presentation callbacks. `on_complete` fires once per attempt on reaching the
/// result; `on_cancel` fires when the whole assessment is abandoned.
pub trait AssessmentObserver: Send + Sync {
    fn on_complete(&self, outcome: &AssessmentOutcome);

    fn on_cancel(&self) {}
}
