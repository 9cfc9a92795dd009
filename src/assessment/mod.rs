mod controller;
mod events;

pub use controller::{
    ActivePart, AssessmentConfig, AssessmentController, AssessmentError, AssessmentPhase,
};
pub use events::{AssessmentEvent, AssessmentObserver, AssessmentOutcome};
