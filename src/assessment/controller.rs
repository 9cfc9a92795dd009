use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{sync::mpsc::UnboundedSender, time::Instant};
use uuid::Uuid;

use crate::content::ContentProvider;
use crate::models::{
    AttemptContext, AttemptRecord, Band, LearnerGroup, PartKind, PartOutcome, PartResult,
    PartStatus, WordTrialResult,
};
use crate::parts::{ComprehensionSession, OrfSession, PhaseError, WordTrialSession};
use crate::scoring::{
    build_reading_profile, calculate_placement, generate_placement_plan, PlacementInput,
    ProfileInputs, ScoringPolicy,
};
use crate::{log_info, log_warn};

use super::events::{AssessmentEvent, AssessmentObserver, AssessmentOutcome};

const ENABLE_LOGS: bool = true;

/// Operator selections made during setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentConfig {
    pub learner_group: LearnerGroup,
    pub target_band: Band,
    /// Parts to run, in order.
    pub parts: Vec<PartKind>,
}

impl AssessmentConfig {
    fn validate(&self) -> Result<(), AssessmentError> {
        if self.parts.is_empty() {
            return Err(AssessmentError::NoPartsSelected);
        }
        for (index, part) in self.parts.iter().enumerate() {
            if self.parts[..index].contains(part) {
                return Err(AssessmentError::DuplicatePart(*part));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentPhase {
    Setup,
    Running { index: usize },
    Result,
    Cancelled,
}

impl AssessmentPhase {
    pub fn name(&self) -> &'static str {
        match self {
            AssessmentPhase::Setup => "setup",
            AssessmentPhase::Running { .. } => "running",
            AssessmentPhase::Result => "result",
            AssessmentPhase::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("select at least one part before starting")]
    NoPartsSelected,

    #[error("part {0:?} was selected more than once")]
    DuplicatePart(PartKind),

    #[error("{action} is not allowed while the assessment is in {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("the active part is {active:?}, not {requested:?}")]
    WrongPart {
        requested: PartKind,
        active: PartKind,
    },

    #[error(transparent)]
    Part(#[from] PhaseError),
}

/// The part session currently receiving operator input.
#[derive(Debug, Clone)]
pub enum ActivePart {
    Orf(OrfSession),
    WordTrial(PartKind, WordTrialSession),
    Comprehension(ComprehensionSession),
}

impl ActivePart {
    pub fn kind(&self) -> PartKind {
        match self {
            ActivePart::Orf(_) => PartKind::Orf,
            ActivePart::WordTrial(kind, _) => *kind,
            ActivePart::Comprehension(_) => PartKind::Comprehension,
        }
    }

    fn finalize(&mut self, now: Instant) -> Result<PartResult, PhaseError> {
        Ok(match self {
            ActivePart::Orf(session) => PartResult::Orf(session.finalize(now)?),
            ActivePart::WordTrial(kind, session) => wrap_trial(*kind, session.finalize(now)?),
            ActivePart::Comprehension(session) => PartResult::Comprehension(session.finalize(now)?),
        })
    }

    fn cancel(&mut self, now: Instant) -> Option<PartResult> {
        match self {
            ActivePart::Orf(session) => session.cancel(now).map(PartResult::Orf),
            ActivePart::WordTrial(kind, session) => {
                let kind = *kind;
                session.cancel(now).map(|result| wrap_trial(kind, result))
            }
            ActivePart::Comprehension(session) => {
                session.cancel(now).map(PartResult::Comprehension)
            }
        }
    }
}

fn wrap_trial(kind: PartKind, result: WordTrialResult) -> PartResult {
    match kind {
        PartKind::Pseudowords => PartResult::Pseudowords(result),
        _ => PartResult::WordList(result),
    }
}

/// Drives one assessment attempt from setup to result.
///
/// Content comes from the injected provider. Reaching the result runs the
/// profile, placement and plan steps once, then publishes the attempt record on
/// the event channel without waiting on whoever consumes it.
pub struct AssessmentController {
    content: Arc<dyn ContentProvider>,
    policy: ScoringPolicy,
    device_id: String,
    events: Option<UnboundedSender<AssessmentEvent>>,
    observer: Option<Arc<dyn AssessmentObserver>>,

    phase: AssessmentPhase,
    config: Option<AssessmentConfig>,
    attempt_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    active: Option<ActivePart>,
    outcomes: Vec<PartOutcome>,
    outcome: Option<AssessmentOutcome>,
}

impl AssessmentController {
    pub fn new(
        content: Arc<dyn ContentProvider>,
        policy: ScoringPolicy,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            content,
            policy,
            device_id: device_id.into(),
            events: None,
            observer: None,
            phase: AssessmentPhase::Setup,
            config: None,
            attempt_id: None,
            started_at: None,
            active: None,
            outcomes: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<AssessmentEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AssessmentObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn attempt_id(&self) -> Option<&str> {
        self.attempt_id.as_deref()
    }

    pub fn current_part(&self) -> Option<PartKind> {
        self.active.as_ref().map(ActivePart::kind)
    }

    pub fn active_part(&self) -> Option<&ActivePart> {
        self.active.as_ref()
    }

    /// Outcomes recorded so far, in the order the parts ran.
    pub fn outcomes(&self) -> &[PartOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    fn wrong_phase(&self, action: &'static str) -> AssessmentError {
        AssessmentError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    fn active_mut(&mut self, requested: PartKind) -> Result<&mut ActivePart, AssessmentError> {
        let phase = self.phase.name();
        let active = self.active.as_mut().ok_or(AssessmentError::WrongPhase {
            action: "operate a part",
            phase,
        })?;
        let kind = active.kind();
        let matches = kind == requested
            || (requested == PartKind::WordList && kind == PartKind::Pseudowords);
        if !matches {
            return Err(AssessmentError::WrongPart { requested, active: kind });
        }
        Ok(active)
    }

    pub fn orf(&mut self) -> Result<&mut OrfSession, AssessmentError> {
        match self.active_mut(PartKind::Orf)? {
            ActivePart::Orf(session) => Ok(session),
            other => Err(AssessmentError::WrongPart {
                requested: PartKind::Orf,
                active: other.kind(),
            }),
        }
    }

    /// The word or pseudoword trial, whichever is active.
    pub fn word_trial(&mut self) -> Result<&mut WordTrialSession, AssessmentError> {
        match self.active_mut(PartKind::WordList)? {
            ActivePart::WordTrial(_, session) => Ok(session),
            other => Err(AssessmentError::WrongPart {
                requested: PartKind::WordList,
                active: other.kind(),
            }),
        }
    }

    pub fn comprehension(&mut self) -> Result<&mut ComprehensionSession, AssessmentError> {
        match self.active_mut(PartKind::Comprehension)? {
            ActivePart::Comprehension(session) => Ok(session),
            other => Err(AssessmentError::WrongPart {
                requested: PartKind::Comprehension,
                active: other.kind(),
            }),
        }
    }

    pub fn start(&mut self, config: AssessmentConfig, now: Instant) -> Result<(), AssessmentError> {
        if self.phase != AssessmentPhase::Setup {
            return Err(self.wrong_phase("start"));
        }
        config.validate()?;

        let attempt_id = Uuid::new_v4().to_string();
        log_info!(
            "Starting assessment {} for {} at band {} with parts {:?}",
            attempt_id,
            config.learner_group.as_str(),
            config.target_band.as_str(),
            config.parts
        );
        self.emit(AssessmentEvent::AssessmentStarted {
            attempt_id: attempt_id.clone(),
            parts: config.parts.clone(),
        });

        self.attempt_id = Some(attempt_id);
        self.started_at = Some(Utc::now());
        self.config = Some(config);
        self.enter_part(0, now);
        Ok(())
    }

    /// Completes the active part normally. The part must be in its review phase.
    pub fn finalize_part(&mut self, now: Instant) -> Result<PartKind, AssessmentError> {
        let AssessmentPhase::Running { index } = self.phase else {
            return Err(self.wrong_phase("finalize part"));
        };
        let Some(active) = self.active.as_mut() else {
            return Err(self.wrong_phase("finalize part"));
        };
        let kind = active.kind();
        let result = active.finalize(now)?;

        self.record_outcome(kind, PartStatus::Completed, Some(result));
        self.enter_part(index + 1, now);
        Ok(kind)
    }

    /// Operator cancel for the active part. Whatever partial data exists is
    /// kept; a part cancelled before any response keeps nothing.
    pub fn skip_part(&mut self, now: Instant) -> Result<PartKind, AssessmentError> {
        let AssessmentPhase::Running { index } = self.phase else {
            return Err(self.wrong_phase("skip part"));
        };
        let Some(mut active) = self.active.take() else {
            return Err(self.wrong_phase("skip part"));
        };
        let kind = active.kind();
        let partial = active.cancel(now);
        log_info!(
            "Skipping {} ({})",
            kind.as_str(),
            if partial.is_some() { "partial result kept" } else { "no responses" }
        );

        self.record_outcome(kind, PartStatus::Skipped, partial);
        self.enter_part(index + 1, now);
        Ok(kind)
    }

    /// Abandons the whole attempt. Nothing is scored or persisted.
    pub fn cancel(&mut self) -> Result<(), AssessmentError> {
        if !matches!(
            self.phase,
            AssessmentPhase::Setup | AssessmentPhase::Running { .. }
        ) {
            return Err(self.wrong_phase("cancel"));
        }
        log_info!("Assessment cancelled");

        self.active = None;
        self.outcomes.clear();
        self.phase = AssessmentPhase::Cancelled;
        if let Some(attempt_id) = self.attempt_id.clone() {
            self.emit(AssessmentEvent::AssessmentCancelled { attempt_id });
        }
        if let Some(observer) = &self.observer {
            observer.on_cancel();
        }
        Ok(())
    }

    /// Back to setup. Every piece of the previous attempt is discarded.
    pub fn restart(&mut self) {
        log_info!("Assessment restarted from {}", self.phase.name());
        self.phase = AssessmentPhase::Setup;
        self.config = None;
        self.attempt_id = None;
        self.started_at = None;
        self.active = None;
        self.outcomes.clear();
        self.outcome = None;
    }

    fn record_outcome(&mut self, kind: PartKind, status: PartStatus, result: Option<PartResult>) {
        self.active = None;
        self.outcomes.push(PartOutcome {
            kind,
            status,
            result,
        });
        self.emit(AssessmentEvent::PartFinished { part: kind, status });
    }

    /// Opens the first part at or after `index` that has content, or moves to
    /// the result when none remain.
    fn enter_part(&mut self, index: usize, now: Instant) {
        let Some(config) = self.config.clone() else {
            return;
        };

        for (index, kind) in config.parts.iter().enumerate().skip(index) {
            match self.open_part(*kind, config.target_band, now) {
                Some(part) => {
                    log_info!("Entering part {} ({})", index + 1, kind.as_str());
                    self.active = Some(part);
                    self.phase = AssessmentPhase::Running { index };
                    self.emit(AssessmentEvent::PartStarted { part: *kind, index });
                    return;
                }
                None => {
                    log_warn!("No content available for {}, skipping it", kind.as_str());
                    self.record_outcome(*kind, PartStatus::Skipped, None);
                }
            }
        }

        self.finish(&config);
    }

    fn open_part(&self, kind: PartKind, band: Band, now: Instant) -> Option<ActivePart> {
        match kind {
            PartKind::Orf => {
                let passage = self.content.get_passage(band)?;
                Some(ActivePart::Orf(OrfSession::new(
                    &passage,
                    self.policy.low_confidence_secs,
                )))
            }
            PartKind::WordList | PartKind::Pseudowords => {
                let list_kind = kind.word_list_kind()?;
                let list = self.content.get_word_list(band, list_kind)?;
                Some(ActivePart::WordTrial(kind, WordTrialSession::new(&list)))
            }
            PartKind::Comprehension => {
                let passage = self.content.get_passage(band)?;
                let questions = self.content.get_questions(&passage.id);
                if questions.is_empty() {
                    log_warn!(
                        "No comprehension questions for passage {}; the quiz will be empty",
                        passage.id
                    );
                }
                Some(ActivePart::Comprehension(ComprehensionSession::new(
                    &passage, questions, now,
                )))
            }
        }
    }

    fn finish(&mut self, config: &AssessmentConfig) {
        let profile = build_reading_profile(&ProfileInputs::from_outcomes(&self.outcomes), &self.policy);
        let placement = calculate_placement(
            &PlacementInput {
                learner_group: config.learner_group,
                profile: &profile,
            },
            &self.policy,
        );
        let plan = generate_placement_plan(&placement);

        let completed_at = Utc::now();
        let context = AttemptContext {
            id: self
                .attempt_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            device_id: self.device_id.clone(),
            learner_group: config.learner_group,
            target_band: config.target_band,
            started_at: self.started_at.unwrap_or(completed_at),
            completed_at,
        };
        let record = AttemptRecord::new(context, &self.outcomes, &profile, &placement, &plan);

        log_info!(
            "Assessment {} complete: band {:?}, placement {} ({})",
            record.id,
            profile.overall_band.map(|band| band.as_str()),
            placement.level.as_str(),
            placement.confidence.as_str()
        );

        let outcome = AssessmentOutcome {
            profile,
            parts: self.outcomes.clone(),
            placement,
            plan,
            record,
        };

        self.phase = AssessmentPhase::Result;
        self.emit(AssessmentEvent::AttemptCompleted {
            record: Box::new(outcome.record.clone()),
        });
        if let Some(observer) = &self.observer {
            observer.on_complete(&outcome);
        }
        self.outcome = Some(outcome);
    }

    fn emit(&self, event: AssessmentEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                log_warn!("Assessment event receiver dropped");
            }
        }
    }
}
