//! Scripted operator input.
//!
//! A script is the setup selections plus a list of timed operator actions. The
//! replayer feeds each action to the orchestrator at `base + at_ms`, standing in
//! for a person tapping through the assessment screens.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};

use crate::assessment::{AssessmentConfig, AssessmentController, AssessmentError};
use crate::models::ErrorType;
use crate::parts::TrialAction;
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OperatorAction {
    Start,
    BeginReading,
    PauseReading,
    ResumeReading,
    FinishReading,
    SelectErrorType { error_type: ErrorType },
    CycleErrorType,
    TapWord { index: usize },
    MarkWord { index: usize, error_type: ErrorType },
    ToggleSelfCorrected { index: usize },
    ClearMarks,
    Review,
    BackToMarking,
    BeginTrial,
    Respond { verdict: TrialAction },
    StartQuestions,
    Answer { choice: usize },
    SkipQuestion,
    NextQuestion,
    FinalizePart,
    SkipPart,
    Cancel,
    Restart,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    /// Offset from the start of the replay.
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: OperatorAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperatorScript {
    pub config: AssessmentConfig,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl OperatorScript {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse script in {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectedStep {
    pub step: usize,
    pub action: OperatorAction,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<RejectedStep>,
}

impl ReplayReport {
    fn note(&mut self, step: usize, action: &OperatorAction, result: Result<(), AssessmentError>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(err) => {
                log_warn!("Step {step} ({action:?}) rejected: {err}");
                self.rejected.push(RejectedStep {
                    step,
                    action: action.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Applies one operator action to whatever part is active.
pub fn apply_action(
    controller: &mut AssessmentController,
    config: &AssessmentConfig,
    action: &OperatorAction,
    now: Instant,
) -> Result<(), AssessmentError> {
    match action {
        OperatorAction::Start => controller.start(config.clone(), now)?,
        OperatorAction::BeginReading => controller.orf()?.begin_reading(now)?,
        OperatorAction::PauseReading => {
            controller.orf()?.pause(now)?;
        }
        OperatorAction::ResumeReading => {
            controller.orf()?.resume(now)?;
        }
        OperatorAction::FinishReading => controller.orf()?.finish_reading(now)?,
        OperatorAction::SelectErrorType { error_type } => {
            controller.orf()?.set_active_error_type(*error_type)
        }
        OperatorAction::CycleErrorType => {
            controller.orf()?.cycle_active_error_type();
        }
        OperatorAction::TapWord { index } => {
            controller.orf()?.tap_word(*index)?;
        }
        OperatorAction::MarkWord { index, error_type } => {
            controller.orf()?.mark_word(*index, *error_type)?;
        }
        OperatorAction::ToggleSelfCorrected { index } => {
            controller.orf()?.toggle_self_corrected(*index)?;
        }
        OperatorAction::ClearMarks => controller.orf()?.clear_marks()?,
        OperatorAction::Review => {
            controller.orf()?.review(now)?;
        }
        OperatorAction::BackToMarking => controller.orf()?.back_to_marking()?,
        OperatorAction::BeginTrial => controller.word_trial()?.begin(now)?,
        OperatorAction::Respond { verdict } => {
            controller.word_trial()?.respond(*verdict, now)?;
        }
        OperatorAction::StartQuestions => controller.comprehension()?.start_questions(now)?,
        OperatorAction::Answer { choice } => {
            controller.comprehension()?.submit_answer(*choice)?;
        }
        OperatorAction::SkipQuestion => controller.comprehension()?.skip_question(now)?,
        OperatorAction::NextQuestion => controller.comprehension()?.next(now)?,
        OperatorAction::FinalizePart => {
            controller.finalize_part(now)?;
        }
        OperatorAction::SkipPart => {
            controller.skip_part(now)?;
        }
        OperatorAction::Cancel => controller.cancel()?,
        OperatorAction::Restart => controller.restart(),
    }
    Ok(())
}

fn step_offset(step: &ScriptStep) -> Duration {
    Duration::from_millis(step.at_ms)
}

/// Replays the script on synthetic time: each step runs at `base + at_ms`
/// without waiting. Rejected steps are reported and leave state unchanged.
pub fn replay(
    controller: &mut AssessmentController,
    script: &OperatorScript,
    base: Instant,
) -> Result<ReplayReport, AssessmentError> {
    controller.start(script.config.clone(), base)?;

    let mut report = ReplayReport::default();
    for (index, step) in script.steps.iter().enumerate() {
        let now = base + step_offset(step);
        log_debug!("Step {index} at {}ms: {:?}", step.at_ms, step.action);
        let result = apply_action(controller, &script.config, &step.action, now);
        report.note(index, &step.action, result);
    }
    Ok(report)
}

/// Replays the script in real time, sleeping until each step is due.
pub async fn replay_paced(
    controller: &mut AssessmentController,
    script: &OperatorScript,
) -> Result<ReplayReport, AssessmentError> {
    let base = Instant::now();
    controller.start(script.config.clone(), base)?;

    let mut report = ReplayReport::default();
    for (index, step) in script.steps.iter().enumerate() {
        time::sleep_until(base + step_offset(step)).await;
        let result = apply_action(controller, &script.config, &step.action, Instant::now());
        report.note(index, &step.action, result);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::AssessmentPhase;
    use crate::content::ContentLibrary;
    use crate::models::{Band, Passage, PartKind, PlacementLevel, WordList, WordListKind};
    use crate::scoring::ScoringPolicy;
    use std::sync::Arc;

    fn controller() -> AssessmentController {
        let content = ContentLibrary {
            passages: vec![Passage {
                id: "p-1".into(),
                band: Band::Intermediate,
                title: "Harbor".into(),
                word_count: 6,
                text: "boats rocked gently in the harbor".into(),
            }],
            word_lists: vec![WordList {
                id: "real-1".into(),
                band: Band::Intermediate,
                kind: WordListKind::Real,
                items: vec!["harbor".into(), "gently".into()],
            }],
            questions: Vec::new(),
        };
        AssessmentController::new(Arc::new(content), ScoringPolicy::default(), "test")
    }

    const SCRIPT: &str = r#"{
        "config": { "learnerGroup": "adult", "targetBand": "intermediate", "parts": ["orf", "wordList"] },
        "steps": [
            { "atMs": 0, "action": "beginReading" },
            { "atMs": 10000, "action": "pauseReading" },
            { "atMs": 25000, "action": "resumeReading" },
            { "atMs": 45000, "action": "finishReading" },
            { "atMs": 46000, "action": "markWord", "index": 1, "errorType": "substitution" },
            { "atMs": 46500, "action": "answer", "choice": 0 },
            { "atMs": 47000, "action": "review" },
            { "atMs": 48000, "action": "finalizePart" },
            { "atMs": 49000, "action": "beginTrial" },
            { "atMs": 50000, "action": "respond", "verdict": "correct" },
            { "atMs": 51000, "action": "respond", "verdict": "skip" },
            { "atMs": 52000, "action": "finalizePart" }
        ]
    }"#;

    #[test]
    fn replays_a_scripted_attempt() {
        let script: OperatorScript = serde_json::from_str(SCRIPT).unwrap();
        let mut engine = controller();

        let report = replay(&mut engine, &script, Instant::now()).unwrap();

        assert_eq!(report.applied, 11);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].step, 5);
        assert_eq!(engine.phase(), AssessmentPhase::Result);

        let outcome = engine.outcome().unwrap();
        // 45s of reading minus the 15s pause.
        assert_eq!(outcome.record.orf_total_words, Some(6));
        assert_eq!(outcome.record.orf_words_correct, Some(5));
        assert_eq!(outcome.record.orf_wcpm, Some(10));
        assert_eq!(outcome.record.word_responses.len(), 2);
        assert_eq!(outcome.record.total_duration_secs, 30 + 2);
        assert_ne!(outcome.placement.level, PlacementLevel::Advanced);
    }

    #[test]
    fn unknown_actions_fail_to_parse() {
        let raw = r#"{ "config": { "learnerGroup": "teen", "targetBand": "beginner",
            "parts": ["orf"] }, "steps": [{ "action": "dance" }] }"#;
        assert!(serde_json::from_str::<OperatorScript>(raw).is_err());
    }

    #[test]
    fn invalid_config_is_fatal() {
        let script = OperatorScript {
            config: AssessmentConfig {
                learner_group: crate::models::LearnerGroup::Teen,
                target_band: Band::Beginner,
                parts: vec![PartKind::Orf, PartKind::Orf],
            },
            steps: Vec::new(),
        };
        assert!(replay(&mut controller(), &script, Instant::now()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn paced_replay_waits_for_each_step() {
        let script: OperatorScript = serde_json::from_str(SCRIPT).unwrap();
        let mut engine = controller();
        let started = Instant::now();

        let report = replay_paced(&mut engine, &script).await.unwrap();

        assert_eq!(report.applied, 11);
        assert!(started.elapsed() >= Duration::from_secs(52));
        assert_eq!(
            engine.outcome().unwrap().record.orf_wcpm,
            Some(10)
        );
    }
}
