//! Flat record of a finished attempt, as handed to the persistence sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::Band;
use super::marks::ErrorMark;
use super::part::{PartOutcome, PartResult};
use super::placement::{LearnerGroup, PlacementLevel, PlacementPlan, PlacementResult};
use super::profile::{Confidence, DomainScore, ReadingDomain, ReadingProfile};
use super::response::{ItemResponse, QuestionResponse};

/// Identity and timing of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptContext {
    pub id: String,
    pub device_id: String,
    pub learner_group: LearnerGroup,
    pub target_band: Band,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub id: String,
    pub device_id: String,
    pub learner_group: LearnerGroup,
    pub target_band: Band,
    pub result_band: Option<Band>,
    pub confidence: Confidence,
    pub total_duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    pub orf_total_words: Option<u32>,
    pub orf_words_correct: Option<u32>,
    pub orf_errors_total: Option<u32>,
    pub orf_accuracy_pct: Option<u32>,
    pub orf_wcpm: Option<u32>,
    pub orf_self_corrections: Option<u32>,
    pub orf_error_rate: Option<u32>,
    pub error_marks: Vec<ErrorMark>,

    pub word_responses: Vec<ItemResponse>,
    pub pseudoword_responses: Vec<ItemResponse>,

    pub comprehension_correct: Option<u32>,
    pub comprehension_total: Option<u32>,
    pub comprehension_responses: Vec<QuestionResponse>,

    pub domain_scores: Vec<DomainScore>,
    pub strengths: Vec<ReadingDomain>,
    pub needs: Vec<ReadingDomain>,
    pub suggested_focus: Vec<ReadingDomain>,

    pub placement_level: PlacementLevel,
    pub placement_confidence: Confidence,
    pub placement_score: Option<u32>,
    pub plan: PlacementPlan,
}

impl AttemptRecord {
    pub fn new(
        context: AttemptContext,
        outcomes: &[PartOutcome],
        profile: &ReadingProfile,
        placement: &PlacementResult,
        plan: &PlacementPlan,
    ) -> Self {
        let mut record = Self {
            id: context.id,
            device_id: context.device_id,
            learner_group: context.learner_group,
            target_band: context.target_band,
            result_band: profile.overall_band,
            confidence: profile.confidence,
            total_duration_secs: 0,
            started_at: context.started_at,
            completed_at: context.completed_at,
            orf_total_words: None,
            orf_words_correct: None,
            orf_errors_total: None,
            orf_accuracy_pct: None,
            orf_wcpm: None,
            orf_self_corrections: None,
            orf_error_rate: None,
            error_marks: Vec::new(),
            word_responses: Vec::new(),
            pseudoword_responses: Vec::new(),
            comprehension_correct: None,
            comprehension_total: None,
            comprehension_responses: Vec::new(),
            domain_scores: profile.domains.clone(),
            strengths: profile.strengths.clone(),
            needs: profile.needs.clone(),
            suggested_focus: profile.suggested_focus.clone(),
            placement_level: placement.level,
            placement_confidence: placement.confidence,
            placement_score: placement.weighted_score,
            plan: plan.clone(),
        };

        for result in outcomes.iter().filter_map(|outcome| outcome.result.as_ref()) {
            record.total_duration_secs += result.duration_secs();
            match result {
                PartResult::Orf(orf) => {
                    let metrics = orf.metrics;
                    record.orf_total_words = Some(metrics.total_words);
                    record.orf_words_correct = Some(metrics.words_correct);
                    record.orf_errors_total = Some(metrics.errors_total);
                    record.orf_accuracy_pct = Some(metrics.accuracy_pct);
                    record.orf_wcpm = Some(metrics.wcpm);
                    record.orf_self_corrections = Some(metrics.self_corrections);
                    record.orf_error_rate = Some(metrics.error_rate);
                    record.error_marks = orf.errors.clone();
                }
                PartResult::WordList(trial) => {
                    record.word_responses = trial.responses.clone();
                }
                PartResult::Pseudowords(trial) => {
                    record.pseudoword_responses = trial.responses.clone();
                }
                PartResult::Comprehension(quiz) => {
                    record.comprehension_correct = Some(quiz.summary.correct_answers);
                    record.comprehension_total = Some(quiz.summary.total_questions);
                    record.comprehension_responses = quiz.responses.clone();
                }
            }
        }

        record
    }
}
