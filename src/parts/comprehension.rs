use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::models::{
    ComprehensionResult, ComprehensionSummary, Passage, Question, QuestionCategory,
    QuestionResponse, Tally,
};
use crate::timer::Stopwatch;

use super::{PhaseError, PhaseResult};

/// Shown once after an answer is submitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComprehensionPhase {
    Reading,
    Question {
        index: usize,
        feedback: Option<AnswerFeedback>,
    },
    Review {
        summary: ComprehensionSummary,
    },
    Complete,
}

impl ComprehensionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ComprehensionPhase::Reading => "reading",
            ComprehensionPhase::Question { .. } => "questions",
            ComprehensionPhase::Review { .. } => "review",
            ComprehensionPhase::Complete => "complete",
        }
    }
}

/// Passage followed by multiple-choice questions, one at a time.
///
/// The passage itself is untimed for the reader; a hidden stopwatch covers the
/// whole part so the attempt duration includes it.
#[derive(Debug, Clone)]
pub struct ComprehensionSession {
    passage_id: String,
    passage_text: String,
    questions: Vec<Question>,
    phase: ComprehensionPhase,
    stopwatch: Stopwatch,
    responses: Vec<QuestionResponse>,
    skipped: Vec<QuestionCategory>,
}

impl ComprehensionSession {
    pub fn new(passage: &Passage, questions: Vec<Question>, now: Instant) -> Self {
        let mut stopwatch = Stopwatch::new();
        stopwatch.start(now);
        Self {
            passage_id: passage.id.clone(),
            passage_text: passage.text.clone(),
            questions,
            phase: ComprehensionPhase::Reading,
            stopwatch,
            responses: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn passage_text(&self) -> &str {
        &self.passage_text
    }

    pub fn phase(&self) -> &ComprehensionPhase {
        &self.phase
    }

    pub fn responses(&self) -> &[QuestionResponse] {
        &self.responses
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            ComprehensionPhase::Question { index, .. } => self.questions.get(index),
            _ => None,
        }
    }

    /// Totals count every question reached, answered or skipped.
    pub fn summary(&self) -> ComprehensionSummary {
        let mut by_type: BTreeMap<QuestionCategory, Tally> = BTreeMap::new();
        for response in &self.responses {
            by_type
                .entry(response.question_type)
                .or_default()
                .record(response.is_correct);
        }
        for category in &self.skipped {
            by_type.entry(*category).or_default().record(false);
        }

        let correct_answers = by_type.values().map(|tally| tally.correct).sum();
        let total_questions = by_type.values().map(|tally| tally.total).sum();
        ComprehensionSummary {
            correct_answers,
            total_questions,
            by_type,
        }
    }

    fn wrong_phase(&self, action: &'static str) -> PhaseError {
        PhaseError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    fn enter_review(&mut self, now: Instant) {
        self.stopwatch.stop(now);
        self.phase = ComprehensionPhase::Review {
            summary: self.summary(),
        };
    }

    pub fn start_questions(&mut self, now: Instant) -> PhaseResult<()> {
        if self.phase != ComprehensionPhase::Reading {
            return Err(self.wrong_phase("start questions"));
        }
        if self.questions.is_empty() {
            self.enter_review(now);
        } else {
            self.phase = ComprehensionPhase::Question {
                index: 0,
                feedback: None,
            };
        }
        Ok(())
    }

    pub fn submit_answer(&mut self, choice: usize) -> PhaseResult<AnswerFeedback> {
        let ComprehensionPhase::Question { index, feedback } = self.phase else {
            return Err(self.wrong_phase("submit answer"));
        };
        if feedback.is_some() {
            return Err(PhaseError::AlreadyAnswered);
        }
        let question = &self.questions[index];
        if choice >= question.choices.len() {
            return Err(PhaseError::InvalidChoice {
                choice,
                available: question.choices.len(),
            });
        }

        let shown = AnswerFeedback {
            is_correct: choice == question.correct_index,
            correct_index: question.correct_index,
        };
        self.responses.push(QuestionResponse {
            question_id: question.id.clone(),
            selected_index: choice,
            is_correct: shown.is_correct,
            question_type: question.category,
        });
        self.phase = ComprehensionPhase::Question {
            index,
            feedback: Some(shown),
        };
        Ok(shown)
    }

    /// Leaves the current question unanswered and moves on.
    pub fn skip_question(&mut self, now: Instant) -> PhaseResult<()> {
        let ComprehensionPhase::Question { index, feedback } = self.phase else {
            return Err(self.wrong_phase("skip question"));
        };
        if feedback.is_some() {
            return Err(PhaseError::AlreadyAnswered);
        }
        self.skipped.push(self.questions[index].category);
        self.advance_from(index, now);
        Ok(())
    }

    pub fn next(&mut self, now: Instant) -> PhaseResult<()> {
        let ComprehensionPhase::Question { index, feedback } = self.phase else {
            return Err(self.wrong_phase("next question"));
        };
        if feedback.is_none() {
            return Err(PhaseError::AnswerRequired);
        }
        self.advance_from(index, now);
        Ok(())
    }

    fn advance_from(&mut self, index: usize, now: Instant) {
        let next = index + 1;
        if next < self.questions.len() {
            self.phase = ComprehensionPhase::Question {
                index: next,
                feedback: None,
            };
        } else {
            self.enter_review(now);
        }
    }

    pub fn finalize(&mut self, now: Instant) -> PhaseResult<ComprehensionResult> {
        if !matches!(self.phase, ComprehensionPhase::Review { .. }) {
            return Err(self.wrong_phase("finalize"));
        }
        Ok(self.take_result(now))
    }

    /// Operator cancel. Unreached questions are left out of the totals.
    pub fn cancel(&mut self, now: Instant) -> Option<ComprehensionResult> {
        if self.phase == ComprehensionPhase::Complete {
            return None;
        }
        self.stopwatch.stop(now);
        if self.responses.is_empty() && self.skipped.is_empty() {
            self.phase = ComprehensionPhase::Complete;
            return None;
        }
        Some(self.take_result(now))
    }

    fn take_result(&mut self, now: Instant) -> ComprehensionResult {
        let summary = self.summary();
        self.phase = ComprehensionPhase::Complete;
        self.skipped.clear();

        ComprehensionResult {
            passage_id: self.passage_id.clone(),
            responses: std::mem::take(&mut self.responses),
            summary,
            duration_secs: self.stopwatch.elapsed_secs_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Band, Choice};
    use std::time::Duration;

    fn passage() -> Passage {
        Passage {
            id: "p-1".into(),
            band: Band::Elementary,
            title: "The Kite".into(),
            word_count: 5,
            text: "Sam flew a red kite.".into(),
        }
    }

    fn question(id: &str, category: QuestionCategory, correct_index: usize) -> Question {
        Question {
            id: id.into(),
            passage_id: "p-1".into(),
            prompt: "What did Sam fly?".into(),
            choices: ["a kite", "a plane", "a bird"]
                .iter()
                .enumerate()
                .map(|(i, text)| Choice {
                    label: ((b'A' + i as u8) as char).to_string(),
                    text: text.to_string(),
                })
                .collect(),
            correct_index,
            category,
            difficulty: Band::Elementary,
        }
    }

    fn quiz(now: Instant) -> ComprehensionSession {
        ComprehensionSession::new(
            &passage(),
            vec![
                question("q1", QuestionCategory::Literal, 0),
                question("q2", QuestionCategory::Inferential, 1),
                question("q3", QuestionCategory::Literal, 2),
                question("q4", QuestionCategory::Vocab, 0),
            ],
            now,
        )
    }

    #[test]
    fn feedback_is_shown_once_per_question() {
        let t0 = Instant::now();
        let mut session = quiz(t0);
        assert!(session.submit_answer(0).is_err());
        session.start_questions(t0).unwrap();

        assert_eq!(session.next(t0), Err(PhaseError::AnswerRequired));
        let feedback = session.submit_answer(1).unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_index, 0);

        assert_eq!(session.submit_answer(0), Err(PhaseError::AlreadyAnswered));
        assert_eq!(session.skip_question(t0), Err(PhaseError::AlreadyAnswered));
        assert_eq!(session.responses().len(), 1);
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let t0 = Instant::now();
        let mut session = quiz(t0);
        session.start_questions(t0).unwrap();
        assert_eq!(
            session.submit_answer(3),
            Err(PhaseError::InvalidChoice {
                choice: 3,
                available: 3
            })
        );
        assert!(session.responses().is_empty());
    }

    #[test]
    fn by_type_totals_sum_to_total_questions() {
        let t0 = Instant::now();
        let mut session = quiz(t0);
        session.start_questions(t0).unwrap();

        session.submit_answer(0).unwrap();
        session.next(t0).unwrap();
        session.skip_question(t0).unwrap();
        session.submit_answer(2).unwrap();
        session.next(t0).unwrap();
        session.submit_answer(1).unwrap();
        session.next(t0 + Duration::from_secs(40)).unwrap();

        let ComprehensionPhase::Review { summary } = session.phase().clone() else {
            panic!("expected review, got {:?}", session.phase());
        };
        let by_type_total: u32 = summary.by_type.values().map(|tally| tally.total).sum();
        assert_eq!(summary.total_questions, 4);
        assert_eq!(by_type_total, summary.total_questions);

        let correct = session.responses().iter().filter(|r| r.is_correct).count();
        assert_eq!(summary.correct_answers as usize, correct);
        assert_eq!(summary.correct_answers, 2);
        assert_eq!(summary.by_type[&QuestionCategory::Literal], Tally::new(2, 2));
        assert_eq!(summary.by_type[&QuestionCategory::Inferential], Tally::new(0, 1));

        let result = session.finalize(t0 + Duration::from_secs(45)).unwrap();
        assert_eq!(result.responses.len(), 3);
        assert_eq!(result.duration_secs, 40);
    }

    #[test]
    fn no_questions_goes_straight_to_review() {
        let t0 = Instant::now();
        let mut session = ComprehensionSession::new(&passage(), Vec::new(), t0);
        session.start_questions(t0).unwrap();
        let result = session.finalize(t0).unwrap();
        assert_eq!(result.summary, ComprehensionSummary::default());
    }

    #[test]
    fn cancel_keeps_reached_questions_only() {
        let t0 = Instant::now();
        let mut session = quiz(t0);
        assert!(session.clone().cancel(t0).is_none());

        session.start_questions(t0).unwrap();
        session.submit_answer(0).unwrap();
        let result = session.cancel(t0 + Duration::from_secs(12)).unwrap();
        assert_eq!(result.summary.total_questions, 1);
        assert_eq!(result.summary.correct_answers, 1);
        assert_eq!(result.duration_secs, 12);
        assert_eq!(session.phase(), &ComprehensionPhase::Complete);
    }
}
