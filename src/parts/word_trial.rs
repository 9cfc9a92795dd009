use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::capture::ResponseRecorder;
use crate::models::{ItemResponse, TrialSummary, WordList, WordListKind, WordTrialResult};
use crate::scoring::orf::percent;
use crate::timer::Stopwatch;

use super::{PhaseError, PhaseResult};

/// Operator verdict for the item on screen. A skip is scored as incorrect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrialAction {
    Correct,
    Incorrect,
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrialPhase {
    Instructions,
    Presenting { index: usize },
    Review { summary: TrialSummary },
    Complete,
}

impl TrialPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TrialPhase::Instructions => "instructions",
            TrialPhase::Presenting { .. } => "reading",
            TrialPhase::Review { .. } => "review",
            TrialPhase::Complete => "complete",
        }
    }
}

/// Word or pseudoword list read one item at a time.
#[derive(Debug, Clone)]
pub struct WordTrialSession {
    list_id: String,
    kind: WordListKind,
    items: Vec<String>,
    phase: TrialPhase,
    stopwatch: Stopwatch,
    recorder: ResponseRecorder<ItemResponse>,
}

fn summarize(responses: &[ItemResponse], elapsed_secs: u64) -> TrialSummary {
    let total_items = u32::try_from(responses.len()).unwrap_or(u32::MAX);
    let correct_items =
        u32::try_from(responses.iter().filter(|r| r.is_correct).count()).unwrap_or(u32::MAX);
    let accuracy_pct = if total_items == 0 {
        0
    } else {
        percent(correct_items, total_items)
    };
    let items_per_minute = if elapsed_secs == 0 {
        0
    } else {
        (f64::from(total_items) * 60.0 / elapsed_secs as f64).round() as u32
    };

    TrialSummary {
        correct_items,
        incorrect_items: total_items - correct_items,
        total_items,
        accuracy_pct,
        items_per_minute,
    }
}

impl WordTrialSession {
    pub fn new(list: &WordList) -> Self {
        Self {
            list_id: list.id.clone(),
            kind: list.kind,
            items: list.items.clone(),
            phase: TrialPhase::Instructions,
            stopwatch: Stopwatch::new(),
            recorder: ResponseRecorder::new(),
        }
    }

    pub fn kind(&self) -> WordListKind {
        self.kind
    }

    pub fn phase(&self) -> &TrialPhase {
        &self.phase
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn responses(&self) -> &[ItemResponse] {
        self.recorder.responses()
    }

    pub fn current_item(&self) -> Option<&str> {
        match self.phase {
            TrialPhase::Presenting { index } => self.items.get(index).map(String::as_str),
            _ => None,
        }
    }

    pub fn summary(&self, now: Instant) -> TrialSummary {
        summarize(self.recorder.responses(), self.stopwatch.elapsed_secs_at(now))
    }

    fn wrong_phase(&self, action: &'static str) -> PhaseError {
        PhaseError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn begin(&mut self, now: Instant) -> PhaseResult<()> {
        if self.phase != TrialPhase::Instructions {
            return Err(self.wrong_phase("begin"));
        }
        self.stopwatch.start(now);
        if self.items.is_empty() {
            self.stopwatch.stop(now);
            self.phase = TrialPhase::Review {
                summary: self.summary(now),
            };
        } else {
            self.recorder.present(now);
            self.phase = TrialPhase::Presenting { index: 0 };
        }
        Ok(())
    }

    /// Records the verdict for the current item and shows the next one, or
    /// moves to review after the last item.
    pub fn respond(&mut self, action: TrialAction, now: Instant) -> PhaseResult<ItemResponse> {
        let TrialPhase::Presenting { index } = self.phase else {
            return Err(self.wrong_phase("respond"));
        };
        let item_text = self.items[index].clone();
        let is_correct = action == TrialAction::Correct;

        let response = self
            .recorder
            .record(now, |latency_ms| ItemResponse {
                item_text,
                is_correct,
                response_time_ms: Some(latency_ms),
            })
            .cloned()
            .ok_or_else(|| self.wrong_phase("respond"))?;

        let next = index + 1;
        if next < self.items.len() {
            self.recorder.present(now);
            self.phase = TrialPhase::Presenting { index: next };
        } else {
            self.stopwatch.stop(now);
            self.phase = TrialPhase::Review {
                summary: self.summary(now),
            };
        }
        Ok(response)
    }

    pub fn finalize(&mut self, now: Instant) -> PhaseResult<WordTrialResult> {
        if !matches!(self.phase, TrialPhase::Review { .. }) {
            return Err(self.wrong_phase("finalize"));
        }
        Ok(self.take_result(now))
    }

    /// Operator cancel. Nothing is produced if no item was answered.
    pub fn cancel(&mut self, now: Instant) -> Option<WordTrialResult> {
        if self.phase == TrialPhase::Complete {
            return None;
        }
        self.stopwatch.stop(now);
        self.recorder.dismiss();
        if self.recorder.is_empty() {
            self.phase = TrialPhase::Complete;
            return None;
        }
        Some(self.take_result(now))
    }

    fn take_result(&mut self, now: Instant) -> WordTrialResult {
        let summary = self.summary(now);
        let duration_secs = self.stopwatch.elapsed_secs_at(now);
        self.phase = TrialPhase::Complete;

        WordTrialResult {
            list_id: self.list_id.clone(),
            kind: self.kind,
            responses: std::mem::take(&mut self.recorder).into_responses(),
            summary,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Band;
    use std::time::Duration;

    fn list(count: usize) -> WordList {
        WordList {
            id: "wl-1".into(),
            band: Band::Beginner,
            kind: WordListKind::Pseudo,
            items: (0..count).map(|index| format!("zib{index}")).collect(),
        }
    }

    #[test]
    fn all_incorrect_gives_zero_accuracy() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(20));
        session.begin(t0).unwrap();

        for step in 1..=20 {
            session
                .respond(TrialAction::Incorrect, t0 + Duration::from_secs(step * 3))
                .unwrap();
        }

        let TrialPhase::Review { summary } = session.phase().clone() else {
            panic!("expected review, got {:?}", session.phase());
        };
        assert_eq!(summary.correct_items, 0);
        assert_eq!(summary.incorrect_items, 20);
        assert_eq!(summary.accuracy_pct, 0);
        assert_eq!(summary.items_per_minute, 20);
    }

    #[test]
    fn skip_counts_as_incorrect() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(3));
        session.begin(t0).unwrap();
        session.respond(TrialAction::Correct, t0).unwrap();
        let skipped = session.respond(TrialAction::Skip, t0).unwrap();
        session.respond(TrialAction::Correct, t0).unwrap();

        assert!(!skipped.is_correct);
        assert_eq!(session.summary(t0).accuracy_pct, 67);
    }

    #[test]
    fn presents_items_in_list_order_with_latency() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(2));
        assert_eq!(session.current_item(), None);
        session.begin(t0).unwrap();
        assert_eq!(session.current_item(), Some("zib0"));

        let first = session
            .respond(TrialAction::Correct, t0 + Duration::from_millis(900))
            .unwrap();
        assert_eq!(first.item_text, "zib0");
        assert_eq!(first.response_time_ms, Some(900));
        assert_eq!(session.current_item(), Some("zib1"));

        let second = session
            .respond(TrialAction::Correct, t0 + Duration::from_millis(2_400))
            .unwrap();
        assert_eq!(second.response_time_ms, Some(1_500));
        assert!(matches!(session.phase(), TrialPhase::Review { .. }));
        assert!(session.respond(TrialAction::Correct, t0).is_err());
    }

    #[test]
    fn empty_list_goes_straight_to_review() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(0));
        session.begin(t0).unwrap();

        let result = session.finalize(t0).unwrap();
        assert_eq!(result.summary, TrialSummary::default());
        assert!(result.responses.is_empty());
    }

    #[test]
    fn finalize_requires_review() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(2));
        session.begin(t0).unwrap();
        assert!(session.finalize(t0).is_err());
    }

    #[test]
    fn cancel_keeps_answered_items_only() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(5));
        session.begin(t0).unwrap();
        session.respond(TrialAction::Correct, t0 + Duration::from_secs(2)).unwrap();
        session.respond(TrialAction::Incorrect, t0 + Duration::from_secs(4)).unwrap();

        let result = session.cancel(t0 + Duration::from_secs(6)).unwrap();
        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.summary.total_items, 2);
        assert_eq!(result.duration_secs, 6);
        assert_eq!(session.phase(), &TrialPhase::Complete);
    }

    #[test]
    fn cancel_before_any_answer_yields_nothing() {
        let t0 = Instant::now();
        let mut session = WordTrialSession::new(&list(5));
        session.begin(t0).unwrap();
        assert!(session.cancel(t0).is_none());
    }
}
