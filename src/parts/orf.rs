use std::collections::BTreeMap;

use tokio::time::Instant;

use crate::models::{ErrorMark, ErrorType, OrfMetrics, OrfResult, Passage};
use crate::scoring::{compute_orf_metrics, error_breakdown};
use crate::timer::Stopwatch;

use super::{PhaseError, PhaseResult};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq)]
pub enum OrfPhase {
    Instructions,
    Reading,
    Marking,
    Review {
        metrics: OrfMetrics,
        low_confidence: bool,
    },
    Complete,
}

impl OrfPhase {
    pub fn name(&self) -> &'static str {
        match self {
            OrfPhase::Instructions => "instructions",
            OrfPhase::Reading => "reading",
            OrfPhase::Marking => "marking",
            OrfPhase::Review { .. } => "review",
            OrfPhase::Complete => "complete",
        }
    }
}

/// Oral reading fluency part: timed read-aloud, then operator error marking.
///
/// Marks are keyed by word position and belong to this session only; they are
/// handed over (and dropped here) when the part finalizes or is cancelled.
#[derive(Debug, Clone)]
pub struct OrfSession {
    passage_id: String,
    words: Vec<String>,
    phase: OrfPhase,
    stopwatch: Stopwatch,
    marks: BTreeMap<usize, ErrorMark>,
    active_type: ErrorType,
    low_confidence_secs: u64,
}

impl OrfSession {
    pub fn new(passage: &Passage, low_confidence_secs: u64) -> Self {
        Self {
            passage_id: passage.id.clone(),
            words: passage.text.split_whitespace().map(str::to_string).collect(),
            phase: OrfPhase::Instructions,
            stopwatch: Stopwatch::new(),
            marks: BTreeMap::new(),
            active_type: ErrorType::default(),
            low_confidence_secs,
        }
    }

    pub fn passage_id(&self) -> &str {
        &self.passage_id
    }

    pub fn phase(&self) -> &OrfPhase {
        &self.phase
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn total_words(&self) -> u32 {
        u32::try_from(self.words.len()).unwrap_or(u32::MAX)
    }

    pub fn marks(&self) -> impl Iterator<Item = &ErrorMark> {
        self.marks.values()
    }

    pub fn mark_at(&self, index: usize) -> Option<&ErrorMark> {
        self.marks.get(&index)
    }

    pub fn active_error_type(&self) -> ErrorType {
        self.active_type
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.stopwatch.elapsed_secs_at(now)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == OrfPhase::Reading && !self.stopwatch.is_running()
    }

    fn wrong_phase(&self, action: &'static str) -> PhaseError {
        PhaseError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn begin_reading(&mut self, now: Instant) -> PhaseResult<()> {
        if self.phase != OrfPhase::Instructions {
            return Err(self.wrong_phase("begin reading"));
        }
        self.stopwatch.start(now);
        self.phase = OrfPhase::Reading;
        Ok(())
    }

    /// Returns whether the timer was running and is now paused.
    pub fn pause(&mut self, now: Instant) -> PhaseResult<bool> {
        if self.phase != OrfPhase::Reading {
            return Err(self.wrong_phase("pause"));
        }
        Ok(self.stopwatch.pause(now))
    }

    pub fn resume(&mut self, now: Instant) -> PhaseResult<bool> {
        if self.phase != OrfPhase::Reading {
            return Err(self.wrong_phase("resume"));
        }
        Ok(self.stopwatch.resume(now))
    }

    pub fn finish_reading(&mut self, now: Instant) -> PhaseResult<()> {
        if self.phase != OrfPhase::Reading {
            return Err(self.wrong_phase("finish reading"));
        }
        self.stopwatch.stop(now);
        self.phase = OrfPhase::Marking;
        Ok(())
    }

    pub fn set_active_error_type(&mut self, error_type: ErrorType) {
        self.active_type = error_type;
    }

    pub fn cycle_active_error_type(&mut self) -> ErrorType {
        self.active_type = self.active_type.next();
        self.active_type
    }

    /// Applies the active palette type to a word.
    pub fn tap_word(&mut self, index: usize) -> PhaseResult<Option<&ErrorMark>> {
        self.mark_word(index, self.active_type)
    }

    /// Marks a word. Marking it again with the same type clears the mark; a
    /// different type replaces it.
    pub fn mark_word(
        &mut self,
        index: usize,
        error_type: ErrorType,
    ) -> PhaseResult<Option<&ErrorMark>> {
        if self.phase != OrfPhase::Marking {
            return Err(self.wrong_phase("mark word"));
        }
        let Some(word) = self.words.get(index) else {
            return Err(PhaseError::WordOutOfRange {
                index,
                len: self.words.len(),
            });
        };

        if self
            .marks
            .get(&index)
            .is_some_and(|existing| existing.error_type == error_type)
        {
            self.marks.remove(&index);
            return Ok(None);
        }

        self.marks
            .insert(index, ErrorMark::new(index, word.clone(), error_type));
        Ok(self.marks.get(&index))
    }

    /// Flips the self-corrected flag, returning the new value.
    pub fn toggle_self_corrected(&mut self, index: usize) -> PhaseResult<bool> {
        if self.phase != OrfPhase::Marking {
            return Err(self.wrong_phase("toggle self-correction"));
        }
        let mark = self
            .marks
            .get_mut(&index)
            .ok_or(PhaseError::NotMarked(index))?;
        mark.corrected = !mark.corrected;
        Ok(mark.corrected)
    }

    /// Drops every mark. The reading time is kept.
    pub fn clear_marks(&mut self) -> PhaseResult<()> {
        if self.phase != OrfPhase::Marking {
            return Err(self.wrong_phase("clear marks"));
        }
        self.marks.clear();
        Ok(())
    }

    /// Metrics for the current marks and elapsed time, for a running display.
    pub fn live_metrics(&self, now: Instant) -> OrfMetrics {
        compute_orf_metrics(self.total_words(), self.marks.values(), self.elapsed_secs(now))
    }

    pub fn review(&mut self, now: Instant) -> PhaseResult<OrfMetrics> {
        if self.phase != OrfPhase::Marking {
            return Err(self.wrong_phase("review"));
        }
        let metrics = self.live_metrics(now);
        let low_confidence = self.elapsed_secs(now) < self.low_confidence_secs;
        if low_confidence {
            crate::log_warn!(
                "ORF reading of passage {} lasted {}s; metrics are low-confidence",
                self.passage_id,
                self.elapsed_secs(now)
            );
        }
        self.phase = OrfPhase::Review {
            metrics,
            low_confidence,
        };
        Ok(metrics)
    }

    pub fn back_to_marking(&mut self) -> PhaseResult<()> {
        if !matches!(self.phase, OrfPhase::Review { .. }) {
            return Err(self.wrong_phase("return to marking"));
        }
        self.phase = OrfPhase::Marking;
        Ok(())
    }

    pub fn finalize(&mut self, now: Instant) -> PhaseResult<OrfResult> {
        if !matches!(self.phase, OrfPhase::Review { .. }) {
            return Err(self.wrong_phase("finalize"));
        }
        Ok(self.take_result(now))
    }

    /// Operator cancel. Only a finished read yields a result; until the
    /// reader stops there are no marks to score against.
    pub fn cancel(&mut self, now: Instant) -> Option<OrfResult> {
        match self.phase {
            OrfPhase::Complete => None,
            OrfPhase::Instructions => {
                self.phase = OrfPhase::Complete;
                None
            }
            OrfPhase::Reading => {
                self.stopwatch.stop(now);
                self.phase = OrfPhase::Complete;
                None
            }
            OrfPhase::Marking | OrfPhase::Review { .. } => {
                self.stopwatch.stop(now);
                Some(self.take_result(now))
            }
        }
    }

    fn take_result(&mut self, now: Instant) -> OrfResult {
        let duration_secs = self.elapsed_secs(now);
        let errors: Vec<ErrorMark> = std::mem::take(&mut self.marks).into_values().collect();
        let metrics = compute_orf_metrics(self.total_words(), &errors, duration_secs);
        let breakdown = error_breakdown(&errors);
        self.phase = OrfPhase::Complete;

        OrfResult {
            passage_id: self.passage_id.clone(),
            metrics,
            errors,
            breakdown,
            low_confidence: duration_secs < self.low_confidence_secs,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Band;
    use std::time::Duration;

    fn passage(words: usize) -> Passage {
        let text = (0..words)
            .map(|index| format!("word{index}"))
            .collect::<Vec<_>>()
            .join(" ");
        Passage {
            id: "p-orf".into(),
            band: Band::Elementary,
            title: "Test".into(),
            word_count: words as u32,
            text,
        }
    }

    fn marking_session(words: usize, read_secs: u64) -> (OrfSession, Instant) {
        let t0 = Instant::now();
        let mut session = OrfSession::new(&passage(words), 30);
        session.begin_reading(t0).unwrap();
        let end = t0 + Duration::from_secs(read_secs);
        session.finish_reading(end).unwrap();
        (session, end)
    }

    #[test]
    fn tokenizes_passage_on_whitespace_once() {
        let mut source = passage(0);
        source.text = "The  cat\tsat\non the mat".into();
        let session = OrfSession::new(&source, 30);
        assert_eq!(session.words(), ["The", "cat", "sat", "on", "the", "mat"]);
        assert_eq!(session.total_words(), 6);
    }

    #[test]
    fn phases_advance_in_order() {
        let t0 = Instant::now();
        let mut session = OrfSession::new(&passage(10), 30);

        assert!(session.finish_reading(t0).is_err());
        assert!(session.mark_word(0, ErrorType::Omission).is_err());
        session.begin_reading(t0).unwrap();
        assert!(session.begin_reading(t0).is_err());
        assert!(session.review(t0).is_err());
        session.finish_reading(t0 + Duration::from_secs(40)).unwrap();
        assert_eq!(session.phase(), &OrfPhase::Marking);
        session.review(t0 + Duration::from_secs(40)).unwrap();
        assert_eq!(session.phase().name(), "review");
    }

    #[test]
    fn pause_freezes_reading_time() {
        let t0 = Instant::now();
        let mut session = OrfSession::new(&passage(100), 30);
        session.begin_reading(t0).unwrap();

        assert!(session.pause(t0 + Duration::from_secs(20)).unwrap());
        assert!(session.is_paused());
        assert!(!session.pause(t0 + Duration::from_secs(21)).unwrap());
        assert!(session.resume(t0 + Duration::from_secs(80)).unwrap());
        session.finish_reading(t0 + Duration::from_secs(120)).unwrap();

        assert_eq!(session.elapsed_secs(t0 + Duration::from_secs(500)), 60);
    }

    #[test]
    fn remarking_same_type_clears_and_other_type_replaces() {
        let (mut session, _) = marking_session(20, 60);

        let mark = session.mark_word(4, ErrorType::Substitution).unwrap().cloned();
        assert_eq!(mark.map(|m| m.word_text), Some("word4".to_string()));

        let replaced = session.mark_word(4, ErrorType::Reversal).unwrap().cloned();
        assert_eq!(replaced.map(|m| m.error_type), Some(ErrorType::Reversal));
        assert_eq!(session.marks().count(), 1);

        assert!(session.mark_word(4, ErrorType::Reversal).unwrap().is_none());
        assert_eq!(session.marks().count(), 0);
    }

    #[test]
    fn tap_uses_the_active_palette_type() {
        let (mut session, _) = marking_session(5, 60);
        session.set_active_error_type(ErrorType::Hesitation);
        session.tap_word(1).unwrap();
        assert_eq!(session.cycle_active_error_type(), ErrorType::Unknown);
        session.tap_word(2).unwrap();

        assert_eq!(session.mark_at(1).unwrap().error_type, ErrorType::Hesitation);
        assert_eq!(session.mark_at(2).unwrap().error_type, ErrorType::Unknown);
    }

    #[test]
    fn rejects_words_outside_the_passage() {
        let (mut session, _) = marking_session(5, 60);
        assert_eq!(
            session.mark_word(5, ErrorType::Omission).unwrap_err(),
            PhaseError::WordOutOfRange { index: 5, len: 5 }
        );
        assert_eq!(
            session.toggle_self_corrected(2).unwrap_err(),
            PhaseError::NotMarked(2)
        );
    }

    #[test]
    fn self_correction_changes_live_error_count() {
        let (mut session, end) = marking_session(100, 60);
        for index in 0..5 {
            session.mark_word(index, ErrorType::Substitution).unwrap();
        }
        assert_eq!(session.live_metrics(end).errors_total, 5);

        assert!(session.toggle_self_corrected(0).unwrap());
        let metrics = session.live_metrics(end);
        assert_eq!(metrics.errors_total, 4);
        assert_eq!(metrics.self_corrections, 1);
        assert_eq!(metrics.wcpm, 96);
    }

    #[test]
    fn clear_all_keeps_the_timer() {
        let (mut session, end) = marking_session(50, 45);
        session.mark_word(1, ErrorType::Omission).unwrap();
        session.clear_marks().unwrap();

        assert_eq!(session.marks().count(), 0);
        assert_eq!(session.elapsed_secs(end + Duration::from_secs(100)), 45);
    }

    #[test]
    fn review_flags_short_readings_and_can_return_to_marking() {
        let (mut session, end) = marking_session(30, 20);
        session.review(end).unwrap();
        assert!(matches!(
            session.phase(),
            OrfPhase::Review {
                low_confidence: true,
                ..
            }
        ));

        session.back_to_marking().unwrap();
        session.mark_word(3, ErrorType::Insertion).unwrap();
        assert_eq!(session.review(end).unwrap().errors_total, 1);
    }

    #[test]
    fn finalize_hands_over_the_marks() {
        let (mut session, end) = marking_session(100, 60);
        for index in [9, 2, 5, 7, 1] {
            session.mark_word(index, ErrorType::Substitution).unwrap();
        }
        session.toggle_self_corrected(7).unwrap();
        let reviewed = session.review(end).unwrap();

        let result = session.finalize(end).unwrap();
        assert_eq!(result.metrics, reviewed);
        assert_eq!(result.metrics.errors_total, 4);
        assert_eq!(result.errors.len(), 5);
        let indexes: Vec<usize> = result.errors.iter().map(|m| m.word_index).collect();
        assert_eq!(indexes, vec![1, 2, 5, 7, 9]);
        assert!(!result.low_confidence);
        assert_eq!(session.marks().count(), 0);
        assert_eq!(session.phase(), &OrfPhase::Complete);
        assert!(session.finalize(end).is_err());
    }

    #[test]
    fn cancel_before_reading_yields_nothing() {
        let mut session = OrfSession::new(&passage(10), 30);
        assert!(session.cancel(Instant::now()).is_none());
        assert_eq!(session.phase(), &OrfPhase::Complete);
    }

    #[test]
    fn cancel_mid_reading_yields_no_result() {
        let t0 = Instant::now();
        let mut session = OrfSession::new(&passage(60), 30);
        session.begin_reading(t0).unwrap();

        assert!(session.cancel(t0 + Duration::from_secs(15)).is_none());
        assert_eq!(session.phase(), &OrfPhase::Complete);
        assert!(session.cancel(t0 + Duration::from_secs(16)).is_none());
    }

    #[test]
    fn cancel_while_marking_keeps_the_finished_read() {
        let t0 = Instant::now();
        let mut session = OrfSession::new(&passage(60), 30);
        session.begin_reading(t0).unwrap();
        session.finish_reading(t0 + Duration::from_secs(15)).unwrap();
        session.mark_word(2, ErrorType::Omission).unwrap();

        let result = session.cancel(t0 + Duration::from_secs(40)).unwrap();
        assert_eq!(result.duration_secs, 15);
        assert_eq!(result.metrics.errors_total, 1);
        assert_eq!(result.metrics.wcpm, 236);
        assert!(result.low_confidence);
    }
}
