use crate::models::{ErrorBreakdown, ErrorMark, OrfMetrics};

/// Rounded percentage, 0..=100. Callers guard the zero denominator.
pub(crate) fn percent(part: u32, whole: u32) -> u32 {
    debug_assert!(whole > 0);
    let value = (f64::from(part) * 100.0 / f64::from(whole)).round();
    (value.max(0.0) as u32).min(100)
}

/// Fluency metrics for one reading of a passage.
///
/// Self-corrected marks never count as errors. A zero-length passage reports
/// 100% accuracy and a 0% error rate; zero elapsed seconds reports 0 WCPM.
/// Identical inputs always produce identical output.
pub fn compute_orf_metrics<'a, I>(total_words: u32, errors: I, elapsed_secs: u64) -> OrfMetrics
where
    I: IntoIterator<Item = &'a ErrorMark>,
{
    let (mut errors_total, mut self_corrections) = (0u32, 0u32);
    for mark in errors {
        if mark.corrected {
            self_corrections += 1;
        } else {
            errors_total += 1;
        }
    }

    let words_correct = total_words.saturating_sub(errors_total);

    let (accuracy_pct, error_rate) = if total_words == 0 {
        (100, 0)
    } else {
        (
            percent(words_correct, total_words),
            percent(errors_total, total_words),
        )
    };

    let wcpm = if elapsed_secs == 0 {
        0
    } else {
        let minutes = elapsed_secs as f64 / 60.0;
        (f64::from(words_correct) / minutes).round().max(0.0) as u32
    };

    OrfMetrics {
        total_words,
        words_correct,
        errors_total,
        accuracy_pct,
        wcpm,
        self_corrections,
        error_rate,
    }
}

/// Counts marks per error type, self-corrected ones included.
pub fn error_breakdown<'a, I>(errors: I) -> ErrorBreakdown
where
    I: IntoIterator<Item = &'a ErrorMark>,
{
    let mut breakdown = ErrorBreakdown::new();
    for mark in errors {
        let entry = breakdown.entry(mark.error_type).or_default();
        entry.marked += 1;
        if mark.corrected {
            entry.corrected += 1;
        }
    }
    breakdown
}
