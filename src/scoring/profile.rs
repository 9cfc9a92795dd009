use crate::models::{
    Confidence, DomainScore, OrfMetrics, PartOutcome, PartResult, ReadingDomain, ReadingProfile,
    Tally,
};

use super::config::ScoringPolicy;
use super::orf::percent;

/// Raw per-part counts feeding the profile. Absent parts stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileInputs {
    pub decoding: Option<Tally>,
    pub word_recognition: Option<Tally>,
    pub orf: Option<OrfMetrics>,
    pub orf_low_confidence: bool,
    pub comprehension: Option<Tally>,
}

impl ProfileInputs {
    pub fn from_outcomes(outcomes: &[PartOutcome]) -> Self {
        let mut inputs = Self::default();
        for result in outcomes.iter().filter_map(|outcome| outcome.result.as_ref()) {
            match result {
                PartResult::Orf(orf) => {
                    inputs.orf = Some(orf.metrics);
                    inputs.orf_low_confidence = orf.low_confidence;
                }
                PartResult::WordList(trial) => {
                    inputs.word_recognition = Some(Tally::new(
                        trial.summary.correct_items,
                        trial.summary.total_items,
                    ));
                }
                PartResult::Pseudowords(trial) => {
                    inputs.decoding = Some(Tally::new(
                        trial.summary.correct_items,
                        trial.summary.total_items,
                    ));
                }
                PartResult::Comprehension(quiz) => {
                    inputs.comprehension = Some(Tally::new(
                        quiz.summary.correct_answers,
                        quiz.summary.total_questions,
                    ));
                }
            }
        }
        inputs
    }
}

fn tally_score(tally: Option<Tally>) -> Option<u32> {
    tally
        .filter(|tally| !tally.is_empty())
        .map(|tally| percent(tally.correct.min(tally.total), tally.total))
}

/// Rate against the fluent benchmark, scaled down by inaccuracy.
fn fluency_score(metrics: Option<OrfMetrics>, policy: &ScoringPolicy) -> Option<u32> {
    let metrics = metrics.filter(|metrics| metrics.total_words > 0)?;
    let benchmark = f64::from(policy.fluent_wcpm.max(1));
    let rate = (f64::from(metrics.wcpm) * 100.0 / benchmark).min(100.0);
    let scaled = rate * f64::from(metrics.accuracy_pct.min(100)) / 100.0;
    Some(scaled.round().clamp(0.0, 100.0) as u32)
}

fn profile_confidence(domains: &[DomainScore]) -> Confidence {
    let ranks = domains.iter().map(|entry| entry.band.rank());
    let (Some(min), Some(max)) = (ranks.clone().min(), ranks.max()) else {
        return Confidence::Low;
    };
    let spread = max - min;
    let measured = domains.len();

    if measured >= 3 && spread <= 1 {
        Confidence::High
    } else if (measured >= 2 && spread <= 1) || (measured >= 3 && spread == 2) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Aggregates whichever domains were measured into a profile.
///
/// Unmeasured domains are left out entirely, never scored as zero. With nothing
/// measured the profile has no band, low confidence and empty lists.
pub fn build_reading_profile(inputs: &ProfileInputs, policy: &ScoringPolicy) -> ReadingProfile {
    let domains: Vec<DomainScore> = ReadingDomain::ALL
        .iter()
        .filter_map(|domain| {
            let score = match domain {
                ReadingDomain::Decoding => tally_score(inputs.decoding),
                ReadingDomain::WordRecognition => tally_score(inputs.word_recognition),
                ReadingDomain::Fluency => fluency_score(inputs.orf, policy),
                ReadingDomain::Comprehension => tally_score(inputs.comprehension),
            }?;
            Some(DomainScore {
                domain: *domain,
                score,
                band: policy.bands.band_for(score),
            })
        })
        .collect();

    let overall_band = domains.iter().map(|entry| entry.band).min();

    let mut confidence = profile_confidence(&domains);
    let fluency_measured = domains
        .iter()
        .any(|entry| entry.domain == ReadingDomain::Fluency);
    if fluency_measured && inputs.orf_low_confidence {
        confidence = confidence.lowered();
    }

    let strengths = domains
        .iter()
        .filter(|entry| entry.score >= policy.strength_min)
        .map(|entry| entry.domain)
        .collect();
    let needs = domains
        .iter()
        .filter(|entry| entry.score < policy.need_below)
        .map(|entry| entry.domain)
        .collect();
    let suggested_focus = match domains.iter().map(|entry| entry.score).min() {
        Some(lowest) => domains
            .iter()
            .filter(|entry| entry.score == lowest)
            .map(|entry| entry.domain)
            .collect(),
        None => Vec::new(),
    };

    ReadingProfile {
        domains,
        overall_band,
        confidence,
        strengths,
        needs,
        suggested_focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Band;
    use crate::scoring::compute_orf_metrics;

    fn orf(total_words: u32, elapsed_secs: u64) -> OrfMetrics {
        compute_orf_metrics(total_words, std::iter::empty(), elapsed_secs)
    }

    #[test]
    fn empty_inputs_give_an_indeterminate_profile() {
        let profile = build_reading_profile(&ProfileInputs::default(), &ScoringPolicy::default());

        assert!(profile.is_indeterminate());
        assert!(profile.domains.is_empty());
        assert_eq!(profile.confidence, Confidence::Low);
        assert!(profile.strengths.is_empty());
        assert!(profile.needs.is_empty());
        assert!(profile.suggested_focus.is_empty());
    }

    #[test]
    fn absent_domains_are_excluded_not_zeroed() {
        let inputs = ProfileInputs {
            comprehension: Some(Tally::new(9, 10)),
            ..Default::default()
        };
        let profile = build_reading_profile(&inputs, &ScoringPolicy::default());

        assert_eq!(profile.domains.len(), 1);
        assert_eq!(profile.overall_band, Some(Band::Advanced));
        assert_eq!(profile.needs, Vec::<ReadingDomain>::new());
    }

    #[test]
    fn overall_band_is_the_lowest_measured_band() {
        let inputs = ProfileInputs {
            decoding: Some(Tally::new(18, 20)),
            word_recognition: Some(Tally::new(11, 20)),
            comprehension: Some(Tally::new(8, 10)),
            ..Default::default()
        };
        let profile = build_reading_profile(&inputs, &ScoringPolicy::default());

        assert_eq!(profile.overall_band, Some(Band::Elementary));
        assert_eq!(profile.suggested_focus, vec![ReadingDomain::WordRecognition]);
        assert_eq!(profile.needs, vec![ReadingDomain::WordRecognition]);
        assert_eq!(
            profile.strengths,
            vec![ReadingDomain::Decoding, ReadingDomain::Comprehension]
        );
    }

    #[test]
    fn fluency_score_blends_rate_and_accuracy() {
        let inputs = ProfileInputs {
            orf: Some(compute_orf_metrics(150, std::iter::empty(), 60)),
            ..Default::default()
        };
        let profile = build_reading_profile(&inputs, &ScoringPolicy::default());
        let fluency = profile.score_for(ReadingDomain::Fluency).unwrap();
        assert_eq!(fluency.score, 100);

        let slow = ProfileInputs {
            orf: Some(orf(75, 60)),
            ..Default::default()
        };
        let profile = build_reading_profile(&slow, &ScoringPolicy::default());
        assert_eq!(profile.score_for(ReadingDomain::Fluency).unwrap().score, 50);
    }

    #[test]
    fn agreement_across_more_domains_raises_confidence() {
        let policy = ScoringPolicy::default();
        let one = ProfileInputs {
            decoding: Some(Tally::new(15, 20)),
            ..Default::default()
        };
        let two = ProfileInputs {
            word_recognition: Some(Tally::new(16, 20)),
            ..one.clone()
        };
        let three = ProfileInputs {
            comprehension: Some(Tally::new(7, 10)),
            ..two.clone()
        };

        assert_eq!(build_reading_profile(&one, &policy).confidence, Confidence::Low);
        assert_eq!(build_reading_profile(&two, &policy).confidence, Confidence::Medium);
        assert_eq!(build_reading_profile(&three, &policy).confidence, Confidence::High);
    }

    #[test]
    fn scattered_domains_lower_confidence() {
        let inputs = ProfileInputs {
            decoding: Some(Tally::new(2, 20)),
            word_recognition: Some(Tally::new(19, 20)),
            ..Default::default()
        };
        let profile = build_reading_profile(&inputs, &ScoringPolicy::default());
        assert_eq!(profile.confidence, Confidence::Low);
    }

    #[test]
    fn short_orf_reading_lowers_confidence_one_step() {
        let policy = ScoringPolicy::default();
        let mut inputs = ProfileInputs {
            decoding: Some(Tally::new(15, 20)),
            word_recognition: Some(Tally::new(15, 20)),
            orf: Some(orf(100, 60)),
            ..Default::default()
        };
        let steady = build_reading_profile(&inputs, &policy).confidence;
        inputs.orf_low_confidence = true;
        let flagged = build_reading_profile(&inputs, &policy).confidence;

        assert_eq!(flagged, steady.lowered());
    }

    #[test]
    fn empty_tallies_count_as_unmeasured() {
        let inputs = ProfileInputs {
            decoding: Some(Tally::new(0, 0)),
            ..Default::default()
        };
        assert!(build_reading_profile(&inputs, &ScoringPolicy::default()).is_indeterminate());
    }
}
