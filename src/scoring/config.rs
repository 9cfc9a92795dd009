use serde::{Deserialize, Serialize};

use crate::models::{Band, LearnerGroup, ReadingDomain};

/// Relative importance of each domain for one learner group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainWeights {
    pub decoding: f64,
    pub word_recognition: f64,
    pub fluency: f64,
    pub comprehension: f64,
}

impl DomainWeights {
    pub fn for_domain(&self, domain: ReadingDomain) -> f64 {
        match domain {
            ReadingDomain::Decoding => self.decoding,
            ReadingDomain::WordRecognition => self.word_recognition,
            ReadingDomain::Fluency => self.fluency,
            ReadingDomain::Comprehension => self.comprehension,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupWeights {
    pub youth: DomainWeights,
    pub teen: DomainWeights,
    pub adult: DomainWeights,
    pub senior: DomainWeights,
}

impl GroupWeights {
    pub fn for_group(&self, group: LearnerGroup) -> &DomainWeights {
        match group {
            LearnerGroup::Youth => &self.youth,
            LearnerGroup::Teen => &self.teen,
            LearnerGroup::Adult => &self.adult,
            LearnerGroup::Senior => &self.senior,
        }
    }
}

impl Default for GroupWeights {
    fn default() -> Self {
        Self {
            youth: DomainWeights {
                decoding: 0.35,
                word_recognition: 0.30,
                fluency: 0.20,
                comprehension: 0.15,
            },
            teen: DomainWeights {
                decoding: 0.25,
                word_recognition: 0.25,
                fluency: 0.25,
                comprehension: 0.25,
            },
            adult: DomainWeights {
                decoding: 0.15,
                word_recognition: 0.20,
                fluency: 0.25,
                comprehension: 0.40,
            },
            senior: DomainWeights {
                decoding: 0.10,
                word_recognition: 0.20,
                fluency: 0.30,
                comprehension: 0.40,
            },
        }
    }
}

/// Minimum 0..=100 score for each band above beginner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BandThresholds {
    pub elementary: u32,
    pub intermediate: u32,
    pub advanced: u32,
}

impl BandThresholds {
    pub fn band_for(&self, score: u32) -> Band {
        if score >= self.advanced {
            Band::Advanced
        } else if score >= self.intermediate {
            Band::Intermediate
        } else if score >= self.elementary {
            Band::Elementary
        } else {
            Band::Beginner
        }
    }

    pub fn cutoffs(&self) -> [u32; 3] {
        [self.elementary, self.intermediate, self.advanced]
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            elementary: 50,
            intermediate: 70,
            advanced: 85,
        }
    }
}

/// Tunable policy table for profile and placement scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringPolicy {
    pub bands: BandThresholds,

    /// WCPM that earns a full fluency score before the accuracy factor.
    pub fluent_wcpm: u32,

    /// Domain score at or above which the domain is listed as a strength.
    pub strength_min: u32,
    /// Domain score below which the domain is listed as a need.
    pub need_below: u32,

    /// ORF readings shorter than this are flagged low-confidence.
    pub low_confidence_secs: u64,

    /// Weighted scores this close to a band cutoff lower placement confidence.
    pub borderline_margin: u32,

    pub weights: GroupWeights,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            bands: BandThresholds::default(),
            fluent_wcpm: 150,
            strength_min: 80,
            need_below: 60,
            low_confidence_secs: 30,
            borderline_margin: 3,
            weights: GroupWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_thresholds_are_inclusive_lower_bounds() {
        let bands = BandThresholds::default();
        assert_eq!(bands.band_for(0), Band::Beginner);
        assert_eq!(bands.band_for(49), Band::Beginner);
        assert_eq!(bands.band_for(50), Band::Elementary);
        assert_eq!(bands.band_for(70), Band::Intermediate);
        assert_eq!(bands.band_for(85), Band::Advanced);
        assert_eq!(bands.band_for(100), Band::Advanced);
    }

    #[test]
    fn default_weights_sum_to_one_for_every_group() {
        let weights = GroupWeights::default();
        for group in [
            LearnerGroup::Youth,
            LearnerGroup::Teen,
            LearnerGroup::Adult,
            LearnerGroup::Senior,
        ] {
            let total: f64 = ReadingDomain::ALL
                .iter()
                .map(|domain| weights.for_group(group).for_domain(*domain))
                .sum();
            assert!((total - 1.0).abs() < 1e-9, "{group:?} weights sum to {total}");
        }
    }

    #[test]
    fn partial_policy_json_fills_in_defaults() {
        let policy: ScoringPolicy = serde_json::from_str(r#"{ "fluentWcpm": 120 }"#).unwrap();
        assert_eq!(policy.fluent_wcpm, 120);
        assert_eq!(policy.low_confidence_secs, 30);
        assert_eq!(policy.bands, BandThresholds::default());
    }
}
