use crate::models::{Confidence, LearnerGroup, PlacementLevel, PlacementResult, ReadingProfile};

use super::config::ScoringPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementInput<'a> {
    pub learner_group: LearnerGroup,
    pub profile: &'a ReadingProfile,
}

fn level_for(score: u32, policy: &ScoringPolicy) -> PlacementLevel {
    let bands = &policy.bands;
    if score >= bands.advanced {
        PlacementLevel::Advanced
    } else if score >= bands.intermediate {
        PlacementLevel::Proficient
    } else if score >= bands.elementary {
        PlacementLevel::Developing
    } else {
        PlacementLevel::Foundations
    }
}

/// Group-weighted mean of the measured domain scores.
fn weighted_score(input: &PlacementInput<'_>, policy: &ScoringPolicy) -> Option<u32> {
    let weights = policy.weights.for_group(input.learner_group);
    let (mut weighted_sum, mut weight_total) = (0.0_f64, 0.0_f64);

    for entry in &input.profile.domains {
        let weight = weights.for_domain(entry.domain).max(0.0);
        weighted_sum += weight * f64::from(entry.score);
        weight_total += weight;
    }

    if weight_total <= f64::EPSILON {
        return None;
    }
    Some((weighted_sum / weight_total).round().clamp(0.0, 100.0) as u32)
}

fn is_borderline(score: u32, policy: &ScoringPolicy) -> bool {
    policy
        .bands
        .cutoffs()
        .iter()
        .any(|cutoff| score.abs_diff(*cutoff) < policy.borderline_margin)
}

/// Places a learner from their profile. The profile itself is never modified.
pub fn calculate_placement(input: &PlacementInput<'_>, policy: &ScoringPolicy) -> PlacementResult {
    let profile = input.profile;

    let Some(score) = weighted_score(input, policy) else {
        return PlacementResult {
            learner_group: input.learner_group,
            level: PlacementLevel::Foundations,
            weighted_score: None,
            confidence: Confidence::Low,
            focus: profile.suggested_focus.clone(),
        };
    };

    let mut confidence = profile.confidence;
    if is_borderline(score, policy) {
        confidence = confidence.lowered();
    }

    PlacementResult {
        learner_group: input.learner_group,
        level: level_for(score, policy),
        weighted_score: Some(score),
        confidence,
        focus: profile.suggested_focus.clone(),
    }
}
