use serde::{Deserialize, Serialize};

use super::content::Band;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ReadingDomain {
    Decoding,
    WordRecognition,
    Fluency,
    Comprehension,
}

impl ReadingDomain {
    pub const ALL: [ReadingDomain; 4] = [
        ReadingDomain::Decoding,
        ReadingDomain::WordRecognition,
        ReadingDomain::Fluency,
        ReadingDomain::Comprehension,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReadingDomain::Decoding => "Decoding",
            ReadingDomain::WordRecognition => "Word recognition",
            ReadingDomain::Fluency => "Fluency",
            ReadingDomain::Comprehension => "Comprehension",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// One step lower, saturating at `Low`.
    pub fn lowered(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainScore {
    pub domain: ReadingDomain,
    /// 0..=100
    pub score: u32,
    pub band: Band,
}

/// Aggregated reading profile. `overall_band` is `None` when nothing was measured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProfile {
    pub domains: Vec<DomainScore>,
    pub overall_band: Option<Band>,
    pub confidence: Confidence,
    pub strengths: Vec<ReadingDomain>,
    pub needs: Vec<ReadingDomain>,
    pub suggested_focus: Vec<ReadingDomain>,
}

impl ReadingProfile {
    pub fn score_for(&self, domain: ReadingDomain) -> Option<&DomainScore> {
        self.domains.iter().find(|entry| entry.domain == domain)
    }

    pub fn is_indeterminate(&self) -> bool {
        self.overall_band.is_none()
    }
}
