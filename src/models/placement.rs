use serde::{Deserialize, Serialize};

use super::profile::{Confidence, ReadingDomain};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LearnerGroup {
    Youth,
    Teen,
    Adult,
    Senior,
}

impl LearnerGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearnerGroup::Youth => "youth",
            LearnerGroup::Teen => "teen",
            LearnerGroup::Adult => "adult",
            LearnerGroup::Senior => "senior",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PlacementLevel {
    Foundations,
    Developing,
    Proficient,
    Advanced,
}

impl PlacementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementLevel::Foundations => "foundations",
            PlacementLevel::Developing => "developing",
            PlacementLevel::Proficient => "proficient",
            PlacementLevel::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub learner_group: LearnerGroup,
    pub level: PlacementLevel,
    /// Group-weighted score over the measured domains; `None` when nothing was measured.
    pub weighted_score: Option<u32>,
    pub confidence: Confidence,
    pub focus: Vec<ReadingDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub order: u32,
    pub title: String,
    pub activity: String,
    pub resources: Vec<String>,
    pub minutes_per_session: u32,
    pub sessions_per_week: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPlan {
    pub level: PlacementLevel,
    pub steps: Vec<PlanStep>,
    pub reassess_after_weeks: u32,
}
