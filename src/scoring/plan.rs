use crate::models::{PlacementLevel, PlacementPlan, PlacementResult, PlanStep, ReadingDomain};

/// Static description of a plan step before numbering.
struct StepTemplate {
    title: &'static str,
    activity: &'static str,
    resources: &'static [&'static str],
    minutes_per_session: u32,
    sessions_per_week: u32,
}

const FOUNDATIONS: &[StepTemplate] = &[
    StepTemplate {
        title: "Sound-symbol review",
        activity: "Letter-sound drills and short-vowel word families",
        resources: &["Phonics flashcards", "Word family charts"],
        minutes_per_session: 15,
        sessions_per_week: 5,
    },
    StepTemplate {
        title: "Decodable reading",
        activity: "Read a decodable text aloud with a partner, then reread it",
        resources: &["Beginner decodable passages"],
        minutes_per_session: 15,
        sessions_per_week: 4,
    },
    StepTemplate {
        title: "Sight word building",
        activity: "Practice high-frequency words until they are read on sight",
        resources: &["Beginner word lists"],
        minutes_per_session: 10,
        sessions_per_week: 5,
    },
];

const DEVELOPING: &[StepTemplate] = &[
    StepTemplate {
        title: "Phonics patterns",
        activity: "Blends, digraphs and vowel teams in isolation and in words",
        resources: &["Elementary pattern lists", "Pseudoword cards"],
        minutes_per_session: 15,
        sessions_per_week: 4,
    },
    StepTemplate {
        title: "Repeated reading",
        activity: "Timed rereads of one passage, charting words correct per minute",
        resources: &["Elementary passages", "Fluency tracking sheet"],
        minutes_per_session: 15,
        sessions_per_week: 4,
    },
    StepTemplate {
        title: "Guided questions",
        activity: "Answer literal and sequence questions after each passage",
        resources: &["Elementary question sets"],
        minutes_per_session: 10,
        sessions_per_week: 3,
    },
];

const PROFICIENT: &[StepTemplate] = &[
    StepTemplate {
        title: "Phrasing and expression",
        activity: "Echo and partner reading focused on phrasing",
        resources: &["Intermediate passages"],
        minutes_per_session: 15,
        sessions_per_week: 3,
    },
    StepTemplate {
        title: "Inference practice",
        activity: "Answer inferential questions and cite the supporting sentence",
        resources: &["Intermediate question sets"],
        minutes_per_session: 20,
        sessions_per_week: 3,
    },
    StepTemplate {
        title: "Vocabulary in context",
        activity: "Work out unfamiliar words from surrounding text",
        resources: &["Context clue exercises"],
        minutes_per_session: 10,
        sessions_per_week: 3,
    },
];

const ADVANCED: &[StepTemplate] = &[
    StepTemplate {
        title: "Independent reading",
        activity: "Self-selected longer texts with a weekly reading log",
        resources: &["Advanced passages", "Reading log"],
        minutes_per_session: 30,
        sessions_per_week: 3,
    },
    StepTemplate {
        title: "Main idea and summary",
        activity: "Write a short summary identifying the main idea of each text",
        resources: &["Summary templates"],
        minutes_per_session: 20,
        sessions_per_week: 2,
    },
];

fn focus_step(domain: ReadingDomain) -> StepTemplate {
    match domain {
        ReadingDomain::Decoding => StepTemplate {
            title: "Focus: decoding",
            activity: "Pseudoword drills to practice sounding out unfamiliar words",
            resources: &["Pseudoword cards"],
            minutes_per_session: 10,
            sessions_per_week: 3,
        },
        ReadingDomain::WordRecognition => StepTemplate {
            title: "Focus: word recognition",
            activity: "Timed sight word rounds with missed words recycled",
            resources: &["Word lists at the placement band"],
            minutes_per_session: 10,
            sessions_per_week: 3,
        },
        ReadingDomain::Fluency => StepTemplate {
            title: "Focus: fluency",
            activity: "One-minute repeated readings with immediate error review",
            resources: &["Fluency tracking sheet"],
            minutes_per_session: 10,
            sessions_per_week: 3,
        },
        ReadingDomain::Comprehension => StepTemplate {
            title: "Focus: comprehension",
            activity: "Stop-and-ask questioning while reading short passages",
            resources: &["Question prompts card"],
            minutes_per_session: 15,
            sessions_per_week: 2,
        },
    }
}

fn reassess_after_weeks(level: PlacementLevel) -> u32 {
    match level {
        PlacementLevel::Foundations | PlacementLevel::Developing => 6,
        PlacementLevel::Proficient => 8,
        PlacementLevel::Advanced => 12,
    }
}

/// Expands a placement into an ordered plan. Deterministic: the same placement
/// always yields the same plan.
pub fn generate_placement_plan(placement: &PlacementResult) -> PlacementPlan {
    let base = match placement.level {
        PlacementLevel::Foundations => FOUNDATIONS,
        PlacementLevel::Developing => DEVELOPING,
        PlacementLevel::Proficient => PROFICIENT,
        PlacementLevel::Advanced => ADVANCED,
    };
    let focus: Vec<StepTemplate> = placement.focus.iter().map(|domain| focus_step(*domain)).collect();

    let steps = base
        .iter()
        .chain(focus.iter())
        .zip(1..)
        .map(|(template, order)| PlanStep {
            order,
            title: template.title.to_string(),
            activity: template.activity.to_string(),
            resources: template.resources.iter().map(|r| r.to_string()).collect(),
            minutes_per_session: template.minutes_per_session,
            sessions_per_week: template.sessions_per_week,
        })
        .collect();

    PlacementPlan {
        level: placement.level,
        steps,
        reassess_after_weeks: reassess_after_weeks(placement.level),
    }
}
