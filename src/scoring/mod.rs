pub mod config;
pub mod orf;
pub mod placement;
pub mod plan;
pub mod profile;

pub use config::{BandThresholds, DomainWeights, GroupWeights, ScoringPolicy};
pub use orf::{compute_orf_metrics, error_breakdown};
pub use placement::{calculate_placement, PlacementInput};
pub use plan::generate_placement_plan;
pub use profile::{build_reading_profile, ProfileInputs};
