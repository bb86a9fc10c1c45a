//! Qualification engine: requirement trees, evaluation, per-position aggregation, and
//! training impact simulation, plus the service and HTTP surface that feed it cached roster
//! data.

pub mod aggregator;
pub mod evaluator;
pub mod impact;
pub mod report;
pub mod repository;
pub mod requirement;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregator::{aggregate_qualifications, QualificationStatus, RuleSet};
pub use evaluator::{evaluate, is_satisfied, CompletionLookup, Evaluation, WithCandidate};
pub use impact::simulate_impact;
pub use report::{
    position_summaries, rank_training_impact, write_qualification_matrix, PositionSummary,
    TrainingImpact,
};
pub use repository::{ComplianceRepository, RepositoryError};
pub use requirement::{GroupLogic, Requirement, RequirementError, RequirementGroup};
pub use router::qualification_router;
pub use service::{QualificationService, QualificationServiceError, VolunteerQualifications};
