use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::aggregator::{aggregate_qualifications, QualificationStatus, RuleSet};
use super::impact::simulate_impact;
use super::report::{position_summaries, rank_training_impact, PositionSummary, TrainingImpact};
use super::repository::{ComplianceRepository, RepositoryError};
use crate::workflows::roster::domain::{
    Position, PositionId, TrainingCatalog, TrainingId, Volunteer, VolunteerId,
};
use crate::workflows::roster::ledger::{completions_by_volunteer, CompletedTrainings};

/// Service composing cached roster data with the qualification engine.
pub struct QualificationService<R> {
    repository: Arc<R>,
}

/// Qualification breakdown for one volunteer as of a date.
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerQualifications {
    pub volunteer: Volunteer,
    pub as_of: NaiveDate,
    pub qualifications: Vec<QualificationStatus>,
}

impl<R> QualificationService<R>
where
    R: ComplianceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn positions(&self) -> Result<Vec<Position>, QualificationServiceError> {
        Ok(self.repository.positions()?)
    }

    /// Evaluate every position against a volunteer's current, non-expired completions.
    pub fn volunteer_qualifications(
        &self,
        volunteer_id: &VolunteerId,
        as_of: NaiveDate,
    ) -> Result<VolunteerQualifications, QualificationServiceError> {
        let volunteer = self
            .repository
            .volunteer(volunteer_id)?
            .ok_or_else(|| QualificationServiceError::VolunteerNotFound(volunteer_id.clone()))?;

        let catalog = self.catalog()?;
        let positions = self.repository.positions()?;
        let completions = self.repository.completions_for(volunteer_id)?;
        let held =
            CompletedTrainings::from_completions(volunteer_id, &completions, &catalog, as_of);

        debug!(
            volunteer_id = %volunteer_id,
            held = held.len(),
            positions = positions.len(),
            "evaluating volunteer qualifications"
        );

        Ok(VolunteerQualifications {
            volunteer,
            as_of,
            qualifications: aggregate_qualifications(&held, &positions, &catalog),
        })
    }

    /// Evaluate every position against an ad hoc set of completed trainings.
    pub fn evaluate_completed(
        &self,
        training_ids: Vec<TrainingId>,
    ) -> Result<Vec<QualificationStatus>, QualificationServiceError> {
        let catalog = self.catalog()?;
        let positions = self.repository.positions()?;
        let held: CompletedTrainings = training_ids.into_iter().collect();
        Ok(aggregate_qualifications(&held, &positions, &catalog))
    }

    /// Count, per position, the active volunteers that `candidate` would newly qualify.
    pub fn training_impact(
        &self,
        candidate: &TrainingId,
        rule_set: RuleSet,
        as_of: NaiveDate,
    ) -> Result<BTreeMap<PositionId, usize>, QualificationServiceError> {
        let catalog = self.catalog()?;
        if catalog.get(candidate).is_none() {
            debug!(training_id = %candidate, "simulating a training absent from the catalog");
        }

        let positions = self.repository.positions()?;
        let volunteers = self.active_volunteers()?;
        let held = self.held_by_volunteer(&volunteers, &catalog, as_of)?;
        let roster: Vec<VolunteerId> = volunteers.into_iter().map(|v| v.id).collect();

        let impact = simulate_impact(candidate, &roster, &positions, &held, rule_set);
        info!(
            training_id = %candidate,
            rule_set = rule_set.label(),
            newly_qualified = impact.values().sum::<usize>(),
            "training impact simulated"
        );
        Ok(impact)
    }

    pub fn position_summaries(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<PositionSummary>, QualificationServiceError> {
        let catalog = self.catalog()?;
        let positions = self.repository.positions()?;
        let volunteers = self.active_volunteers()?;
        let held = self.held_by_volunteer(&volunteers, &catalog, as_of)?;
        Ok(position_summaries(&positions, &volunteers, &held))
    }

    pub fn training_impact_ranking(
        &self,
        rule_set: RuleSet,
        as_of: NaiveDate,
    ) -> Result<Vec<TrainingImpact>, QualificationServiceError> {
        let catalog = self.catalog()?;
        let positions = self.repository.positions()?;
        let volunteers = self.active_volunteers()?;
        let held = self.held_by_volunteer(&volunteers, &catalog, as_of)?;
        Ok(rank_training_impact(
            &catalog,
            &volunteers,
            &positions,
            &held,
            rule_set,
        ))
    }

    fn catalog(&self) -> Result<TrainingCatalog, RepositoryError> {
        Ok(self.repository.trainings()?.into_iter().collect())
    }

    fn active_volunteers(&self) -> Result<Vec<Volunteer>, RepositoryError> {
        Ok(self
            .repository
            .volunteers()?
            .into_iter()
            .filter(|volunteer| volunteer.active)
            .collect())
    }

    fn held_by_volunteer(
        &self,
        volunteers: &[Volunteer],
        catalog: &TrainingCatalog,
        as_of: NaiveDate,
    ) -> Result<BTreeMap<VolunteerId, CompletedTrainings>, RepositoryError> {
        let completions = self.repository.completions()?;
        Ok(completions_by_volunteer(
            volunteers,
            &completions,
            catalog,
            as_of,
        ))
    }
}

/// Error raised by the qualification service.
#[derive(Debug, thiserror::Error)]
pub enum QualificationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("volunteer {0} not found")]
    VolunteerNotFound(VolunteerId),
}
