use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    CompletionStatus, TrainingCatalog, TrainingCompletion, TrainingId, Volunteer, VolunteerId,
};
use crate::workflows::qualification::CompletionLookup;

/// Trainings a volunteer currently holds, already filtered to valid completions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedTrainings(BTreeSet<TrainingId>);

impl CompletedTrainings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the held set for one volunteer as of a date. Retakes are collapsed: any single
    /// completion that is still `completed`, dated on or before `as_of` and not past its
    /// expiry counts.
    pub fn from_completions<'a, I>(
        volunteer: &VolunteerId,
        completions: I,
        catalog: &TrainingCatalog,
        as_of: NaiveDate,
    ) -> Self
    where
        I: IntoIterator<Item = &'a TrainingCompletion>,
    {
        completions
            .into_iter()
            .filter(|completion| &completion.volunteer_id == volunteer)
            .filter(|completion| is_current(completion, catalog, as_of))
            .map(|completion| completion.training_id.clone())
            .collect()
    }

    pub fn insert(&mut self, training: TrainingId) -> bool {
        self.0.insert(training)
    }

    pub fn contains(&self, training: &TrainingId) -> bool {
        self.0.contains(training)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TrainingId> for CompletedTrainings {
    fn from_iter<I: IntoIterator<Item = TrainingId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl CompletionLookup for CompletedTrainings {
    fn has_completed(&self, training: &TrainingId) -> bool {
        self.contains(training)
    }
}

fn is_current(
    completion: &TrainingCompletion,
    catalog: &TrainingCatalog,
    as_of: NaiveDate,
) -> bool {
    completion.status == CompletionStatus::Completed
        && completion.completed_on <= as_of
        && !has_lapsed(completion, catalog, as_of)
}

fn has_lapsed(
    completion: &TrainingCompletion,
    catalog: &TrainingCatalog,
    as_of: NaiveDate,
) -> bool {
    catalog
        .get(&completion.training_id)
        .and_then(|training| training.expiry_date(completion.completed_on))
        .is_some_and(|expires_on| expires_on <= as_of)
}

/// Marks lapsed completions as expired and returns how many changed. Expired records are
/// never revived.
pub fn refresh_expiry(
    completions: &mut [TrainingCompletion],
    catalog: &TrainingCatalog,
    as_of: NaiveDate,
) -> usize {
    let mut transitioned = 0;
    for completion in completions.iter_mut() {
        let lapsed = completion.status == CompletionStatus::Completed
            && has_lapsed(completion, catalog, as_of);
        if lapsed {
            debug!(
                volunteer_id = %completion.volunteer_id,
                training_id = %completion.training_id,
                "completion expired"
            );
            completion.status = CompletionStatus::Expired;
            transitioned += 1;
        }
    }
    transitioned
}

/// Groups completions into held sets for every listed volunteer, including those with none.
pub fn completions_by_volunteer(
    volunteers: &[Volunteer],
    completions: &[TrainingCompletion],
    catalog: &TrainingCatalog,
    as_of: NaiveDate,
) -> BTreeMap<VolunteerId, CompletedTrainings> {
    let mut held: BTreeMap<VolunteerId, CompletedTrainings> = volunteers
        .iter()
        .map(|volunteer| (volunteer.id.clone(), CompletedTrainings::new()))
        .collect();

    for completion in completions {
        if !is_current(completion, catalog, as_of) {
            continue;
        }
        if let Some(set) = held.get_mut(&completion.volunteer_id) {
            set.insert(completion.training_id.clone());
        }
    }

    held
}
