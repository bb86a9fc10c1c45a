use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use super::aggregator::RuleSet;
use super::evaluator::{is_satisfied, WithCandidate};
use crate::workflows::roster::domain::{Position, PositionId, TrainingId, VolunteerId};
use crate::workflows::roster::ledger::CompletedTrainings;

/// Counts, per position, the volunteers who would newly qualify under `rule_set` if they
/// also completed `candidate`. Volunteers without a completion entry hold nothing.
pub fn simulate_impact(
    candidate: &TrainingId,
    volunteers: &[VolunteerId],
    positions: &[Position],
    completions_by_volunteer: &BTreeMap<VolunteerId, CompletedTrainings>,
    rule_set: RuleSet,
) -> BTreeMap<PositionId, usize> {
    let empty = CompletedTrainings::new();
    let roster: Vec<&CompletedTrainings> = volunteers
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|volunteer| completions_by_volunteer.get(volunteer).unwrap_or(&empty))
        .collect();

    positions
        .par_iter()
        .map(|position| {
            let requirement = position.requirements_for(rule_set);
            let transitions = roster
                .iter()
                .filter(|held| {
                    !is_satisfied(requirement, **held)
                        && is_satisfied(requirement, &WithCandidate::new(**held, candidate))
                })
                .count();
            (position.id.clone(), transitions)
        })
        .collect()
}
