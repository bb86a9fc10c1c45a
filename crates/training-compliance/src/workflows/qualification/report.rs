use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::aggregator::{QualificationStatus, RuleSet};
use super::evaluator::is_satisfied;
use super::impact::simulate_impact;
use crate::workflows::roster::domain::{
    Position, PositionId, Training, TrainingCatalog, TrainingId, Volunteer, VolunteerId,
};
use crate::workflows::roster::ledger::CompletedTrainings;

/// Headcount of qualified active volunteers for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub position_id: PositionId,
    pub position_title: String,
    pub county_qualified: usize,
    pub avfrd_qualified: usize,
    pub fully_qualified: usize,
    pub active_volunteers: usize,
}

/// How many position slots a single training would unlock across the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingImpact {
    pub training_id: TrainingId,
    pub title: String,
    pub rule_set: RuleSet,
    pub newly_qualified: usize,
    pub by_position: BTreeMap<PositionId, usize>,
}

pub fn position_summaries(
    positions: &[Position],
    volunteers: &[Volunteer],
    completions: &BTreeMap<VolunteerId, CompletedTrainings>,
) -> Vec<PositionSummary> {
    let empty = CompletedTrainings::new();
    let active: Vec<&CompletedTrainings> = volunteers
        .iter()
        .filter(|volunteer| volunteer.active)
        .map(|volunteer| completions.get(&volunteer.id).unwrap_or(&empty))
        .collect();

    positions
        .iter()
        .map(|position| {
            let mut summary = PositionSummary {
                position_id: position.id.clone(),
                position_title: position.title.clone(),
                county_qualified: 0,
                avfrd_qualified: 0,
                fully_qualified: 0,
                active_volunteers: active.len(),
            };

            for held in &active {
                let county = is_satisfied(&position.county_requirements, *held);
                let avfrd = is_satisfied(&position.avfrd_requirements, *held);
                summary.county_qualified += usize::from(county);
                summary.avfrd_qualified += usize::from(avfrd);
                summary.fully_qualified += usize::from(county && avfrd);
            }

            summary
        })
        .collect()
}

/// Simulates every catalog training against the active roster, highest impact first.
pub fn rank_training_impact(
    catalog: &TrainingCatalog,
    volunteers: &[Volunteer],
    positions: &[Position],
    completions: &BTreeMap<VolunteerId, CompletedTrainings>,
    rule_set: RuleSet,
) -> Vec<TrainingImpact> {
    let roster: Vec<VolunteerId> = volunteers
        .iter()
        .filter(|volunteer| volunteer.active)
        .map(|volunteer| volunteer.id.clone())
        .collect();

    let mut ranking: Vec<TrainingImpact> = catalog
        .iter()
        .map(|training| {
            let by_position =
                simulate_impact(&training.id, &roster, positions, completions, rule_set);
            TrainingImpact {
                training_id: training.id.clone(),
                title: training.title.clone(),
                rule_set,
                newly_qualified: by_position.values().sum(),
                by_position,
            }
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.newly_qualified
            .cmp(&a.newly_qualified)
            .then_with(|| a.training_id.cmp(&b.training_id))
    });
    ranking
}

#[derive(Debug, Serialize)]
struct MatrixRow<'a> {
    #[serde(rename = "Volunteer ID")]
    volunteer_id: &'a str,
    #[serde(rename = "Volunteer")]
    volunteer: String,
    #[serde(rename = "Position ID")]
    position_id: &'a str,
    #[serde(rename = "Position")]
    position: &'a str,
    #[serde(rename = "County Qualified")]
    county_qualified: &'static str,
    #[serde(rename = "AVFRD Qualified")]
    avfrd_qualified: &'static str,
    #[serde(rename = "Missing County")]
    missing_county: String,
    #[serde(rename = "Missing AVFRD")]
    missing_avfrd: String,
}

/// Writes one CSV row per volunteer and position.
pub fn write_qualification_matrix<W: Write>(
    writer: W,
    rows: &[(Volunteer, Vec<QualificationStatus>)],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for (volunteer, statuses) in rows {
        for status in statuses {
            csv_writer.serialize(MatrixRow {
                volunteer_id: &volunteer.id.0,
                volunteer: volunteer.display_name(),
                position_id: &status.position_id.0,
                position: &status.position_title,
                county_qualified: yes_no(status.county_qualified),
                avfrd_qualified: yes_no(status.avfrd_qualified),
                missing_county: join_titles(&status.missing_county),
                missing_avfrd: join_titles(&status.missing_avfrd),
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn join_titles(trainings: &[Training]) -> String {
    trainings
        .iter()
        .map(|training| training.title.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
