use serde::{Deserialize, Serialize};

use super::evaluator::evaluate;
use super::requirement::Requirement;
use crate::workflows::roster::domain::{Position, PositionId, Training, TrainingCatalog};
use crate::workflows::roster::ledger::CompletedTrainings;

/// The two independent rule sets a position is judged against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    County,
    #[default]
    #[serde(alias = "department", alias = "internal")]
    Avfrd,
}

impl RuleSet {
    pub const fn label(self) -> &'static str {
        match self {
            RuleSet::County => "county",
            RuleSet::Avfrd => "avfrd",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "county" => Some(RuleSet::County),
            "avfrd" | "department" | "internal" => Some(RuleSet::Avfrd),
            _ => None,
        }
    }
}

impl Position {
    pub fn requirements_for(&self, rule_set: RuleSet) -> &Requirement {
        match rule_set {
            RuleSet::County => &self.county_requirements,
            RuleSet::Avfrd => &self.avfrd_requirements,
        }
    }
}

/// Computed, never persisted, view of one volunteer against one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationStatus {
    pub position_id: PositionId,
    pub position_title: String,
    pub county_qualified: bool,
    pub avfrd_qualified: bool,
    pub missing_county: Vec<Training>,
    pub missing_avfrd: Vec<Training>,
    pub completed_trainings: Vec<Training>,
}

impl QualificationStatus {
    pub fn qualified(&self, rule_set: RuleSet) -> bool {
        match rule_set {
            RuleSet::County => self.county_qualified,
            RuleSet::Avfrd => self.avfrd_qualified,
        }
    }

    pub fn fully_qualified(&self) -> bool {
        self.county_qualified && self.avfrd_qualified
    }
}

/// Evaluates both rule sets of every position against one volunteer's held trainings.
/// Output order follows `positions`.
pub fn aggregate_qualifications(
    completed: &CompletedTrainings,
    positions: &[Position],
    catalog: &TrainingCatalog,
) -> Vec<QualificationStatus> {
    let completed_trainings: Vec<Training> =
        completed.iter().map(|id| catalog.resolve(id)).collect();

    positions
        .iter()
        .map(|position| {
            let county = evaluate(&position.county_requirements, completed);
            let avfrd = evaluate(&position.avfrd_requirements, completed);

            QualificationStatus {
                position_id: position.id.clone(),
                position_title: position.title.clone(),
                county_qualified: county.satisfied,
                avfrd_qualified: avfrd.satisfied,
                missing_county: county
                    .unmet_leaves
                    .iter()
                    .map(|id| catalog.resolve(id))
                    .collect(),
                missing_avfrd: avfrd
                    .unmet_leaves
                    .iter()
                    .map(|id| catalog.resolve(id))
                    .collect(),
                completed_trainings: completed_trainings.clone(),
            }
        })
        .collect()
}
