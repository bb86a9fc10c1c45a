use std::collections::BTreeMap;
use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::qualification::Requirement;

/// Identifier wrapper for trainable units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrainingId(pub String);

impl TrainingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrainingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrainingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for operational positions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PositionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier wrapper for volunteers (the HR system calls them employees).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VolunteerId(pub String);

impl fmt::Display for VolunteerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VolunteerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Trainable unit maintained by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: TrainingId,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_hours: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_after_years: Option<u32>,
}

impl Training {
    /// Stand-in record for an id the catalog does not know about.
    pub fn placeholder(id: &TrainingId) -> Self {
        Self {
            id: id.clone(),
            title: id.0.clone(),
            category: String::new(),
            description: None,
            duration_hours: 0.0,
            expires_after_years: None,
        }
    }

    /// Date a completion taken on `completed_on` lapses, if the training expires at all.
    pub fn expiry_date(&self, completed_on: NaiveDate) -> Option<NaiveDate> {
        match self.expires_after_years {
            None | Some(0) => None,
            Some(years) => completed_on.checked_add_months(Months::new(years.saturating_mul(12))),
        }
    }
}

/// Lifecycle state of a recorded completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Expired,
}

impl CompletionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CompletionStatus::Completed => "completed",
            CompletionStatus::Expired => "expired",
        }
    }
}

/// Fact that a volunteer finished a training on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCompletion {
    pub volunteer_id: VolunteerId,
    pub training_id: TrainingId,
    pub completed_on: NaiveDate,
    pub status: CompletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Volunteer {
    pub fn display_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", "") => self.id.0.clone(),
            (first, "") => first.to_string(),
            ("", last) => last.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

/// Operational role with independent county and department requirement trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "countyRequirements")]
    pub county_requirements: Requirement,
    #[serde(alias = "avfrdRequirements")]
    pub avfrd_requirements: Requirement,
}

/// Lookup table of trainings keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingCatalog {
    trainings: BTreeMap<TrainingId, Training>,
}

impl TrainingCatalog {
    pub fn new(trainings: impl IntoIterator<Item = Training>) -> Self {
        let trainings = trainings
            .into_iter()
            .map(|training| (training.id.clone(), training))
            .collect();
        Self { trainings }
    }

    pub fn get(&self, id: &TrainingId) -> Option<&Training> {
        self.trainings.get(id)
    }

    /// Returns the catalog record or a placeholder so dangling references never abort a report.
    pub fn resolve(&self, id: &TrainingId) -> Training {
        match self.trainings.get(id) {
            Some(training) => training.clone(),
            None => {
                warn!(training_id = %id, "training missing from catalog, using placeholder");
                Training::placeholder(id)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Training> {
        self.trainings.values()
    }

    pub fn len(&self) -> usize {
        self.trainings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trainings.is_empty()
    }
}

impl FromIterator<Training> for TrainingCatalog {
    fn from_iter<I: IntoIterator<Item = Training>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// JSON seed describing everything the portal caches from the HR system and admin tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub trainings: Vec<Training>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub volunteers: Vec<Volunteer>,
    #[serde(default)]
    pub completions: Vec<TrainingCompletion>,
}

impl RosterSnapshot {
    pub fn catalog(&self) -> TrainingCatalog {
        self.trainings.iter().cloned().collect()
    }
}
