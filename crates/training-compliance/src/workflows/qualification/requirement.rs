use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::workflows::roster::domain::TrainingId;

/// Canonical requirement tree. Every wire encoding is normalized into this shape while
/// deserializing, so evaluation never has to inspect raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequirement", into = "RawRequirement")]
pub enum Requirement {
    Leaf(TrainingId),
    Group(RequirementGroup),
}

/// Combinator applied to a group's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLogic {
    All,
    Any,
    AtLeast(usize),
}

impl GroupLogic {
    pub const fn wire_name(self) -> &'static str {
        match self {
            GroupLogic::All => "AND",
            GroupLogic::Any => "OR",
            GroupLogic::AtLeast(_) => "X_OF_Y",
        }
    }
}

/// Logical group over child requirements. Fields are private so an `X_OF_Y` threshold is
/// always within `1..=requirements.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementGroup {
    logic: GroupLogic,
    requirements: Vec<Requirement>,
}

impl RequirementGroup {
    pub fn logic(&self) -> GroupLogic {
        self.logic
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

/// Malformed requirement data. Never defaulted to a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    #[error("unknown requirement logic '{0}'")]
    UnknownLogic(String),
    #[error("requirement group '{logic}' is missing its requirements list")]
    MissingRequirements { logic: String },
    #[error("X_OF_Y group requires a count")]
    MissingCount,
    #[error("X_OF_Y count {count} must be between 1 and {available}")]
    InvalidCount { count: i64, available: usize },
}

impl Requirement {
    pub fn leaf(id: impl Into<String>) -> Self {
        Requirement::Leaf(TrainingId(id.into()))
    }

    pub fn all(requirements: Vec<Requirement>) -> Self {
        Requirement::Group(RequirementGroup {
            logic: GroupLogic::All,
            requirements,
        })
    }

    pub fn any(requirements: Vec<Requirement>) -> Self {
        Requirement::Group(RequirementGroup {
            logic: GroupLogic::Any,
            requirements,
        })
    }

    pub fn at_least(count: i64, requirements: Vec<Requirement>) -> Result<Self, RequirementError> {
        let available = requirements.len();
        let valid = usize::try_from(count)
            .ok()
            .filter(|count| *count > 0 && *count <= available)
            .ok_or(RequirementError::InvalidCount { count, available })?;

        Ok(Requirement::Group(RequirementGroup {
            logic: GroupLogic::AtLeast(valid),
            requirements,
        }))
    }

    /// Flat list of training ids, the shorthand for an `AND` group.
    pub fn all_of<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::all(ids.into_iter().map(Self::leaf).collect())
    }

    /// Every training id referenced by the tree, deduplicated in first-seen order.
    pub fn leaf_ids(&self) -> Vec<TrainingId> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        self.collect_leaves(&mut seen, &mut ids);
        ids
    }

    fn collect_leaves(&self, seen: &mut BTreeSet<TrainingId>, ids: &mut Vec<TrainingId>) {
        match self {
            Requirement::Leaf(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id.clone());
                }
            }
            Requirement::Group(group) => {
                for child in &group.requirements {
                    child.collect_leaves(seen, ids);
                }
            }
        }
    }
}

/// Shapes accepted on the wire: a bare id, a list of ids (implicit `AND`), or a group object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRequirement {
    Leaf(String),
    List(Vec<RawRequirement>),
    Group(RawGroup),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawGroup {
    logic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    requirements: Option<Vec<RawRequirement>>,
}

impl TryFrom<RawRequirement> for Requirement {
    type Error = RequirementError;

    fn try_from(raw: RawRequirement) -> Result<Self, Self::Error> {
        match raw {
            RawRequirement::Leaf(id) => Ok(Requirement::leaf(id)),
            RawRequirement::List(items) => Ok(Requirement::all(normalize_children(items)?)),
            RawRequirement::Group(group) => {
                let logic = group.logic.trim().to_ascii_uppercase();
                let requirements = group
                    .requirements
                    .ok_or_else(|| RequirementError::MissingRequirements {
                        logic: group.logic.clone(),
                    })?;

                match logic.as_str() {
                    "AND" => Ok(Requirement::all(normalize_children(requirements)?)),
                    "OR" => Ok(Requirement::any(normalize_children(requirements)?)),
                    "X_OF_Y" => {
                        let count = group.count.ok_or(RequirementError::MissingCount)?;
                        Requirement::at_least(count, normalize_children(requirements)?)
                    }
                    _ => Err(RequirementError::UnknownLogic(group.logic)),
                }
            }
        }
    }
}

fn normalize_children(items: Vec<RawRequirement>) -> Result<Vec<Requirement>, RequirementError> {
    items.into_iter().map(Requirement::try_from).collect()
}

impl From<Requirement> for RawRequirement {
    fn from(requirement: Requirement) -> Self {
        match requirement {
            Requirement::Leaf(id) => RawRequirement::Leaf(id.0),
            Requirement::Group(group) => {
                let count = match group.logic {
                    GroupLogic::AtLeast(count) => i64::try_from(count).ok(),
                    _ => None,
                };
                RawRequirement::Group(RawGroup {
                    logic: group.logic.wire_name().to_string(),
                    count,
                    requirements: Some(
                        group
                            .requirements
                            .into_iter()
                            .map(RawRequirement::from)
                            .collect(),
                    ),
                })
            }
        }
    }
}
