use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::requirement::{GroupLogic, Requirement};
use crate::workflows::roster::domain::TrainingId;

/// Read-only view over the trainings a volunteer currently holds.
pub trait CompletionLookup {
    fn has_completed(&self, training: &TrainingId) -> bool;
}

impl CompletionLookup for BTreeSet<TrainingId> {
    fn has_completed(&self, training: &TrainingId) -> bool {
        self.contains(training)
    }
}

impl CompletionLookup for HashSet<TrainingId> {
    fn has_completed(&self, training: &TrainingId) -> bool {
        self.contains(training)
    }
}

impl<T: CompletionLookup + ?Sized> CompletionLookup for &T {
    fn has_completed(&self, training: &TrainingId) -> bool {
        (**self).has_completed(training)
    }
}

/// A completed set plus one hypothetical training, used for what-if evaluation.
pub struct WithCandidate<'a, C: ?Sized> {
    base: &'a C,
    candidate: &'a TrainingId,
}

impl<'a, C: CompletionLookup + ?Sized> WithCandidate<'a, C> {
    pub fn new(base: &'a C, candidate: &'a TrainingId) -> Self {
        Self { base, candidate }
    }
}

impl<C: CompletionLookup + ?Sized> CompletionLookup for WithCandidate<'_, C> {
    fn has_completed(&self, training: &TrainingId) -> bool {
        training == self.candidate || self.base.has_completed(training)
    }
}

/// Verdict for one requirement tree plus the leaves still needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub satisfied: bool,
    pub unmet_leaves: Vec<TrainingId>,
}

/// Walks the tree bottom-up. Unmet leaves are deduplicated in depth-first order.
pub fn evaluate<C>(requirement: &Requirement, completed: &C) -> Evaluation
where
    C: CompletionLookup + ?Sized,
{
    let mut unmet = Vec::new();
    let satisfied = walk(requirement, completed, &mut unmet);

    if satisfied {
        unmet.clear();
    } else {
        let mut seen = BTreeSet::new();
        unmet.retain(|id| seen.insert(id.clone()));
    }

    Evaluation {
        satisfied,
        unmet_leaves: unmet,
    }
}

/// Convenience for callers that only need the boolean.
pub fn is_satisfied<C>(requirement: &Requirement, completed: &C) -> bool
where
    C: CompletionLookup + ?Sized,
{
    walk(requirement, completed, &mut Vec::new())
}

fn walk<C>(requirement: &Requirement, completed: &C, unmet: &mut Vec<TrainingId>) -> bool
where
    C: CompletionLookup + ?Sized,
{
    let group = match requirement {
        Requirement::Leaf(id) => {
            let held = completed.has_completed(id);
            if !held {
                unmet.push(id.clone());
            }
            return held;
        }
        Requirement::Group(group) => group,
    };

    let children = group.requirements();
    if children.is_empty() {
        return false;
    }

    match group.logic() {
        GroupLogic::All => {
            // every child is visited so the caller sees the whole gap
            let mut all = true;
            for child in children {
                all &= walk(child, completed, unmet);
            }
            all
        }
        GroupLogic::Any => {
            let mut gaps = Vec::new();
            for child in children {
                if walk(child, completed, &mut gaps) {
                    return true;
                }
            }
            unmet.extend(gaps);
            false
        }
        GroupLogic::AtLeast(count) => {
            let mut gaps = Vec::new();
            let mut met = 0usize;
            for child in children {
                let mut child_gaps = Vec::new();
                if walk(child, completed, &mut child_gaps) {
                    met += 1;
                } else {
                    gaps.extend(child_gaps);
                }
            }
            if met >= count {
                true
            } else {
                unmet.extend(gaps);
                false
            }
        }
    }
}
