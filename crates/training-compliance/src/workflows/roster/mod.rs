//! Reference data and completion records cached from the HR system.

pub mod domain;
pub mod ledger;

pub use domain::{
    CompletionStatus, Position, RosterSnapshot, Training, TrainingCatalog, TrainingCompletion,
    Volunteer,
};
pub use ledger::{completions_by_volunteer, refresh_expiry, CompletedTrainings};
