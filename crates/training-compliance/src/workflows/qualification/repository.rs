use crate::workflows::roster::domain::{
    Position, Training, TrainingCompletion, Volunteer, VolunteerId,
};

/// Storage abstraction over the cached HR data so the service can be exercised in isolation.
pub trait ComplianceRepository: Send + Sync {
    fn trainings(&self) -> Result<Vec<Training>, RepositoryError>;
    fn positions(&self) -> Result<Vec<Position>, RepositoryError>;
    fn volunteers(&self) -> Result<Vec<Volunteer>, RepositoryError>;
    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, RepositoryError>;
    fn completions_for(&self, id: &VolunteerId)
        -> Result<Vec<TrainingCompletion>, RepositoryError>;
    fn completions(&self) -> Result<Vec<TrainingCompletion>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
