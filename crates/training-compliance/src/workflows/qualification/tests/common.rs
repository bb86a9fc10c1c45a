use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::qualification::repository::{ComplianceRepository, RepositoryError};
use crate::workflows::qualification::{qualification_router, QualificationService, Requirement};
use crate::workflows::roster::domain::{
    CompletionStatus, Position, PositionId, Training, TrainingCatalog, TrainingCompletion,
    TrainingId, Volunteer, VolunteerId,
};

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn held(ids: &[&str]) -> BTreeSet<TrainingId> {
    ids.iter().map(|id| TrainingId::new(*id)).collect()
}

pub(super) fn ids(values: &[&str]) -> Vec<TrainingId> {
    values.iter().map(|id| TrainingId::new(*id)).collect()
}

pub(super) fn leaf(id: &str) -> Requirement {
    Requirement::leaf(id)
}

pub(super) fn training(id: &str, title: &str, expires_after_years: Option<u32>) -> Training {
    Training {
        id: TrainingId::new(id),
        title: title.to_string(),
        category: "Operations".to_string(),
        description: None,
        duration_hours: 8.0,
        expires_after_years,
    }
}

pub(super) fn trainings() -> Vec<Training> {
    vec![
        training("ff1", "Firefighter I", None),
        training("ff2", "Firefighter II", None),
        training("evoc", "Emergency Vehicle Operations", None),
        training("pump", "Pump Operations", None),
        training("cpr", "CPR", Some(2)),
        training("emt", "EMT-Basic", Some(3)),
        training("ics100", "ICS-100", None),
        training("ics200", "ICS-200", None),
    ]
}

pub(super) fn catalog() -> TrainingCatalog {
    trainings().into_iter().collect()
}

pub(super) fn positions() -> Vec<Position> {
    vec![
        Position {
            id: PositionId::from("interior-ff"),
            title: "Interior Firefighter".to_string(),
            department: Some("Fire".to_string()),
            description: None,
            county_requirements: Requirement::all_of(["ff1", "cpr"]),
            avfrd_requirements: Requirement::all(vec![
                leaf("ff1"),
                leaf("cpr"),
                Requirement::any(vec![leaf("ics100"), leaf("ics200")]),
            ]),
        },
        Position {
            id: PositionId::from("driver"),
            title: "Engine Driver".to_string(),
            department: Some("Fire".to_string()),
            description: None,
            county_requirements: Requirement::all_of(["evoc", "pump"]),
            avfrd_requirements: Requirement::at_least(2, vec![leaf("evoc"), leaf("pump"), leaf("ff2")])
                .expect("valid threshold"),
        },
    ]
}

pub(super) fn volunteer(id: &str, first: &str, last: &str, active: bool) -> Volunteer {
    Volunteer {
        id: VolunteerId::from(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        department: Some("Station 1".to_string()),
        active,
    }
}

pub(super) fn volunteers() -> Vec<Volunteer> {
    vec![
        volunteer("101", "Dana", "Whitfield", true),
        volunteer("102", "Lee", "Park", true),
        volunteer("103", "Morgan", "Reyes", true),
        volunteer("104", "Casey", "Nguyen", false),
    ]
}

pub(super) fn completion(volunteer: &str, training: &str, on: NaiveDate) -> TrainingCompletion {
    TrainingCompletion {
        volunteer_id: VolunteerId::from(volunteer),
        training_id: TrainingId::new(training),
        completed_on: on,
        status: CompletionStatus::Completed,
        instructor: None,
        notes: None,
    }
}

pub(super) fn completions() -> Vec<TrainingCompletion> {
    let recent = NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid");
    let lapsed = NaiveDate::from_ymd_opt(2021, 4, 1).expect("valid");
    vec![
        // 101 holds everything for interior firefighter
        completion("101", "ff1", recent),
        completion("101", "cpr", recent),
        completion("101", "ics100", recent),
        // 102 needs only CPR, but the one on file lapsed
        completion("102", "ff1", recent),
        completion("102", "cpr", lapsed),
        completion("102", "ics200", recent),
        completion("102", "evoc", recent),
        // 103 is one pump course away from driving
        completion("103", "evoc", recent),
        // inactive volunteers never count
        completion("104", "ff1", recent),
        completion("104", "cpr", recent),
        completion("104", "ics100", recent),
    ]
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) trainings: Vec<Training>,
    pub(super) positions: Vec<Position>,
    pub(super) volunteers: Vec<Volunteer>,
    pub(super) completions: Vec<TrainingCompletion>,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        Self {
            trainings: trainings(),
            positions: positions(),
            volunteers: volunteers(),
            completions: completions(),
        }
    }
}

impl ComplianceRepository for MemoryRepository {
    fn trainings(&self) -> Result<Vec<Training>, RepositoryError> {
        Ok(self.trainings.clone())
    }

    fn positions(&self) -> Result<Vec<Position>, RepositoryError> {
        Ok(self.positions.clone())
    }

    fn volunteers(&self) -> Result<Vec<Volunteer>, RepositoryError> {
        Ok(self.volunteers.clone())
    }

    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Ok(self.volunteers.iter().find(|v| &v.id == id).cloned())
    }

    fn completions_for(
        &self,
        id: &VolunteerId,
    ) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Ok(self
            .completions
            .iter()
            .filter(|completion| &completion.volunteer_id == id)
            .cloned()
            .collect())
    }

    fn completions(&self) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Ok(self.completions.clone())
    }
}

pub(super) struct UnavailableRepository;

impl ComplianceRepository for UnavailableRepository {
    fn trainings(&self) -> Result<Vec<Training>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn positions(&self) -> Result<Vec<Position>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn volunteers(&self) -> Result<Vec<Volunteer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn volunteer(&self, _id: &VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn completions_for(
        &self,
        _id: &VolunteerId,
    ) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn completions(&self) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> QualificationService<MemoryRepository> {
    QualificationService::new(Arc::new(MemoryRepository::seeded()))
}

pub(super) fn router_with_service(service: QualificationService<MemoryRepository>) -> axum::Router {
    qualification_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
