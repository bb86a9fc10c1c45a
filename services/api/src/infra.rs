use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use training_compliance::error::AppError;
use training_compliance::workflows::bamboohr::BambooHrImporter;
use training_compliance::workflows::qualification::{ComplianceRepository, RepositoryError, RuleSet};
use training_compliance::workflows::roster::domain::{
    Position, RosterSnapshot, Training, TrainingCompletion, Volunteer, VolunteerId,
};
use training_compliance::workflows::roster::ledger::refresh_expiry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local cache of the roster, standing in for the relational store. The roster is
/// loaded once and shared read-only.
#[derive(Default, Clone)]
pub(crate) struct InMemoryComplianceRepository {
    snapshot: Arc<RosterSnapshot>,
}

impl InMemoryComplianceRepository {
    pub(crate) fn new(snapshot: RosterSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl ComplianceRepository for InMemoryComplianceRepository {
    fn trainings(&self) -> Result<Vec<Training>, RepositoryError> {
        Ok(self.snapshot.trainings.clone())
    }

    fn positions(&self) -> Result<Vec<Position>, RepositoryError> {
        Ok(self.snapshot.positions.clone())
    }

    fn volunteers(&self) -> Result<Vec<Volunteer>, RepositoryError> {
        Ok(self.snapshot.volunteers.clone())
    }

    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Ok(self
            .snapshot
            .volunteers
            .iter()
            .find(|volunteer| &volunteer.id == id)
            .cloned())
    }

    fn completions_for(
        &self,
        id: &VolunteerId,
    ) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Ok(self
            .snapshot
            .completions
            .iter()
            .filter(|completion| &completion.volunteer_id == id)
            .cloned()
            .collect())
    }

    fn completions(&self) -> Result<Vec<TrainingCompletion>, RepositoryError> {
        Ok(self.snapshot.completions.clone())
    }
}

/// Sources for building the roster the CLI and server evaluate against.
#[derive(Debug, Default, Clone)]
pub(crate) struct RosterSources {
    pub(crate) snapshot: Option<PathBuf>,
    pub(crate) employees_csv: Option<PathBuf>,
    pub(crate) trainings_csv: Option<PathBuf>,
}

/// Reads the JSON snapshot and replaces volunteers/completions with BambooHR exports when given.
pub(crate) fn load_roster(sources: &RosterSources) -> Result<RosterSnapshot, AppError> {
    let mut snapshot = match &sources.snapshot {
        Some(path) => read_snapshot(path)?,
        None => RosterSnapshot::default(),
    };

    if let Some(path) = &sources.employees_csv {
        snapshot.volunteers = BambooHrImporter::employees_from_path(path)?;
    }
    if let Some(path) = &sources.trainings_csv {
        snapshot.completions = BambooHrImporter::completions_from_path(path)?;
    }

    info!(
        trainings = snapshot.trainings.len(),
        positions = snapshot.positions.len(),
        volunteers = snapshot.volunteers.len(),
        completions = snapshot.completions.len(),
        "roster loaded"
    );
    Ok(snapshot)
}

/// Marks completions that have lapsed by `as_of` as expired, so record listings agree with
/// the evaluation date. Returns how many records changed.
pub(crate) fn expire_lapsed(snapshot: &mut RosterSnapshot, as_of: NaiveDate) -> usize {
    let catalog = snapshot.catalog();
    let lapsed = refresh_expiry(&mut snapshot.completions, &catalog, as_of);
    if lapsed > 0 {
        info!(lapsed, %as_of, "completions marked expired");
    }
    lapsed
}

fn read_snapshot(path: &Path) -> Result<RosterSnapshot, AppError> {
    let file = std::fs::File::open(path)?;
    let snapshot = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(snapshot)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_rule_set(raw: &str) -> Result<RuleSet, String> {
    RuleSet::parse(raw)
        .ok_or_else(|| format!("unknown rule set '{raw}' (expected county or avfrd)"))
}
