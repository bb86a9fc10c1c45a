//! Import of BambooHR report exports into roster records.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::workflows::roster::domain::{
    CompletionStatus, TrainingCompletion, TrainingId, Volunteer, VolunteerId,
};
use parser::{normalize_id, parse_date, EmployeeRow, TrainingRow};

#[derive(Debug)]
pub enum BambooImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidDate { row: usize, value: String },
    UnknownStatus { row: usize, value: String },
}

impl std::fmt::Display for BambooImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BambooImportError::Io(err) => write!(f, "failed to read BambooHR export: {}", err),
            BambooImportError::Csv(err) => write!(f, "invalid BambooHR CSV data: {}", err),
            BambooImportError::InvalidDate { row, value } => {
                write!(f, "row {row}: could not parse completion date '{value}'")
            }
            BambooImportError::UnknownStatus { row, value } => {
                write!(f, "row {row}: unknown status '{value}'")
            }
        }
    }
}

impl std::error::Error for BambooImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BambooImportError::Io(err) => Some(err),
            BambooImportError::Csv(err) => Some(err),
            BambooImportError::InvalidDate { .. } | BambooImportError::UnknownStatus { .. } => None,
        }
    }
}

impl From<std::io::Error> for BambooImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BambooImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct BambooHrImporter;

impl BambooHrImporter {
    pub fn employees_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<Volunteer>, BambooImportError> {
        let file = std::fs::File::open(path)?;
        Self::employees_from_reader(file)
    }

    pub fn employees_from_reader<R: Read>(reader: R) -> Result<Vec<Volunteer>, BambooImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut volunteers = Vec::new();

        for (index, record) in csv_reader.deserialize::<EmployeeRow>().enumerate() {
            let row = record?;
            let status = row.status.as_deref().map(str::to_ascii_lowercase);
            let active = match status {
                None => true,
                Some(status) if status == "active" => true,
                Some(status) if status == "inactive" || status == "terminated" => false,
                Some(_) => {
                    return Err(BambooImportError::UnknownStatus {
                        row: index + 1,
                        value: row.status.unwrap_or_default(),
                    })
                }
            };

            volunteers.push(Volunteer {
                id: VolunteerId(normalize_id(&row.employee_id)),
                first_name: row.first_name,
                last_name: row.last_name,
                department: row.department,
                active,
            });
        }

        info!(count = volunteers.len(), "imported BambooHR employees");
        Ok(volunteers)
    }

    pub fn completions_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<TrainingCompletion>, BambooImportError> {
        let file = std::fs::File::open(path)?;
        Self::completions_from_reader(file)
    }

    pub fn completions_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<TrainingCompletion>, BambooImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut completions = Vec::new();

        for (index, record) in csv_reader.deserialize::<TrainingRow>().enumerate() {
            let row = record?;
            let row_number = index + 1;

            let completed_on =
                parse_date(&row.completed).ok_or_else(|| BambooImportError::InvalidDate {
                    row: row_number,
                    value: row.completed.clone(),
                })?;

            let raw_status = row.status.as_deref().map(str::to_ascii_lowercase);
            let status = match raw_status {
                None => CompletionStatus::Completed,
                Some(status) if status == "completed" || status == "complete" => {
                    CompletionStatus::Completed
                }
                Some(status) if status == "expired" => CompletionStatus::Expired,
                Some(_) => {
                    return Err(BambooImportError::UnknownStatus {
                        row: row_number,
                        value: row.status.unwrap_or_default(),
                    })
                }
            };

            let training_id = normalize_id(&row.training_id);
            debug!(row = row_number, training_id = %training_id, "training completion row");

            completions.push(TrainingCompletion {
                volunteer_id: VolunteerId(normalize_id(&row.employee_id)),
                training_id: TrainingId(training_id),
                completed_on,
                status,
                instructor: row.instructor,
                notes: row.notes,
            });
        }

        info!(count = completions.len(), "imported BambooHR training records");
        Ok(completions)
    }
}
