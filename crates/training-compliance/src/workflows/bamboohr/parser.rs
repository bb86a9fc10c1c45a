use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeRow {
    #[serde(rename = "Employee ID", alias = "Employee #")]
    pub(crate) employee_id: String,
    #[serde(rename = "First Name", default)]
    pub(crate) first_name: String,
    #[serde(rename = "Last Name", default)]
    pub(crate) last_name: String,
    #[serde(
        rename = "Department",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) department: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrainingRow {
    #[serde(rename = "Employee ID", alias = "Employee #")]
    pub(crate) employee_id: String,
    #[serde(rename = "Training ID", alias = "Training Type ID")]
    pub(crate) training_id: String,
    #[serde(rename = "Completed Date", alias = "Completed")]
    pub(crate) completed: String,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
    #[serde(
        rename = "Instructor",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) instructor: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    pub(crate) notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts the date layouts BambooHR emits depending on report settings.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

pub(crate) fn normalize_id(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}
