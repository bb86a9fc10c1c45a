use crate::infra::{expire_lapsed, load_roster, InMemoryComplianceRepository, RosterSources};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use training_compliance::error::AppError;
use training_compliance::workflows::qualification::{
    write_qualification_matrix, ComplianceRepository, QualificationService,
    QualificationServiceError, QualificationStatus, RuleSet,
};
use training_compliance::workflows::roster::domain::{
    Training, TrainingCatalog, TrainingCompletion, TrainingId, Volunteer, VolunteerId,
};

#[derive(Args, Debug)]
pub(crate) struct QualifyArgs {
    /// Roster snapshot (JSON) with trainings, positions, volunteers and completions
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Volunteer (BambooHR employee) id to evaluate
    #[arg(long)]
    pub(crate) volunteer: String,
    /// Evaluation date for expiry checks (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// BambooHR employee export replacing the snapshot's volunteers
    #[arg(long)]
    pub(crate) employees_csv: Option<PathBuf>,
    /// BambooHR training export replacing the snapshot's completions
    #[arg(long)]
    pub(crate) trainings_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImpactArgs {
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Training id to simulate
    #[arg(long)]
    pub(crate) training: String,
    /// Rule set to judge positions by
    #[arg(long, value_parser = crate::infra::parse_rule_set, default_value = "avfrd")]
    pub(crate) rule_set: RuleSet,
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Write a volunteer by position qualification matrix to this CSV path
    #[arg(long)]
    pub(crate) matrix: Option<PathBuf>,
}

type Service = QualificationService<InMemoryComplianceRepository>;

fn build_service(
    sources: &RosterSources,
    as_of: NaiveDate,
) -> Result<(Service, InMemoryComplianceRepository), AppError> {
    let mut roster = load_roster(sources)?;
    expire_lapsed(&mut roster, as_of);
    let repository = InMemoryComplianceRepository::new(roster);
    let service = QualificationService::new(Arc::new(repository.clone()));
    Ok((service, repository))
}

fn today_or(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let QualifyArgs {
        snapshot,
        volunteer,
        as_of,
        employees_csv,
        trainings_csv,
    } = args;

    let sources = RosterSources {
        snapshot: Some(snapshot),
        employees_csv,
        trainings_csv,
    };
    let as_of = today_or(as_of);
    let (service, repository) = build_service(&sources, as_of)?;
    let volunteer_id = VolunteerId::from(volunteer.as_str());
    let report = service.volunteer_qualifications(&volunteer_id, as_of)?;

    println!(
        "Qualifications for {} ({}) as of {}",
        report.volunteer.display_name(),
        report.volunteer.id,
        report.as_of
    );
    if !report.volunteer.active {
        println!("  note: volunteer is inactive");
    }
    for status in &report.qualifications {
        render_status(status);
    }

    let records = repository
        .completions_for(&volunteer_id)
        .map_err(QualificationServiceError::from)?;
    if !records.is_empty() {
        let catalog: TrainingCatalog = repository
            .trainings()
            .map_err(QualificationServiceError::from)?
            .into_iter()
            .collect();
        println!("Training records:");
        for line in record_lines(&records, &catalog) {
            println!("  {line}");
        }
    }

    Ok(())
}

fn record_lines(records: &[TrainingCompletion], catalog: &TrainingCatalog) -> Vec<String> {
    let mut sorted: Vec<&TrainingCompletion> = records.iter().collect();
    sorted.sort_by(|a, b| b.completed_on.cmp(&a.completed_on));
    sorted
        .into_iter()
        .map(|record| {
            format!(
                "- {} on {} ({})",
                catalog.resolve(&record.training_id).title,
                record.completed_on,
                record.status.label()
            )
        })
        .collect()
}

fn render_status(status: &QualificationStatus) {
    println!(
        "- {} [county: {} | avfrd: {}]",
        status.position_title,
        yes_no(status.county_qualified),
        yes_no(status.avfrd_qualified)
    );
    if !status.missing_county.is_empty() {
        println!("    missing (county): {}", titles(&status.missing_county));
    }
    if !status.missing_avfrd.is_empty() {
        println!("    missing (avfrd): {}", titles(&status.missing_avfrd));
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "qualified"
    } else {
        "not qualified"
    }
}

fn titles(trainings: &[Training]) -> String {
    trainings
        .iter()
        .map(|training| training.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn run_impact(args: ImpactArgs) -> Result<(), AppError> {
    let ImpactArgs {
        snapshot,
        training,
        rule_set,
        as_of,
    } = args;

    let sources = RosterSources {
        snapshot: Some(snapshot),
        ..RosterSources::default()
    };
    let as_of = today_or(as_of);
    let (service, _) = build_service(&sources, as_of)?;
    let candidate = TrainingId::new(training);
    let impact = service.training_impact(&candidate, rule_set, as_of)?;

    println!(
        "Completing {} would newly qualify ({} rules, as of {}):",
        candidate,
        rule_set.label(),
        as_of
    );
    let positions = service.positions()?;
    for position in &positions {
        let count = impact.get(&position.id).copied().unwrap_or_default();
        println!("- {}: {}", position.title, count);
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        as_of,
        matrix,
    } = args;

    let sources = RosterSources {
        snapshot: Some(snapshot),
        ..RosterSources::default()
    };
    let as_of = today_or(as_of);
    let (service, repository) = build_service(&sources, as_of)?;

    println!("Position readiness as of {as_of}");
    for summary in service.position_summaries(as_of)? {
        println!(
            "- {}: {} county | {} avfrd | {} fully qualified of {} active",
            summary.position_title,
            summary.county_qualified,
            summary.avfrd_qualified,
            summary.fully_qualified,
            summary.active_volunteers
        );
    }

    println!("\nHighest-impact trainings (avfrd rules)");
    for entry in service
        .training_impact_ranking(RuleSet::Avfrd, as_of)?
        .into_iter()
        .filter(|entry| entry.newly_qualified > 0)
        .take(5)
    {
        println!("- {}: +{}", entry.title, entry.newly_qualified);
    }

    if let Some(path) = matrix {
        let volunteers: Vec<Volunteer> = repository
            .volunteers()
            .map_err(QualificationServiceError::from)?
            .into_iter()
            .filter(|volunteer| volunteer.active)
            .collect();
        let mut rows = Vec::with_capacity(volunteers.len());
        for volunteer in volunteers {
            let report = service.volunteer_qualifications(&volunteer.id, as_of)?;
            rows.push((report.volunteer, report.qualifications));
        }

        let writer = BufWriter::new(File::create(&path)?);
        write_qualification_matrix(writer, &rows)?;
        info!(path = %path.display(), volunteers = rows.len(), "qualification matrix written");
        println!("\nMatrix written to {}", path.display());
    }

    Ok(())
}
