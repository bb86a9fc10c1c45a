use crate::commands::{run_impact, run_qualify, run_report, ImpactArgs, QualifyArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use training_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "AVFRD Training Compliance",
    about = "Evaluate volunteer qualifications and training impact for the AVFRD roster",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Show county and AVFRD qualification status for one volunteer
    Qualify(QualifyArgs),
    /// Count volunteers a single training would newly qualify, per position
    Impact(ImpactArgs),
    /// Position readiness summary with an optional CSV qualification matrix
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured roster snapshot (APP_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Qualify(args) => run_qualify(args),
        Command::Impact(args) => run_impact(args),
        Command::Report(args) => run_report(args),
    }
}
