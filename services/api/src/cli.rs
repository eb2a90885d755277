use crate::report::{run_ratio_report, RatioReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use daycare::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Daycare Ratio Service",
    about = "Serve and report classroom staff-to-child ratios",
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
    /// Inspect staff-to-child ratios from the command line
    Ratio {
        #[command(subcommand)]
        command: RatioCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RatioCommand {
    /// Print the ratio status of every classroom, or of one classroom
    Report(RatioReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) roster: RosterSourceArgs,
}

/// Roster exports to load at startup. Without either file a demo roster is seeded.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RosterSourceArgs {
    /// Children roster CSV export
    #[arg(long)]
    pub(crate) children_csv: Option<PathBuf>,
    /// Staff roster CSV export
    #[arg(long)]
    pub(crate) staff_csv: Option<PathBuf>,
}

impl RosterSourceArgs {
    pub(crate) fn is_empty(&self) -> bool {
        self.children_csv.is_none() && self.staff_csv.is_none()
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ratio {
            command: RatioCommand::Report(args),
        } => run_ratio_report(args),
    }
}
