use crate::commands::{run_catalog, run_sample, run_score, CatalogArgs, SampleArgs, ScoreArgs};
use crate::server;
use assessment_engine::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Assessment Engine",
    about = "Score personality, career, and communication assessments from the command line or over HTTP",
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
    /// Score a response stream exported as CSV
    Score(ScoreArgs),
    /// List the assessment types the registry provides
    Catalog(CatalogArgs),
    /// Generate a synthetic response stream for demos and calibration
    Sample(SampleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load assessment types from this JSON registry instead of the built-ins
    #[arg(long)]
    pub(crate) registry: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Catalog(args) => run_catalog(args),
        Command::Sample(args) => run_sample(args),
    }
}
