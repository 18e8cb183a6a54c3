use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use sumo_emergency::network::Network;
use sumo_emergency::routes::validation::{validate, validate_against_network};
use sumo_emergency::routes::RouteFile;

#[derive(Parser, Debug)]
struct InputArgs {
    #[arg(short, long)]
    pub routes: PathBuf,
    /// If set, trip endpoints are checked against the edges of this network.
    #[arg(short, long)]
    pub network: Option<PathBuf>,
}

fn main() -> ExitCode {
    sumo_emergency::logging::init_std_out_logging();
    let args = InputArgs::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &InputArgs) -> sumo_emergency::Result<bool> {
    let routes = RouteFile::from_file(&args.routes)?;
    let report = match &args.network {
        Some(path) => validate_against_network(&routes, &Network::from_file(path)?),
        None => validate(&routes),
    };

    for summary in routes.summary() {
        info!(
            "{}: {} trips, departures {:?} to {:?}",
            summary.vehicle_type, summary.trips, summary.first_departure, summary.last_departure
        );
    }
    report.log();
    info!(
        "Found {} errors and {} warnings in {:?}",
        report.errors().count(),
        report.warnings().count(),
        args.routes
    );
    Ok(report.is_valid())
}
