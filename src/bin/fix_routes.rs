use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use sumo_emergency::config::Config;
use sumo_emergency::logging::init_logging;
use sumo_emergency::repair::repair_file;

const DEFAULT_ROUTES: &str = "emergency_routes.rou.xml";
const DEFAULT_NETWORK: &str = "osm.net.xml.gz";

#[derive(Parser, Debug)]
struct InputArgs {
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,
    /// Overrides the routes file of the config.
    #[arg(short, long)]
    pub routes: Option<PathBuf>,
    /// Overrides the network file of the config.
    #[arg(short, long)]
    pub network: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = InputArgs::parse();
    let config = match &args.config_path {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                sumo_emergency::logging::init_std_out_logging();
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    let output = config.output();
    let _guard = init_logging(&output.output_dir, "fix_routes.log", output.logging);

    match run(args, &config) {
        Ok(()) => {
            info!("Routes fixed successfully! You can now run the simulation.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error fixing routes file: {e}");
            error!("Failed to fix routes. Check the error messages above.");
            ExitCode::FAILURE
        }
    }
}

fn run(args: InputArgs, config: &Config) -> sumo_emergency::Result<()> {
    // paths given on the command line are relative to the working directory
    let routes = args
        .routes
        .or_else(|| config.routes())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUTES));
    let network = args
        .network
        .or_else(|| config.network())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_NETWORK));

    repair_file(&routes, &network, &config.repair())?;
    Ok(())
}
