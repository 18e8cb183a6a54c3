use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use sumo_emergency::routes::RouteFile;

/// Reads a route file and writes it again. Use a `.xml.gz` ending on either side to compress or
/// decompress.
#[derive(Parser, Debug)]
struct InputArgs {
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
}

fn main() -> ExitCode {
    sumo_emergency::logging::init_std_out_logging();
    let args = InputArgs::parse();

    let result = RouteFile::from_file(&args.input).and_then(|routes| routes.to_file(&args.output));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
