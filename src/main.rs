use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use weighted_delaunay_edges::{run, EngineConfig, IncrementalEngine};

/// Write the edge skeleton of the weighted Delaunay tetrahedralization of a point cloud
#[derive(Parser, Debug)]
#[command(name = "edges-weighted-delaunay-3d", version, about)]
struct Cli {
    /// Whitespace-separated `x y z w` records
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Destination for `low high` edge lines
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let config = EngineConfig::default();
    let mut engine = IncrementalEngine::new();

    match run(&cli.input, &cli.output, &config, &mut engine) {
        Ok(report) => {
            if let Some(truncation) = &report.truncation {
                eprintln!("warning: {}", truncation);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
