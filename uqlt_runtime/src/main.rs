/// UQLT Runtime — command-line runner
///
/// Usage: uqlt_runtime [--mode stage-chain|collapse|emn] [CONFIG.json]
///
/// Loads the run configuration (defaults when no file is given), drives
/// one run and prints its termination, canonical hash and radial profile.
/// Log verbosity follows RUST_LOG, default `info`.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use uqlt_runtime::{run, RunConfig, RunError, RunMode, RunResult};

const USAGE: &str = "usage: uqlt_runtime [--mode stage-chain|collapse|emn] [CONFIG.json]";

struct Args {
    mode: RunMode,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> RunResult<Option<Args>> {
    let mut mode = RunMode::StageChain;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--mode" => {
                let value = args
                    .next()
                    .ok_or_else(|| RunError::Usage(format!("--mode needs a value\n{}", USAGE)))?;
                mode = value.parse()?;
            }
            flag if flag.starts_with('-') => {
                return Err(RunError::Usage(format!("unknown flag '{}'\n{}", flag, USAGE)));
            }
            path => {
                if config.is_some() {
                    return Err(RunError::Usage(format!("more than one config file\n{}", USAGE)));
                }
                config = Some(PathBuf::from(path));
            }
        }
    }
    Ok(Some(Args { mode, config }))
}

fn execute(args: Args) -> RunResult<()> {
    let config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    let report = run(&config, args.mode)?;

    println!("mode:        {}", report.mode);
    println!("steps:       {}", report.steps);
    println!("termination: {}", report.termination);
    println!("hash:        {}", report.final_hash);
    if let Some(demoted) = report.demoted {
        println!("demoted:     {}", demoted);
    }
    if let Some(emn) = report.emn_output() {
        println!("emn output:  {:.6}", emn);
    }
    println!("radial profile:");
    for (r, mean) in &report.radial_profile {
        println!("  r={:<3} {:.6}", r, mean);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
