//! Heddle binary: run the supervisor team once and stream every update.

use clap::Parser;
use heddle::{RunOutcome, RunSettings};
use heddle_cli::{logging, run, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    heddle_config::load_and_apply("heddle", None).ok();
    let args = Args::parse();
    logging::init(args.verbose)?;

    let settings = RunSettings::from_env()?;
    let outcome = run(&args, &settings).await?;
    match outcome {
        RunOutcome::Completed { steps } => {
            tracing::info!(steps, "run completed");
            Ok(())
        }
        RunOutcome::RecursionLimit { limit } => {
            eprintln!("heddle: step budget of {} exhausted before FINISH", limit);
            std::process::exit(2);
        }
        RunOutcome::Failed { error } => {
            eprintln!("heddle: run failed: {}", error);
            std::process::exit(1);
        }
    }
}
