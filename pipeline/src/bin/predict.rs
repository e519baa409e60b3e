use clap::Parser;
use parcel_pipeline::commands::{self, PredictOptions};
use parcel_pipeline::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    let options = PredictOptions::parse();
    match commands::predict(&options) {
        Ok(rows) => {
            tracing::debug!(rows, "predictions written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "predict failed");
            ExitCode::FAILURE
        }
    }
}
