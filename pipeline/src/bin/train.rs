use clap::Parser;
use parcel_pipeline::commands::{self, TrainOptions};
use parcel_pipeline::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    let options = TrainOptions::parse();
    match commands::train(&options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "train failed");
            ExitCode::FAILURE
        }
    }
}
