//! Entry point for the `cevennes-fetch` binary.
#![forbid(unsafe_code)]

use std::error::Error;

use cevennes_cli::CliError;
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match cevennes_cli::run() {
        Ok(_) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            error!("cevennes-fetch: {}", describe(&err));
            std::process::exit(1);
        }
    }
}

fn describe(err: &(dyn Error + 'static)) -> String {
    std::iter::successors(Some(err), |&cause| cause.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
