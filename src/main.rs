#![allow(clippy::cargo_common_metadata)]
use ntfs_remount::{cli, config::Config, exit_code, setup_logging};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // Help and usage errors exit here
    let args = cli::parse_args();

    if let Err(e) = setup_logging(args.debug) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let config = Config::from_args(&args);

    match cli::execute(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
