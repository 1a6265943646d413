use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

use toolvault::cli::{run, Cli};
use toolvault::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    debug!("toolvault {} (built {})", VERSION, BUILD_DATE);

    if run(cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
