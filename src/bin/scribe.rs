//! `scribe` command-line entry point.
//!
//! Usage:
//!   scribe log <level> [--scope S] <text...>   Write one record
//!   scribe path                                Print the log file path
//!   scribe size                                Print the log file size
//!   scribe clear                               Empty the log file
//!   scribe rotate                              Archive the log file now

use clap::Parser;
use scribe::cli::{Cli, run};
use scribe::internal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Paths, levels and formats all come from config, so it loads first
    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    internal::init_with_config(&config);
    run(&cli, &config)
}
