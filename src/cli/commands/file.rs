//! Maintenance of the configured log file.

use crate::config::{Config, format_size};
use crate::internal;
use crate::transport::FileTransport;
use crate::transport::file::Archived;
use std::process::ExitCode;

#[must_use]
pub fn cmd_path(config: &Config) -> ExitCode {
    let transport = FileTransport::from_config(config);
    println!("{}", transport.resolve_path(None).display());
    ExitCode::SUCCESS
}

#[must_use]
pub fn cmd_size(config: &Config) -> ExitCode {
    let transport = FileTransport::from_config(config);
    let file = transport.file_for(None);
    if file.is_null() {
        internal::error("CLI", &format!("Can't open {}", file.path().display()));
        return ExitCode::FAILURE;
    }
    println!("{}", format_size(file.size()));
    ExitCode::SUCCESS
}

#[must_use]
pub fn cmd_clear(config: &Config) -> ExitCode {
    let transport = FileTransport::from_config(config);
    if transport.file_for(None).clear() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[must_use]
pub fn cmd_rotate(config: &Config) -> ExitCode {
    let transport = FileTransport::from_config(config);
    let outcome = transport.rotate_now();
    let message = describe_rotation(&outcome);
    if let Archived::Renamed { .. } = outcome {
        println!("{message}");
        ExitCode::SUCCESS
    } else {
        internal::error("CLI", &message);
        ExitCode::FAILURE
    }
}

/// One line per outcome; a crop that also failed is not reported as a crop.
#[must_use]
pub fn describe_rotation(outcome: &Archived) -> String {
    match outcome {
        Archived::Renamed { to } => format!("Archived to {}", to.display()),
        Archived::Cropped { kept, .. } => {
            format!("Rename failed, file was cropped to its last {kept} bytes")
        }
        Archived::Unbounded { reason, crop } => {
            format!("Rename failed ({reason}) and cropping failed too ({crop})")
        }
    }
}
