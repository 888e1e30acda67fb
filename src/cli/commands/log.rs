//! One record from a shell script.

use crate::config::Config;
use crate::internal;
use crate::level::Level;
use crate::logger::Logger;
use crate::record::Value;
use std::process::ExitCode;

#[must_use]
pub fn cmd_log(config: &Config, level: Level, scope: Option<&str>, text: &[String]) -> ExitCode {
    let logger = Logger::from_config(config);
    if logger.transport_count() == 0 {
        internal::warn("CLI", "Nothing to write to: console and file are disabled");
        return ExitCode::FAILURE;
    }

    let data = vec![Value::from(text.join(" "))];
    match scope {
        Some(scope) => logger.scope(scope).log(level, data),
        None => logger.log(level, data),
    }

    match logger.flush() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            internal::error("CLI", &format!("Flush failed: {e}"));
            ExitCode::FAILURE
        }
    }
}
