//! Each subcommand lives in its own file; handlers own their error reporting.

mod file;
mod log;

pub use file::{cmd_clear, cmd_path, cmd_rotate, cmd_size, describe_rotation};
pub use log::cmd_log;
