//! `scribe` - Structured logging to the console and to size-rotated files.
//!
//! - Leveled records with arbitrary JSON-like arguments
//! - A render pipeline per transport (templates, `%c` styles, depth limits)
//! - A file transport with a shared handle registry, `.old` rotation and a
//!   crop fallback when the rename fails
//! - Builder and TOML configuration
//!
//! # Example
//!
//! ```no_run
//! use scribe::{Level, Logger, args};
//!
//! let logger = Logger::builder()
//!     .console()
//!         .level(Level::Info)
//!         .done()
//!     .file()
//!         .max_size(512 * 1024)
//!         .done()
//!     .build();
//!
//! logger.info(args!["server listening on", 8080]);
//! logger
//!     .scope("net")
//!     .warn(args!["%cslow response", "color: yellow", serde_json::json!({ "ms": 950 })]);
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `scribe` binary

pub mod config;
pub mod error;
pub mod internal;
pub mod level;
pub mod logger;
pub mod record;
pub mod render;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, format_size, parse_size};
pub use error::Error;
pub use level::{Level, ParseLevelError};
pub use logger::{Logger, LoggerBuilder, Scope};
pub use record::{LogRecord, Origin, ProcessKind, Value};
pub use render::{Pipeline, Step};
pub use transport::file::{FileHandle, FileRegistry, WriteFlag, WriteOptions};
pub use transport::{ConsoleTransport, FileTransport, Transport};
