//! Scribe's own diagnostic logger: registry creation, rotation outcomes and
//! render fallbacks trace through here.
//!
//! Uses `OnceLock` so the logger is initialized exactly once, even if several
//! entry points race to call `init`. Calls made before init vanish.

use crate::config::Config;
use crate::level::Level;
use crate::logger::Logger;
use std::sync::OnceLock;

static INTERNAL_LOGGER: OnceLock<Logger> = OnceLock::new();

const FORMAT: &str = "[scribe] {scope}: {text}";

/// Loads the default config to pick the level. Later calls are no-ops.
pub fn init() {
    let was_init = INTERNAL_LOGGER.get().is_some();
    INTERNAL_LOGGER.get_or_init(|| {
        let config = Config::load().unwrap_or_default();
        build_internal_logger(&config)
    });
    if !was_init {
        debug("INTERNAL", "Internal logger ready");
    }
}

/// Reuses an already-loaded config.
pub fn init_with_config(config: &Config) {
    let was_init = INTERNAL_LOGGER.get().is_some();
    INTERNAL_LOGGER.get_or_init(|| build_internal_logger(config));
    if !was_init {
        debug(
            "INTERNAL",
            &format!("Internal logger ready at {}", config.general.internal_level),
        );
    }
}

/// Whether `init` ran.
#[must_use]
pub fn is_initialized() -> bool {
    INTERNAL_LOGGER.get().is_some()
}

fn build_internal_logger(config: &Config) -> Logger {
    Logger::builder()
        .level(config.parse_internal_level())
        .console()
        .format(FORMAT)
        .depth(None)
        .done()
        .build()
}

fn log(level: Level, scope: &str, msg: &str) {
    if let Some(logger) = INTERNAL_LOGGER.get() {
        logger.scope(scope).log(level, vec![msg.into()]);
    }
}

pub fn silly(scope: &str, msg: &str) {
    log(Level::Silly, scope, msg);
}

pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}
