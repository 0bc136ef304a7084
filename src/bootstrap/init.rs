/*!
   Functions for initializing each test at the beginning of a Rust test
   session.
*/

use std::env;
use std::io::IsTerminal;
use std::sync::Once;
use tracing::{debug, warn};
use tracing_subscriber::{
    self as ts,
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::Error;
use crate::types::config::{self, Config};

static INIT: Once = Once::new();

/**
   Initialize the test with a global logger and error handlers, and
   return the [`Config`] found at the path given by `UPGRADE_CONFIG`.
   Without that variable the default configuration is used.
*/
pub fn init_test() -> Result<Config, Error> {
    let no_color_log = env::var("NO_COLOR_LOG")
        .ok()
        .map(|val| val == "1")
        .unwrap_or(false);

    INIT.call_once(|| {
        let color_eyre = if enable_ansi() && !no_color_log {
            color_eyre::install().err()
        } else {
            None
        };

        install_logger(!no_color_log);

        if let Some(e) = color_eyre {
            warn!("failed to install color-eyre handlers: {}", e);
        }
    });

    match env::var("UPGRADE_CONFIG") {
        Ok(path) => {
            debug!("loading upgrade configuration from {}", path);
            config::load(path)
        }
        Err(_) => Ok(Config::default()),
    }
}

/**
   Install the [`tracing_subscriber`] logger handlers so that logs will
   be displayed during test.
*/
pub fn install_logger(with_color: bool) {
    // Use log level INFO by default if RUST_LOG is not set.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let layer = ts::fmt::layer()
        .with_ansi(with_color && enable_ansi())
        .with_test_writer();

    // Another subscriber may already be installed, e.g. by `test-log`.
    if let Err(e) = ts::registry().with(env_filter).with(layer).try_init() {
        debug!("logger already installed: {}", e);
    }
}

/// Whether both stdout and stderr are attached to a terminal.
pub fn enable_ansi() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
