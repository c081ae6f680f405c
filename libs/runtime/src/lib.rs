//! Process-level plumbing shared by the server binary: layered configuration,
//! logging setup, home directory resolution and shutdown signals.

pub mod config;
pub mod home_dir;
pub mod logging;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, Environment, LoggingConfig,
    Section, ServerConfig,
};
