//! Service configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `SHICO_*` environment variables (`SHICO_LISTEN`, `SHICO_FILES`, ...)
//! 4. explicit command-line flags

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Default model glob.
pub const DEFAULT_FILES: &str = "word2vecModels/195[0-1]_????.w2v";

/// Default listen address (all interfaces).
pub const DEFAULT_LISTEN: &str = "0.0.0.0:5000";

/// Default log filter: verbose for the service, quiet for dependencies.
pub const DEFAULT_LOG_FILTER: &str = "info,shico_server=debug,shico_tracker=debug";

/// How the `networks` part of a response is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// The same fixed graph for every interval.
    #[default]
    Placeholder,
    /// A graph of the seed links followed in the interval.
    Links,
}

impl NetworkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkMode::Placeholder => "placeholder",
            NetworkMode::Links => "links",
        }
    }
}

/// Resolved configuration for one server process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to.
    pub listen: String,
    /// Glob matching the word2vec model files.
    pub files: String,
    /// Model files are in binary word2vec format.
    pub binary: bool,
    pub network_mode: NetworkMode,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            files: DEFAULT_FILES.to_string(),
            binary: true,
            network_mode: NetworkMode::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<String>,
    pub files: Option<String>,
    pub binary: Option<bool>,
    pub network_mode: Option<NetworkMode>,
}

impl ServiceConfig {
    /// Resolve the configuration from every source.
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(file, overrides, Environment::with_prefix("SHICO"))
    }

    fn load_with_env(file: Option<&Path>, overrides: Overrides, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("listen", defaults.listen)?
            .set_default("files", defaults.files)?
            .set_default("binary", defaults.binary)?
            .set_default("network_mode", defaults.network_mode.as_str())?
            .set_default("log_filter", defaults.log_filter)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(env)
            .set_override_option("listen", overrides.listen)?
            .set_override_option("files", overrides.files)?
            .set_override_option("binary", overrides.binary)?
            .set_override_option("network_mode", overrides.network_mode.map(NetworkMode::as_str))?
            .build()?
            .try_deserialize()
    }
}
