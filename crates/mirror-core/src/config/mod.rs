//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! layered TOML files and `MIRROR__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod app;
pub mod logging;
pub mod relay;
pub mod static_files;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::logging::LoggingConfig;
pub use self::relay::RelayConfig;
pub use self::static_files::{CorsConfig, StaticFilesConfig};

use crate::error::AppError;

/// Environment variable prefix for overrides (`MIRROR__SERVER__RELAY_PORT=9100`).
pub const ENV_PREFIX: &str = "MIRROR";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings for both ports.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay engine settings.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Static fixture server settings.
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `{config_dir}/default.toml`, an optional
    /// `{config_dir}/{env}.toml` overlay, and the process environment.
    ///
    /// Missing files are not an error; every field has a default. The result
    /// is not validated, so callers can layer further overrides first and
    /// then call [`validate`](Self::validate).
    pub fn load(config_dir: &str, env: &str) -> Result<Self, AppError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);
        Self::build(config_dir, env, environment)
    }

    fn build(
        config_dir: &str,
        env: &str,
        environment: config::Environment,
    ) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{config_dir}/{env}")).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        // Port 0 asks the OS for an ephemeral port, so two zeros never collide.
        if self.static_files.enabled
            && self.server.relay_port != 0
            && self.server.relay_port == self.server.http_port
        {
            return Err(AppError::configuration(format!(
                "relay_port and http_port must differ (both {})",
                self.server.relay_port
            )));
        }
        if !self.relay.ws_path.starts_with('/') {
            return Err(AppError::configuration(format!(
                "relay.ws_path must start with '/', got '{}'",
                self.relay.ws_path
            )));
        }
        if self.relay.outbound_buffer_size == 0 {
            return Err(AppError::configuration(
                "relay.outbound_buffer_size must be at least 1",
            ));
        }
        Ok(())
    }
}
