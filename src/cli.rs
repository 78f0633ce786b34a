//! Command-line flags layered over file and environment configuration.

use clap::Parser;

use mirror_core::config::AppConfig;
use mirror_core::error::AppError;

/// Mirror relay: pairs web and desktop test clients and mirrors JSON between them
#[derive(Debug, Parser)]
#[command(name = "mirror-relay-server", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and per-environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load (`{config_dir}/{env}.toml`)
    #[arg(long, env = "MIRROR_ENV", default_value = "development")]
    pub env: String,

    /// Address both listeners bind to
    #[arg(long)]
    pub bind_address: Option<String>,

    /// WebSocket relay port
    #[arg(long)]
    pub relay_port: Option<u16>,

    /// Static file server port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Directory served by the static file server
    #[arg(long)]
    pub static_root: Option<String>,

    /// Do not start the static file server
    #[arg(long)]
    pub no_static: bool,
}

impl Cli {
    /// Load file/environment configuration, then apply flag overrides.
    pub fn load_configuration(&self) -> Result<AppConfig, AppError> {
        let mut config = AppConfig::load(&self.config_dir, &self.env)?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply flags that were given; absent flags leave `config` untouched.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(addr) = &self.bind_address {
            config.server.bind_address = addr.clone();
        }
        if let Some(port) = self.relay_port {
            config.server.relay_port = port;
        }
        if let Some(port) = self.http_port {
            config.server.http_port = port;
        }
        if let Some(root) = &self.static_root {
            config.static_files.root = root.clone();
        }
        if self.no_static {
            config.static_files.enabled = false;
        }
    }
}
