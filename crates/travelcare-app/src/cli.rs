//! CLI argument definitions for the TravelCare chat client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;
use travelcare_core::auth::Credentials;
use travelcare_core::config::DispatchMode;

const DEMO_EMAIL: &str = "john@example.com";
const DEMO_PASSWORD: &str = "password123";

/// TravelCare: chat with your travel insurance assistant from the terminal.
#[derive(Parser, Debug)]
#[command(name = "travelcare", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Account email. Defaults to the demo policy holder.
    #[arg(short = 'e', long = "email")]
    pub email: Option<String>,

    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,

    /// Navigate to screens instead of embedding widgets in the chat.
    #[arg(long = "screens")]
    pub screens: bool,

    /// Print messages as JSON lines.
    #[arg(long = "json")]
    pub json: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TRAVELCARE_CONFIG env var > ~/.travelcare/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TRAVELCARE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Priority: --screens flag > config file value.
    pub fn resolve_dispatch_mode(&self, config_mode: DispatchMode) -> DispatchMode {
        if self.screens {
            DispatchMode::Screens
        } else {
            config_mode
        }
    }

    /// Email credentials, falling back to the demo account.
    pub fn resolve_credentials(&self) -> Credentials {
        Credentials::Email {
            email: self.email.clone().unwrap_or_else(|| DEMO_EMAIL.to_string()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| DEMO_PASSWORD.to_string()),
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".travelcare").join("config.toml");
    }
    PathBuf::from("config.toml")
}
