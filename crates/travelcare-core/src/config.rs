use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TravelCareError};

/// Top-level configuration for the TravelCare assistant.
///
/// Loaded from `~/.travelcare/config.toml` by default. Every section falls
/// back to its defaults when missing from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelCareConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub emergency: EmergencyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl TravelCareConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TravelCareConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TravelCareError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How widget-bearing actions are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Embed widgets inline in the chat log.
    #[default]
    Inline,
    /// Navigate to the dedicated screen instead.
    Screens,
}

/// Chat assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Simulated latency before an assistant reply is appended.
    pub response_delay_ms: u64,
    /// Delay before the follow-up of an echoed action is appended.
    pub action_delay_ms: u64,
    /// Delay between a confirmed booking and the widget closing itself.
    pub widget_complete_delay_ms: u64,
    /// Simulated telemedicine connection time.
    pub connect_delay_ms: u64,
    /// Maximum accepted user message length in characters.
    pub max_message_length: usize,
    pub dispatch_mode: DispatchMode,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: 1500,
            action_delay_ms: 1000,
            widget_complete_delay_ms: 3000,
            connect_delay_ms: 3000,
            max_message_length: 2000,
            dispatch_mode: DispatchMode::Inline,
        }
    }
}

impl ChatConfig {
    // Delays are never zero.
    fn clamp(ms: u64) -> Duration {
        Duration::from_millis(ms.max(1))
    }

    pub fn response_delay(&self) -> Duration {
        Self::clamp(self.response_delay_ms)
    }

    pub fn action_delay(&self) -> Duration {
        Self::clamp(self.action_delay_ms)
    }

    pub fn widget_complete_delay(&self) -> Duration {
        Self::clamp(self.widget_complete_delay_ms)
    }

    pub fn connect_delay(&self) -> Duration {
        Self::clamp(self.connect_delay_ms)
    }
}

/// Emergency services configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Number dialled by the emergency call actions.
    pub number: String,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            number: "112".to_string(),
        }
    }
}

impl EmergencyConfig {
    /// The `tel:` URI opened by the native dialer.
    pub fn dial_uri(&self) -> String {
        format!("tel:{}", self.number)
    }
}

/// Mock authentication backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Simulated backend round-trip latency.
    pub latency_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { latency_ms: 1500 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TravelCareConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.response_delay_ms, 1500);
        assert_eq!(config.chat.dispatch_mode, DispatchMode::Inline);
        assert_eq!(config.emergency.number, "112");
        assert_eq!(config.auth.latency_ms, 1500);
    }

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let config: TravelCareConfig = toml::from_str(
            r#"
            [chat]
            response_delay_ms = 10
            dispatch_mode = "screens"
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.response_delay_ms, 10);
        assert_eq!(config.chat.action_delay_ms, 1000);
        assert_eq!(config.chat.dispatch_mode, DispatchMode::Screens);
        assert_eq!(config.emergency.number, "112");
    }

    #[test]
    fn test_zero_delay_is_clamped() {
        let chat = ChatConfig {
            response_delay_ms: 0,
            ..ChatConfig::default()
        };
        assert_eq!(chat.response_delay(), Duration::from_millis(1));
    }

    #[test]
    fn test_dial_uri() {
        assert_eq!(EmergencyConfig::default().dial_uri(), "tel:112");
        let custom = EmergencyConfig {
            number: "911".to_string(),
        };
        assert_eq!(custom.dial_uri(), "tel:911");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TravelCareConfig::default();
        config.chat.max_message_length = 42;
        config.emergency.number = "999".to_string();
        config.save(&path).unwrap();

        let loaded = TravelCareConfig::load(&path).unwrap();
        assert_eq!(loaded.chat.max_message_length, 42);
        assert_eq!(loaded.emergency.number, "999");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = TravelCareConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(TravelCareError::Io(_))));
    }

    #[test]
    fn test_load_or_default_on_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();
        let config = TravelCareConfig::load_or_default(&path);
        assert_eq!(config.chat.response_delay_ms, 1500);
    }
}
