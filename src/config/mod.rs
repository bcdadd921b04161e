use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Local development origin of the portfolio API
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable that overrides `api_url` from the config file
pub const API_URL_ENV: &str = "FOLIO_API_URL";

/// Seconds the success banner stays up before the form is cleared
const DEFAULT_RESET_DELAY_SECS: u64 = 4;
const MIN_RESET_DELAY_SECS: u64 = 3;
const MAX_RESET_DELAY_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMethod {
    pub label: String,  // "Email", "GitHub", ...
    pub value: String,  // Address or URL shown next to the label
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// kitty.conf style colour file to read the palette from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitty_conf: Option<PathBuf>,

    /// Hex overrides, e.g. `accent = "#89b4fa"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the portfolio API (without the `/api/v1` prefix)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// How long the success banner is shown before the form resets
    #[serde(default = "default_reset_delay")]
    pub reset_delay_secs: u64,

    /// Optional per-request timeout. Unset means wait for the transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Show a desktop notification after a message is sent
    #[serde(default)]
    pub notifications: bool,

    /// Contact details listed beside the form
    #[serde(default = "default_contact_methods")]
    pub contact_methods: Vec<ContactMethod>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_reset_delay() -> u64 {
    DEFAULT_RESET_DELAY_SECS
}

fn default_contact_methods() -> Vec<ContactMethod> {
    vec![
        ContactMethod { label: "Email".into(), value: "hello@example.com".into() },
        ContactMethod { label: "LinkedIn".into(), value: "linkedin.com/in/yourname".into() },
        ContactMethod { label: "GitHub".into(), value: "github.com/yourname".into() },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            reset_delay_secs: DEFAULT_RESET_DELAY_SECS,
            request_timeout_secs: None,
            notifications: false,
            contact_methods: default_contact_methods(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("folio");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the API base URL: explicit override, then `FOLIO_API_URL`,
    /// then the config file value.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        let env_value = std::env::var(API_URL_ENV).ok();
        Self::pick_api_url(cli_override, env_value.as_deref(), &self.api_url)
    }

    fn pick_api_url(cli: Option<&str>, env: Option<&str>, file: &str) -> String {
        let chosen = [cli, env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(file.trim());

        let chosen = if chosen.is_empty() { DEFAULT_API_URL } else { chosen };
        chosen.trim_end_matches('/').to_string()
    }

    pub fn reset_delay(&self) -> Duration {
        let secs = self.reset_delay_secs.clamp(MIN_RESET_DELAY_SECS, MAX_RESET_DELAY_SECS);
        Duration::from_secs(secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            api_url: "https://api.example.com".to_string(),
            reset_delay_secs: 5,
            request_timeout_secs: Some(10),
            notifications: true,
            contact_methods: vec![ContactMethod {
                label: "Email".to_string(),
                value: "me@example.com".to_string(),
            }],
            theme: ThemeConfig {
                accent: Some("#89b4fa".to_string()),
                ..ThemeConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.api_url, deserialized.api_url);
        assert_eq!(config.contact_methods, deserialized.contact_methods);
        assert_eq!(deserialized.request_timeout_secs, Some(10));
        assert_eq!(deserialized.theme.accent.as_deref(), Some("#89b4fa"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.reset_delay(), Duration::from_secs(4));
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.contact_methods.len(), 3);
    }

    #[test]
    fn test_reset_delay_is_clamped() {
        let mut config = AppConfig::default();
        config.reset_delay_secs = 0;
        assert_eq!(config.reset_delay(), Duration::from_secs(3));
        config.reset_delay_secs = 60;
        assert_eq!(config.reset_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_api_url_precedence() {
        let file = "http://file.example/";
        assert_eq!(
            AppConfig::pick_api_url(Some("http://cli.example/"), Some("http://env.example"), file),
            "http://cli.example"
        );
        assert_eq!(
            AppConfig::pick_api_url(None, Some("http://env.example"), file),
            "http://env.example"
        );
        assert_eq!(AppConfig::pick_api_url(None, Some("  "), file), "http://file.example");
        assert_eq!(AppConfig::pick_api_url(None, None, ""), DEFAULT_API_URL);
    }
}
