//! Configuration for the HoosStudying client.
//!
//! Loaded once at startup from `~/.config/hoos/config.toml` (overridable via
//! `HOOS_CONFIG_PATH`), with environment variables taking precedence over the
//! file. A missing file is not an error: every field has a usable default for
//! local development. The loaded value is threaded explicitly to whoever
//! needs it; there is no global configuration singleton.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default REST gateway origin for local development.
const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    api: RawApi,
    #[serde(default)]
    identity: RawIdentity,
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    ui: RawUi,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawApi {
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawIdentity {
    api_key: Option<String>,
    signin_endpoint: Option<String>,
    signup_endpoint: Option<String>,
    token_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    url_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawUi {
    ascii_only: Option<bool>,
}

/// Identity-provider REST surface.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Browser API key the provider hands out per project.
    pub api_key: String,
    pub signin_endpoint: String,
    pub signup_endpoint: String,
    pub token_endpoint: String,
}

/// Terminal rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiConfig {
    pub ascii_only: bool,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST gateway origin, without a trailing slash.
    pub api_url: String,
    pub identity: IdentityConfig,
    /// Object-storage URL-resolution endpoint.
    pub storage_url_endpoint: String,
    pub ui: UiConfig,
}

impl Config {
    /// Where the config file lives, honoring `HOOS_CONFIG_PATH`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HOOS_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("hoos").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist. Malformed TOML is an error, not a silent default.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::from_raw(RawConfig::default())),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let api_url = env_or("HOOS_API_URL", raw.api.base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let identity = IdentityConfig {
            api_key: env_or("HOOS_IDENTITY_API_KEY", raw.identity.api_key).unwrap_or_default(),
            signin_endpoint: raw.identity.signin_endpoint.unwrap_or_else(|| {
                "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword".to_string()
            }),
            signup_endpoint: raw.identity.signup_endpoint.unwrap_or_else(|| {
                "https://identitytoolkit.googleapis.com/v1/accounts:signUp".to_string()
            }),
            token_endpoint: raw
                .identity
                .token_endpoint
                .unwrap_or_else(|| "https://securetoken.googleapis.com/v1/token".to_string()),
        };

        let storage_url_endpoint = raw
            .storage
            .url_endpoint
            .unwrap_or_else(|| format!("{api_url}/api/document/get-download-url"));

        let ui = UiConfig {
            ascii_only: raw.ui.ascii_only.unwrap_or(false),
        };

        Self {
            api_url,
            identity,
            storage_url_endpoint,
            ui,
        }
    }
}

fn env_or(var: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = Config::from_raw(RawConfig::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.ui.ascii_only);
        assert!(config.storage_url_endpoint.starts_with(DEFAULT_API_URL));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://chat.example.edu/\"\n\n[ui]\nascii_only = true"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        // Trailing slash is normalized away.
        assert_eq!(config.api_url, "https://chat.example.edu");
        assert!(config.ui.ascii_only);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 3").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase = \"oops\"").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
