//! Settings for the `cosmos` binary.
//!
//! Layered as flag > environment > `cosmos.toml` > built-in default. Flags
//! and environment are merged by clap before they get here.
//!
//! ```toml
//! redis_url = "redis://127.0.0.1:6379"
//! role = "member"
//!
//! [web]
//! host = "127.0.0.1"
//! port = 3030
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cosmos_core::session::SessionRole;
use cosmos_core::store::DEFAULT_REDIS_URL;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "cosmos.toml";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3030;

/// Contents of `cosmos.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub redis_url: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Load the explicit path, or the first `cosmos.toml` found in the
    /// working directory or the user config directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cosmos").join(CONFIG_FILE));
    }
    paths
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub redis_url: Option<String>,
    pub role: Option<String>,
    pub memory: bool,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub redis_url: String,
    pub role: SessionRole,
    pub memory: bool,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let role = match overrides.role.or(file.role) {
            Some(raw) => raw.parse::<SessionRole>()?,
            None => SessionRole::Viewer,
        };
        Ok(Self {
            redis_url: overrides
                .redis_url
                .or(file.redis_url)
                .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            role,
            memory: overrides.memory,
            host: file.web.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: file.web.port.unwrap_or(DEFAULT_PORT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::resolve(Overrides::default(), FileConfig::default()).unwrap();
        assert_eq!(settings.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(settings.role, SessionRole::Viewer);
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_file_values_and_override_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "redis_url = \"redis://cache:6380\"\nrole = \"member\"\n\n[web]\nport = 8080"
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        let settings = Settings::resolve(
            Overrides {
                role: Some("Admin".to_string()),
                ..Overrides::default()
            },
            config,
        )
        .unwrap();

        assert_eq!(settings.redis_url, "redis://cache:6380");
        assert_eq!(settings.role, SessionRole::Admin);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, DEFAULT_HOST);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let overrides = Overrides {
            role: Some("owner".to_string()),
            ..Overrides::default()
        };
        assert!(Settings::resolve(overrides, FileConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"x\"").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
    }
}
