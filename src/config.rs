use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Seconds between automatic re-fetches of the global mood
pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Feature property holding the ISO code in the boundary layer
pub const DEFAULT_CODE_PROPERTY: &str = "iso_3166_1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete runtime configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub use_mock: bool,
    pub timeout_secs: Option<u64>,
    pub refresh_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            use_mock: false,
            timeout_secs: None,
            refresh_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub access_token: Option<String>,
    /// GeoJSON file path or http(s) URL; the embedded outlines when unset
    pub boundaries: Option<String>,
    pub code_property: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            boundaries: None,
            code_property: DEFAULT_CODE_PROPERTY.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub use_mock: bool,
    pub map_token: Option<String>,
    pub boundaries: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Read the TOML file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("moodatlas")
            .join("config.toml")
    }

    /// Layer environment variables over the file values
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("MOODATLAS_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.url = url.trim().to_string();
        }
        if let Some(flag) = var("MOODATLAS_USE_MOCK") {
            self.api.use_mock = parse_flag(&flag);
        }
        if let Some(token) = var("MOODATLAS_MAP_TOKEN").filter(|v| !v.is_empty()) {
            self.map.access_token = Some(token);
        }
        if let Some(filter) = var("MOODATLAS_LOG").filter(|v| !v.is_empty()) {
            self.log.filter = filter;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.api_url {
            self.api.url = url.clone();
        }
        if overrides.use_mock {
            self.api.use_mock = true;
        }
        if let Some(token) = &overrides.map_token {
            self.map.access_token = Some(token.clone());
        }
        if let Some(boundaries) = &overrides.boundaries {
            self.map.boundaries = Some(boundaries.clone());
        }
        if let Some(file) = &overrides.log_file {
            self.log.file = Some(file.clone());
        }
    }

    /// Defaults, then the config file, then `.env` and the process
    /// environment, then the command line
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Self {
        let path = explicit.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = match Self::from_file(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}; using defaults", e);
                Self::default()
            }
        };

        dotenv::dotenv().ok();
        config.apply_env(|name| std::env::var(name).ok());
        config.apply_overrides(overrides);
        config
    }
}

/// `true`, `1`, `yes` and `on` (any case) enable a flag
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_backend_conventions() {
        let config = Config::default();
        assert_eq!(config.api.url, "http://localhost:8000");
        assert!(!config.api.use_mock);
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.api.refresh_secs, 300);
        assert_eq!(config.map.code_property, "iso_3166_1");
        assert_eq!(config.log.file, None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nurl = \"https://mood.example\"\ntimeout_secs = 10\n\n[map]\ncode_property = \"ISO_A2\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.url, "https://mood.example");
        assert_eq!(config.api.timeout_secs, Some(10));
        assert_eq!(config.api.refresh_secs, 300);
        assert_eq!(config.map.code_property, "ISO_A2");
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nurl = ").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("MOODATLAS_API_URL", " https://api.example "),
            ("MOODATLAS_USE_MOCK", "TRUE"),
            ("MOODATLAS_MAP_TOKEN", "pk.abc"),
        ]));
        assert_eq!(config.api.url, "https://api.example");
        assert!(config.api.use_mock);
        assert_eq!(config.map.access_token.as_deref(), Some("pk.abc"));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("MOODATLAS_API_URL", "  "), ("MOODATLAS_MAP_TOKEN", "")]));
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.map.access_token, None);
    }

    #[test]
    fn mock_flag_parsing() {
        for on in ["true", "1", "yes", "On"] {
            assert!(parse_flag(on), "{}", on);
        }
        for off in ["false", "0", "", "mock"] {
            assert!(!parse_flag(off), "{}", off);
        }
    }

    #[test]
    fn command_line_wins() {
        let mut config = Config::default();
        config.apply_env(env(&[("MOODATLAS_API_URL", "https://env.example")]));
        config.apply_overrides(&Overrides {
            api_url: Some("https://cli.example".into()),
            use_mock: true,
            boundaries: Some("world.geojson".into()),
            ..Overrides::default()
        });
        assert_eq!(config.api.url, "https://cli.example");
        assert!(config.api.use_mock);
        assert_eq!(config.map.boundaries.as_deref(), Some("world.geojson"));
    }
}
