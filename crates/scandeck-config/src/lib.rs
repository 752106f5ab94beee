//! Shared configuration for the scandeck dashboard.
//!
//! A TOML file (`scandeck.toml` under the platform config directory)
//! merged with `SCANDECK_*` environment variables. CLI flags override
//! both — the binary applies them after loading.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use scandeck_core::ScanParams;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Scanner service base URL.
    #[serde(default = "default_server")]
    pub server: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Log file for the TUI (stdout would corrupt the terminal).
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Defaults posted with `/api/scan/start`.
    #[serde(default)]
    pub scan: ScanDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_secs: default_timeout(),
            log_file: None,
            scan: ScanDefaults::default(),
        }
    }
}

/// Scan parameter defaults, mirroring the service's own defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanDefaults {
    #[serde(default = "default_pings")]
    pub pings: u32,

    /// Per-probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout")]
    pub timeout: u64,

    #[serde(default = "default_workers")]
    pub workers: u32,

    #[serde(default)]
    pub vpn_speedtest: bool,
}

impl Default for ScanDefaults {
    fn default() -> Self {
        Self {
            pings: default_pings(),
            timeout: default_probe_timeout(),
            workers: default_workers(),
            vpn_speedtest: false,
        }
    }
}

impl From<ScanDefaults> for ScanParams {
    fn from(d: ScanDefaults) -> Self {
        Self {
            pings: d.pings,
            timeout: d.timeout,
            workers: d.workers,
            vpn_speedtest: d.vpn_speedtest,
        }
    }
}

fn default_server() -> String {
    "http://127.0.0.1:5000".to_owned()
}

fn default_timeout() -> u64 {
    30
}

fn default_pings() -> u32 {
    1
}

fn default_probe_timeout() -> u64 {
    1000
}

fn default_workers() -> u32 {
    20
}

// ── Loading ─────────────────────────────────────────────────────────

/// Platform config file path: `<config dir>/scandeck/scandeck.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "scandeck").map(|dirs| dirs.config_dir().join("scandeck.toml"))
}

/// Load config from the default path merged with `SCANDECK_*` env vars.
/// A missing file is not an error — defaults apply.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = config_path() {
        figment = figment.merge(Toml::file(path));
    }
    let config: Config = figment
        .merge(Env::prefixed("SCANDECK_").split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit TOML file, still honoring env overrides.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCANDECK_").split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the given path, creating
/// parent directories as needed.
pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

impl Config {
    /// The service base URL as a parsed `Url`, with a trailing slash so
    /// relative API paths join correctly.
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let raw = if self.server.ends_with('/') {
            self.server.clone()
        } else {
            format!("{}/", self.server)
        };
        raw.parse().map_err(|e| ConfigError::Validation {
            field: "server".to_owned(),
            reason: format!("{e}"),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.server_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".to_owned(),
                reason: "must be non-zero".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("defaults must validate");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.scan.pings, 1);
        assert_eq!(config.scan.workers, 20);
        assert!(!config.scan.vpn_speedtest);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scandeck.toml");
        std::fs::write(
            &path,
            r#"
server = "http://scanner.lan:5000"
timeout_secs = 10

[scan]
pings = 3
workers = 50
"#,
        )
        .expect("write config");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.server, "http://scanner.lan:5000");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.scan.pings, 3);
        assert_eq!(config.scan.workers, 50);
        // Unset fields keep defaults.
        assert_eq!(config.scan.timeout, 1000);
    }

    #[test]
    fn server_url_gains_trailing_slash() {
        let config = Config {
            server: "http://scanner.lan:5000".to_owned(),
            ..Config::default()
        };
        assert_eq!(
            config.server_url().expect("valid url").as_str(),
            "http://scanner.lan:5000/"
        );
    }

    #[test]
    fn invalid_server_is_rejected() {
        let config = Config {
            server: "not a url".to_owned(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("scandeck.toml");

        let config = Config {
            server: "http://scanner.lan:5000".to_owned(),
            timeout_secs: 15,
            ..Config::default()
        };
        save_config_to(&config, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.server, config.server);
        assert_eq!(loaded.timeout_secs, 15);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn scan_defaults_convert_to_params() {
        let params: ScanParams = ScanDefaults::default().into();
        assert_eq!(params.pings, 1);
        assert_eq!(params.timeout, 1000);
        assert_eq!(params.workers, 20);
    }
}
