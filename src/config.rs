//! Layered configuration: defaults, an optional file, then `PRODWATCH_*`
//! environment variables. Command-line flags are applied on top by the
//! binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::ui::FrameOptions;

/// Prefix of the environment variables read as configuration.
pub const ENV_PREFIX: &str = "PRODWATCH";

/// Fully resolved monitor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub bar_width: usize,
    /// Status label counted as produced.
    pub complete_status: String,
    /// Request timeout of the HTTP source.
    pub fetch_timeout: Duration,
    /// Cap of the retry delay after failed fetches. A cap below
    /// `poll_interval` is raised to it by the backoff.
    pub max_backoff: Duration,
    pub title: String,
    pub unit: String,
    pub file: Option<PathBuf>,
    pub url: Option<String>,
    pub token: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let frame = FrameOptions::default();
        Self {
            poll_interval: Duration::from_secs(5),
            bar_width: frame.bar_width,
            complete_status: "OK".to_string(),
            fetch_timeout: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            title: frame.title,
            unit: frame.unit,
            file: None,
            url: None,
            token: None,
        }
    }
}

/// Where rows are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Url { url: String, token: Option<String> },
}

/// Settings as they appear in a file or the environment, before parsing.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    poll_interval: Option<String>,
    bar_width: Option<u64>,
    complete_status: Option<String>,
    fetch_timeout: Option<String>,
    max_backoff: Option<String>,
    title: Option<String>,
    unit: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    token: Option<String>,
}

impl MonitorConfig {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }
        let raw: RawConfig = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::default().merge(raw)
    }

    fn merge(mut self, raw: RawConfig) -> Result<Self> {
        if let Some(value) = raw.poll_interval {
            self.poll_interval = parse_setting("poll_interval", &value)?;
        }
        if let Some(value) = raw.bar_width {
            self.bar_width = usize::try_from(value).context("bar_width is too large")?;
        }
        if let Some(value) = raw.fetch_timeout {
            self.fetch_timeout = parse_setting("fetch_timeout", &value)?;
        }
        if let Some(value) = raw.max_backoff {
            self.max_backoff = parse_setting("max_backoff", &value)?;
        }
        if let Some(value) = raw.complete_status {
            self.complete_status = value;
        }
        if let Some(value) = raw.title {
            self.title = value;
        }
        if let Some(value) = raw.unit {
            self.unit = value;
        }
        self.file = raw.file.or(self.file);
        self.url = raw.url.or(self.url);
        self.token = raw.token.or(self.token);
        Ok(self)
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than zero");
        }
        if self.bar_width == 0 {
            bail!("bar_width must be at least 1");
        }
        if self.fetch_timeout.is_zero() {
            bail!("fetch_timeout must be greater than zero");
        }
        if self.complete_status.trim().is_empty() {
            bail!("complete_status must not be empty");
        }
        self.source().map(|_| ())
    }

    /// The configured row source. Exactly one of `file` and `url` must be set.
    pub fn source(&self) -> Result<SourceSpec> {
        match (&self.file, &self.url) {
            (Some(file), None) => Ok(SourceSpec::File(file.clone())),
            (None, Some(url)) => Ok(SourceSpec::Url {
                url: url.clone(),
                token: self.token.clone(),
            }),
            (Some(_), Some(_)) => bail!("Both a file and a url source are configured; pick one"),
            (None, None) => bail!("No data source configured (use --file or --url)"),
        }
    }

    pub fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            title: self.title.clone(),
            unit: self.unit.clone(),
            bar_width: self.bar_width,
        }
    }
}

fn parse_setting(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value).with_context(|| format!("Invalid {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::load_with_env(None, no_env()).unwrap();

        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.bar_width, 25);
        assert_eq!(config.complete_status, "OK");
        assert!(config.validate().is_err(), "no source configured");
    }

    #[test]
    fn test_file_values() {
        let file = toml_file(
            r#"
poll_interval = "750ms"
bar_width = 40
complete_status = "DONE"
title = "BAKERY"
file = "rows.json"
"#,
        );

        let config = MonitorConfig::load_with_env(Some(file.path()), no_env()).unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(750));
        assert_eq!(config.bar_width, 40);
        assert_eq!(config.complete_status, "DONE");
        assert_eq!(config.frame_options().title, "BAKERY");
        assert_eq!(config.source().unwrap(), SourceSpec::File(PathBuf::from("rows.json")));
        config.validate().unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("poll_interval = \"10s\"\nfile = \"rows.json\"\n");

        let config = MonitorConfig::load_with_env(
            Some(file.path()),
            env(&[("PRODWATCH_POLL_INTERVAL", "2s"), ("PRODWATCH_BAR_WIDTH", "10")]),
        )
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.bar_width, 10);
        assert_eq!(config.file, Some(PathBuf::from("rows.json")));
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let result = MonitorConfig::load_with_env(
            None,
            env(&[("PRODWATCH_POLL_INTERVAL", "soon")]),
        );

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("poll_interval"), "{}", message);
    }

    #[test]
    fn test_missing_config_file() {
        let result = MonitorConfig::load_with_env(Some(Path::new("/nonexistent/prodwatch.toml")), no_env());

        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let valid = MonitorConfig {
            url: Some("http://localhost:8080/rows".to_string()),
            ..MonitorConfig::default()
        };
        valid.validate().unwrap();

        let zero_interval = MonitorConfig {
            poll_interval: Duration::ZERO,
            ..valid.clone()
        };
        assert!(zero_interval.validate().is_err());

        let zero_width = MonitorConfig {
            bar_width: 0,
            ..valid.clone()
        };
        assert!(zero_width.validate().is_err());

        let both = MonitorConfig {
            file: Some(PathBuf::from("rows.json")),
            ..valid.clone()
        };
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_long_interval_with_default_backoff() {
        let config = MonitorConfig {
            file: Some(PathBuf::from("rows.json")),
            poll_interval: Duration::from_secs(120),
            ..MonitorConfig::default()
        };

        config.validate().unwrap();
        assert!(config.max_backoff < config.poll_interval);
    }

    #[test]
    fn test_url_source_carries_token() {
        let config = MonitorConfig {
            url: Some("https://example.invalid/rows".to_string()),
            token: Some("secret".to_string()),
            ..MonitorConfig::default()
        };

        assert_eq!(
            config.source().unwrap(),
            SourceSpec::Url {
                url: "https://example.invalid/rows".to_string(),
                token: Some("secret".to_string()),
            }
        );
    }
}
