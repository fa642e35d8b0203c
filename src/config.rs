//! Layered settings.
//!
//! Values are resolved in this order, later sources winning:
//! built-in defaults, an optional TOML file, `PAIRWATCH_*` environment
//! variables, then command-line flags (applied by the binary).
//!
//! ```toml
//! endpoint = "http://monitor.internal:8888"
//! prefix = "*"
//! refresh_secs = 5
//! timeout_secs = 10
//! sort_field = "priceDiff"
//! sort_descending = false
//! log_file = "pairwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::{SortDirection, SortDirective, SortField};
use crate::source::MATCH_ALL;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8888";
pub const DEFAULT_REFRESH_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SORT_FIELD: &str = "priceDiff";

/// Environment variable prefix, e.g. `PAIRWATCH_ENDPOINT`.
pub const ENV_PREFIX: &str = "PAIRWATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Backend base URL; `/api/monitor` is appended.
    pub endpoint: String,
    /// Initial pair prefix.
    pub prefix: String,
    /// Seconds between automatic fetches.
    pub refresh_secs: u64,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Initial sort column (`pair` or `priceDiff`).
    pub sort_field: String,
    pub sort_descending: bool,
    /// Where to write logs while the TUI owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prefix: MATCH_ALL.to_string(),
            refresh_secs: DEFAULT_REFRESH_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_descending: false,
            log_file: None,
        }
    }
}

/// Values given on the command line. `None` leaves the loaded setting alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub prefix: Option<String>,
    pub refresh_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub sort_field: Option<String>,
    /// A flag: it can force descending order but never turn it off.
    pub descending: bool,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from defaults, the optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("endpoint", defaults.endpoint)?
            .set_default("prefix", defaults.prefix)?
            .set_default("refresh_secs", defaults.refresh_secs)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("sort_field", defaults.sort_field)?
            .set_default("sort_descending", defaults.sort_descending)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Apply command-line values on top of the loaded settings.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(ref endpoint) = overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(ref prefix) = overrides.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(refresh) = overrides.refresh_secs {
            self.refresh_secs = refresh;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(ref sort) = overrides.sort_field {
            self.sort_field = sort.clone();
        }
        if overrides.descending {
            self.sort_descending = true;
        }
        if let Some(ref log_file) = overrides.log_file {
            self.log_file = Some(log_file.clone());
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The initial sort directive.
    ///
    /// An unrecognized field name falls back to pair ascending.
    pub fn sort_directive(&self) -> SortDirective {
        match SortField::parse(&self.sort_field) {
            Some(field) => {
                let direction = if self.sort_descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                SortDirective::new(field, direction)
            }
            None => {
                tracing::warn!(field = %self.sort_field, "unknown sort field, sorting by pair");
                SortDirective::new(SortField::Pair, SortDirection::Ascending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.prefix, "*");
        assert_eq!(settings.refresh_interval(), Duration::from_secs(5));
        assert_eq!(settings.sort_directive(), SortDirective::default());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let file = toml_file(
            r#"
            endpoint = "http://monitor.internal:9000"
            refresh_secs = 30
            sort_field = "pair"
            sort_descending = true
            log_file = "/tmp/pairwatch.log"
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.endpoint, "http://monitor.internal:9000");
        assert_eq!(settings.refresh_secs, 30);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/pairwatch.log")));
        assert_eq!(
            settings.sort_directive(),
            SortDirective::new(SortField::Pair, SortDirection::Descending)
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file(r#"prefix = "BTC""#);

        std::env::set_var("PAIRWATCH_PREFIX", "ETH");
        let settings = Settings::load(Some(file.path()));
        std::env::remove_var("PAIRWATCH_PREFIX");

        assert_eq!(settings.unwrap().prefix, "ETH");
    }

    #[test]
    fn test_flags_override_file() {
        let file = toml_file(
            r#"
            endpoint = "http://monitor.internal:9000"
            refresh_secs = 30
            sort_field = "pair"
            sort_descending = true
            "#,
        );
        let mut settings = Settings::load(Some(file.path())).unwrap();

        settings.apply_overrides(&Overrides {
            endpoint: Some("http://localhost:1234".to_string()),
            refresh_secs: Some(2),
            sort_field: Some("priceDiff".to_string()),
            log_file: Some(PathBuf::from("pairwatch.log")),
            ..Overrides::default()
        });

        assert_eq!(settings.endpoint, "http://localhost:1234");
        assert_eq!(settings.refresh_secs, 2);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.log_file, Some(PathBuf::from("pairwatch.log")));
        // Without --descending the file's direction is kept
        assert_eq!(
            settings.sort_directive(),
            SortDirective::new(SortField::PriceDiff, SortDirection::Descending)
        );
    }

    #[test]
    fn test_descending_flag_forces_descending() {
        let mut settings = Settings::default();
        settings.apply_overrides(&Overrides::default());
        assert!(!settings.sort_descending);

        settings.apply_overrides(&Overrides {
            descending: true,
            ..Overrides::default()
        });
        assert!(settings.sort_descending);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Settings::load(Some(Path::new("/nonexistent/pairwatch.toml"))).is_err());
    }

    #[test]
    fn test_unknown_sort_field_falls_back_to_pair_ascending() {
        let settings = Settings {
            sort_field: "volume".to_string(),
            sort_descending: true,
            ..Settings::default()
        };
        assert_eq!(
            settings.sort_directive(),
            SortDirective::new(SortField::Pair, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_intervals_never_zero() {
        let settings = Settings {
            refresh_secs: 0,
            timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.refresh_interval(), Duration::from_secs(1));
        assert_eq!(settings.timeout(), Duration::from_secs(1));
    }
}
