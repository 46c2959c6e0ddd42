use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required key `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    logging: Option<RawLogging>,
    database: Option<RawDatabase>,
    api: Option<RawApi>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawApi {
    url: Option<String>,
    timeout: Option<f64>,
}

/// Severity names accepted in `logging.level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    NotSet,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Self::NotSet),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// The URL as written in the config file.
    pub url: String,
    /// SQLite file the URL resolves to.
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub url: Url,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct Configuration {
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        raw.validate()
    }
}

impl RawConfig {
    fn validate(self) -> Result<Configuration, ConfigError> {
        let logging = self.logging.unwrap_or_default();
        let database = self.database.unwrap_or_default();
        let api = self.api.unwrap_or_default();

        let level = logging
            .level
            .ok_or(ConfigError::Missing("logging.level"))?
            .parse::<LogLevel>()
            .map_err(|reason| ConfigError::Invalid {
                key: "logging.level",
                reason,
            })?;

        let db_url = database.url.ok_or(ConfigError::Missing("database.url"))?;
        let db_path = sqlite_path(&db_url).map_err(|reason| ConfigError::Invalid {
            key: "database.url",
            reason,
        })?;

        let api_url = api.url.ok_or(ConfigError::Missing("api.url"))?;
        let api_url = Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
            key: "api.url",
            reason: e.to_string(),
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "api.url",
                reason: format!("unsupported scheme {:?}", api_url.scheme()),
            });
        }

        let timeout = api.timeout.ok_or(ConfigError::Missing("api.timeout"))?;
        let timeout = parse_timeout(timeout).map_err(|reason| ConfigError::Invalid {
            key: "api.timeout",
            reason,
        })?;

        Ok(Configuration {
            logging: LoggingConfig {
                level,
                file: logging.file,
            },
            database: DatabaseConfig {
                url: db_url,
                path: db_path,
            },
            api: ApiConfig {
                url: api_url,
                timeout,
            },
        })
    }
}

fn parse_timeout(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("expected a positive number of seconds, got {secs}"));
    }
    let timeout = Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("{secs} seconds is out of range: {e}"))?;
    if timeout.is_zero() {
        return Err(format!("{secs} seconds rounds down to zero"));
    }
    Ok(timeout)
}

/// Resolves a SQLAlchemy-style SQLite URL to a file path.
///
/// `sqlite:///data.db` is relative, `sqlite:////var/data.db` is absolute and
/// anything without a scheme is taken as a path. In-memory databases are
/// refused since every operation opens its own connection.
fn sqlite_path(url: &str) -> Result<PathBuf, String> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("sqlite:///") {
        if rest.contains('?') {
            return Err(format!("query parameters are not supported in {url:?}"));
        }
        rest
    } else if url.starts_with("sqlite:") {
        return Err(format!("expected sqlite:///<path>, got {url:?}"));
    } else if url.contains("://") {
        return Err(format!("unsupported database url {url:?}, only sqlite is supported"));
    } else {
        url
    };

    if path.is_empty() || path == ":memory:" {
        return Err("in-memory databases are not supported".to_string());
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
logging:
  level: info
database:
  url: sqlite:///movies.db
api:
  url: http://localhost:8080/movies
  timeout: 10
"#;

    #[test]
    fn parses_all_required_keys() {
        let cfg = Configuration::from_yaml(VALID).unwrap();
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert!(cfg.logging.file.is_none());
        assert_eq!(cfg.database.url, "sqlite:///movies.db");
        assert_eq!(cfg.database.path, PathBuf::from("movies.db"));
        assert_eq!(cfg.api.url.as_str(), "http://localhost:8080/movies");
        assert_eq!(cfg.api.timeout, Duration::from_secs(10));
    }

    #[test]
    fn accepts_fractional_timeout_and_log_file() {
        let cfg = Configuration::from_yaml(
            r#"
logging: {level: WARNING, file: logs/sync.log}
database: {url: "sqlite:////var/lib/sync/data.db"}
api: {url: "https://example.com/data.json", timeout: 2.5}
"#,
        )
        .unwrap();
        assert_eq!(cfg.logging.level, LogLevel::Warning);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("logs/sync.log")));
        assert_eq!(cfg.database.path, PathBuf::from("/var/lib/sync/data.db"));
        assert_eq!(cfg.api.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn missing_key_is_named_by_path() {
        let err = Configuration::from_yaml(
            r#"
logging: {level: INFO}
database: {url: data.db}
api: {url: "http://localhost/"}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api.timeout")));
        assert_eq!(err.to_string(), "missing required key `api.timeout`");
    }

    #[test]
    fn missing_section_reports_its_first_key() {
        let err = Configuration::from_yaml("logging: {level: INFO}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("database.url")));

        let err = Configuration::from_yaml("").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("logging.level")));
    }

    #[test]
    fn rejects_unknown_level() {
        let err = Configuration::from_yaml(&VALID.replace("level: info", "level: loud"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "logging.level", .. }));
    }

    #[test]
    fn rejects_non_positive_timeout() {
        let err = Configuration::from_yaml(&VALID.replace("timeout: 10", "timeout: 0"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "api.timeout", .. }));
    }

    #[test]
    fn rejects_timeout_outside_duration_range() {
        for value in ["1e20", "1e-12", ".inf"] {
            let err =
                Configuration::from_yaml(&VALID.replace("timeout: 10", &format!("timeout: {value}")))
                    .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "api.timeout", .. }),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn rejects_non_http_api_url() {
        let err = Configuration::from_yaml(
            &VALID.replace("http://localhost:8080/movies", "ftp://localhost/movies"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "api.url", .. }));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = Configuration::from_yaml("logging: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Configuration::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn sqlite_url_forms() {
        assert_eq!(sqlite_path("sqlite:///a/b.db").unwrap(), PathBuf::from("a/b.db"));
        assert_eq!(sqlite_path("sqlite:////a/b.db").unwrap(), PathBuf::from("/a/b.db"));
        assert_eq!(sqlite_path("plain.db").unwrap(), PathBuf::from("plain.db"));
        assert!(sqlite_path("sqlite://").is_err());
        assert!(sqlite_path("sqlite:///a.db?timeout=5").is_err());
        assert!(sqlite_path("sqlite:///:memory:").is_err());
        assert!(sqlite_path("postgresql://user@host/db").is_err());
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("FATAL".parse::<LogLevel>(), Ok(LogLevel::Critical));
        assert_eq!("notset".parse::<LogLevel>(), Ok(LogLevel::NotSet));
    }
}
