//! `soma-bi.toml` settings. Every section and key is optional; string paths
//! may reference environment variables.
//!
//! ```toml
//! [database]
//! path = "${SOMA_DB_PATH}"
//!
//! [query]
//! default_limit = 50
//! batch_size = 1000
//! dialect = "sqlite"
//!
//! [logging]
//! filter = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("cannot read settings: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("{0}")]
    InvalidConfig(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Names an explicit settings file.
pub const CONFIG_ENV: &str = "SOMA_BI_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

/// Where the detail tables live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file (supports ${ENV_VAR} expansion).
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "soma.db".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// The database path with environment variables expanded.
    pub fn resolved_path(&self) -> SettingsResult<PathBuf> {
        expand_env_vars(&self.path).map(PathBuf::from)
    }
}

/// Query defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Page size when the caller gives none.
    pub default_limit: u64,

    /// Rows per batch when streaming.
    pub batch_size: u64,

    /// Dialect used by `explain`.
    pub dialect: Dialect,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_limit: 50,
            batch_size: 1000,
            dialect: Dialect::Sqlite,
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn from_toml(content: &str) -> SettingsResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// First match wins: `$SOMA_BI_CONFIG`, `./soma-bi.toml`, then
    /// `<config dir>/soma-bi/config.toml`. Defaults when none exists.
    /// An explicit `$SOMA_BI_CONFIG` that is missing is an error.
    pub fn load() -> SettingsResult<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }
        let candidates = std::iter::once(PathBuf::from("soma-bi.toml"))
            .chain(dirs::config_dir().map(|dir| dir.join("soma-bi").join("config.toml")));
        for candidate in candidates {
            if candidate.is_file() {
                return Self::from_file(candidate);
            }
        }
        Ok(Settings::default())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.query.default_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.default_limit must be greater than zero".into(),
            ));
        }
        if self.query.batch_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.batch_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Substitutes `${VAR}` and `$VAR` from the environment. A `$` not
/// followed by a name is kept as is.
pub fn expand_env_vars(s: &str) -> SettingsResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_')).collect()
        };
        if name.is_empty() {
            out.push('$');
            continue;
        }

        out.push_str(&env::var(&name).map_err(|_| SettingsError::MissingEnvVar(name))?);
    }

    Ok(out)
}
