//! Settings file loading.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, LoggingSettings, QuerySettings, Settings, SettingsError,
    SettingsResult, CONFIG_ENV,
};
