//! Persistent catalog configuration model and defaults.

use std::path::Path;

use log::warn;

/// Root configuration persisted to `pas_catalog.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Database location.
    pub database: DatabaseConfig,
    #[serde(default)]
    /// Folder hierarchy traversal limits.
    pub paths: PathsConfig,
    #[serde(default)]
    /// Logger preferences for the command-line front end.
    pub logging: LoggingConfig,
}

/// Where the catalog database lives.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Limits applied while walking the folder hierarchy.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PathsConfig {
    /// Maximum number of folders climbed before a path is reported as corrupt.
    #[serde(default = "default_max_path_depth")]
    pub max_depth: usize,
}

/// Logger level filter, one of `error`, `warn`, `info`, `debug`, `trace`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_path_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Parses the configured level, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("pas").join("catalog.db"))
        .map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog.db".to_string())
}

fn default_max_path_depth() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Keeps values inside ranges the catalog can honor.
pub fn sanitize_config(config: Config) -> Config {
    Config {
        paths: PathsConfig {
            max_depth: config.paths.max_depth.clamp(1, 4_096),
        },
        ..config
    }
}

/// Loads configuration from `path`, writing defaults when the file is absent.
///
/// A file that cannot be parsed is left untouched and defaults are used.
pub fn load_config_file(path: &Path) -> Config {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            let defaults = Config::default();
            persist_config_file(&defaults, path);
            return defaults;
        }
    };

    match toml::from_str::<Config>(&text) {
        Ok(config) => sanitize_config(config),
        Err(err) => {
            warn!(
                "Failed to parse config {} ({}). Using defaults.",
                path.display(),
                err
            );
            Config::default()
        }
    }
}

pub fn persist_config_file(config: &Config, path: &Path) {
    let Ok(config_text) = toml::to_string(config) else {
        log::error!("Failed to serialize config for {}", path.display());
        return;
    };

    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            log::error!("Failed to create {}: {}", parent.display(), err);
            return;
        }
    }

    if let Err(err) = std::fs::write(path, config_text) {
        log::error!("Failed to persist config to {}: {}", path.display(), err);
    }
}
