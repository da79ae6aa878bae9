use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use thiserror::Error;
use tracing::info;

/// Every setting is read from `RECIPES_<NAME>`.
pub const ENV_PREFIX: &str = "RECIPES_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenv::Error),
}

/// Which repository backend the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Memory,
    Mongo,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageKind::Memory),
            "mongo" | "mongodb" => Ok(StorageKind::Mongo),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::Mongo => write!(f, "mongo"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub debug: bool,
    pub storage: StorageKind,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub mongodb_collection: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Recipe Assistant API".to_string(),
            debug: false,
            storage: StorageKind::Memory,
            mongodb_uri: "mongodb://localhost:27017/recipes".to_string(),
            mongodb_db: "recipes".to_string(),
            mongodb_collection: "recipes".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_key: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

// `from_path_iter` is the only dotenv 0.15 entry point that reads a file
// without exporting it into the process environment. Its deprecation note
// points at `from_path`, which does export.
#[allow(deprecated)]
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let vars = dotenv::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
    Ok(vars)
}

impl Settings {
    /// Loads `.env` from the working directory (if any), then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Settings::from_env`] but with an explicit env file. Process
    /// variables still take precedence, and the process environment is not modified.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(path)?;
        info!("Loaded {} variables from {}", file_vars.len(), path.display());
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds settings from any `RECIPES_*` lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let defaults = Settings::default();

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            debug: match get("DEBUG") {
                Some(raw) => parse_bool("DEBUG", &raw)?,
                None => defaults.debug,
            },
            storage: parse_or("STORAGE", get("STORAGE"), defaults.storage)?,
            mongodb_uri: get("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_db: get("MONGODB_DB").unwrap_or(defaults.mongodb_db),
            mongodb_collection: get("MONGODB_COLLECTION").unwrap_or(defaults.mongodb_collection),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_api_key: get("OPENAI_API_KEY")
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
        })
    }
}

fn invalid(name: &str, value: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key: format!("{ENV_PREFIX}{name}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(name, &raw, e)),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(name, raw, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() -> Result<()> {
        let settings = Settings::from_lookup(|_| None)?;
        assert_eq!(settings.app_name, "Recipe Assistant API");
        assert_eq!(settings.storage, StorageKind::Memory);
        assert_eq!(settings.mongodb_collection, "recipes");
        assert_eq!(settings.openai_model, "gpt-4o-mini");
        assert_eq!(settings.openai_api_key, None);
        assert_eq!(settings.port, 8000);
        Ok(())
    }

    #[test]
    fn test_prefixed_variables_override_defaults() -> Result<()> {
        let settings = Settings::from_lookup(lookup_from(&[
            ("RECIPES_DEBUG", "yes"),
            ("RECIPES_STORAGE", "MongoDB"),
            ("RECIPES_MONGODB_DB", "kitchen"),
            ("RECIPES_PORT", "9001"),
            ("RECIPES_OPENAI_API_KEY", "  sk-test  "),
            ("MONGODB_DB", "ignored-without-prefix"),
        ]))?;
        assert!(settings.debug);
        assert_eq!(settings.storage, StorageKind::Mongo);
        assert_eq!(settings.mongodb_db, "kitchen");
        assert_eq!(settings.port, 9001);
        assert_eq!(settings.openai_api_key.as_deref(), Some("sk-test"));
        Ok(())
    }

    #[test]
    fn test_blank_api_key_is_treated_as_unset() -> Result<()> {
        let settings = Settings::from_lookup(lookup_from(&[("RECIPES_OPENAI_API_KEY", "   ")]))?;
        assert_eq!(settings.openai_api_key, None);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_reported_with_key() {
        let err = Settings::from_lookup(lookup_from(&[("RECIPES_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("RECIPES_PORT"));

        let err = Settings::from_lookup(lookup_from(&[("RECIPES_STORAGE", "postgres")])).unwrap_err();
        assert!(err.to_string().contains("unknown storage backend"));

        let err = Settings::from_lookup(lookup_from(&[("RECIPES_DEBUG", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("expected a boolean"));
    }

    #[test]
    fn test_from_env_file_reads_prefixed_keys() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "RECIPES_MONGODB_COLLECTION=cookbook")?;
        writeln!(file, "RECIPES_OPENAI_MODEL=gpt-4.1-mini")?;
        file.flush()?;

        let settings = Settings::from_env_file(file.path())?;
        assert_eq!(settings.mongodb_collection, "cookbook");
        assert_eq!(settings.openai_model, "gpt-4.1-mini");
        Ok(())
    }

    #[test]
    fn test_read_env_file_leaves_process_environment_alone() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "RECIPES_ENV_FILE_ONLY_MARKER=from-file")?;
        file.flush()?;

        let vars = read_env_file(file.path())?;
        assert_eq!(
            vars.get("RECIPES_ENV_FILE_ONLY_MARKER").map(String::as_str),
            Some("from-file")
        );
        assert!(env::var("RECIPES_ENV_FILE_ONLY_MARKER").is_err());
        Ok(())
    }

    #[test]
    fn test_from_env_file_missing_file() {
        let result = Settings::from_env_file(Path::new("this_env_file_does_not_exist.env"));
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }
}
