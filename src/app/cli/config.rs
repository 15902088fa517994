//! TOML configuration file loading
//!
//! Values from the file only fill fields the command line and environment
//! left unset; list fields (`repo`, `exclude`) are extended instead.

use crate::app::settings::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

use super::args::Args;

/// Default config location: `<config_dir>/Depweight/depweight.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Depweight").join("depweight.toml"))
}

impl Args {
    /// Load the explicit or default config file, if any, into `self`.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub async fn apply_config_file(&mut self) -> Result<Option<PathBuf>, ConfigError> {
        let config_path = match &self.config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile { path: path.clone() })
            }
            Some(path) => path.clone(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let contents = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
        let table = toml::from_str::<toml::Table>(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;

        self.apply_toml_values(&table)?;
        Ok(Some(config_path))
    }

    /// Apply TOML values to every field that is still unset
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ConfigError> {
        self.repos.extend(string_list(config, "repo")?);
        self.exclude.extend(string_list(config, "exclude")?);

        fill(&mut self.listen_addr, string_value(config, "listen-addr")?);
        fill(&mut self.environment, parsed_value(config, "env")?);
        fill(&mut self.staging_dir, string_value(config, "staging-dir")?.map(PathBuf::from));
        fill(&mut self.expected_host, string_value(config, "expected-host")?);
        fill(&mut self.clone_backend, parsed_value(config, "clone-backend")?);
        fill(&mut self.folder_naming, parsed_value(config, "folder-naming")?);
        fill(&mut self.report_format, parsed_value(config, "report-format")?);
        fill(&mut self.report_file, string_value(config, "report-file")?.map(PathBuf::from));
        fill(&mut self.diagram_api_key, string_value(config, "diagram-api-key")?);
        fill(&mut self.diagram_base_url, string_value(config, "diagram-base-url")?);
        fill(&mut self.diagram_folder_id, string_value(config, "diagram-folder-id")?);
        fill(&mut self.log_level, string_value(config, "log-level")?);
        fill(&mut self.log_format, parsed_value(config, "log-format")?);
        fill(&mut self.log_file, string_value(config, "log-file")?.map(PathBuf::from));

        if let Some(value) = config.get("max-line-length") {
            let length = value
                .as_integer()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("max-line-length", "expected a positive integer"))?;
            fill(&mut self.max_line_length, Some(length as usize));
        }

        // Command-line color flags win over the file
        if !self.color && !self.no_color {
            self.color = bool_value(config, "color")?.unwrap_or(false);
            self.no_color = bool_value(config, "no-color")?.unwrap_or(false);
        }

        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn fill<T>(target: &mut Option<T>, value: Option<T>) {
    if target.is_none() {
        *target = value;
    }
}

fn string_value(config: &toml::Table, key: &str) -> Result<Option<String>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(key, "expected a string")),
    }
}

fn bool_value(config: &toml::Table, key: &str) -> Result<Option<bool>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(key, "expected true or false")),
    }
}

fn parsed_value<T: FromStr>(config: &toml::Table, key: &str) -> Result<Option<T>, ConfigError> {
    match string_value(config, key)? {
        None => Ok(None),
        Some(raw) => T::from_str(&raw)
            .map(Some)
            .map_err(|_| invalid(key, format!("'{}' is not a recognised value", raw))),
    }
}

/// A single string, a comma-separated string, or an array of strings
fn string_list(config: &toml::Table, key: &str) -> Result<Vec<String>, ConfigError> {
    let raw: Vec<&str> = match config.get(key) {
        None => return Ok(Vec::new()),
        Some(toml::Value::String(s)) => vec![s.as_str()],
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(|| invalid(key, "expected strings")))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(invalid(key, "expected a string or an array of strings")),
    };

    Ok(raw
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}
